//! Terminal front end — line-oriented REPL standing in for the web pages.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};

use crate::error::{Error, Result};
use crate::patient::PatientResponder;
use crate::session::{
    readiness, Clock, Message, Phase, RawProfileInput, SessionRuntime, Speaker,
    SymptomCategory,
};

/// Chat commands that close the session.
const END_COMMANDS: [&str; 3] = ["/end", "exit", "quit"];

/// Run profile → chat → feedback cycles until `/quit` or end of input.
pub async fn run_terminal<P, C, R, W>(
    runtime: &mut SessionRuntime<P, C>,
    input: R,
    mut output: W,
) -> Result<()>
where
    P: PatientResponder,
    C: Clock,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    loop {
        match runtime.controller().phase() {
            Phase::Profile => {
                let Some(raw) = collect_profile(&mut lines, &mut output).await? else {
                    return Ok(());
                };
                match runtime.start_from_input(&raw).await {
                    Ok(greeting) => {
                        say(
                            &mut output,
                            "\n--- Session started. /end to finish, /progress for progress ---\n",
                        )
                        .await?;
                        if let Some(greeting) = greeting {
                            say(&mut output, &render_message(&greeting)).await?;
                        }
                    }
                    Err(Error::Validation(errors)) => {
                        for error in &errors.0 {
                            say(&mut output, &format!("  ✗ {error}")).await?;
                        }
                        say(&mut output, "Let's try that again.\n").await?;
                    }
                    Err(e) => return Err(e),
                }
            }
            Phase::Chat => {
                prompt(&mut output, "> ").await?;
                let Some(line) = lines.next_line().await? else {
                    return Ok(());
                };
                let trimmed = line.trim();
                if END_COMMANDS.contains(&trimmed.to_lowercase().as_str()) {
                    if let Some(feedback) = runtime.end()? {
                        say(&mut output, &format!("\n{}\n", feedback.render())).await?;
                    }
                    say(&mut output, "Commands: /report, /new, /quit").await?;
                } else if trimmed == "/progress" {
                    let percent = runtime.controller().progress_percent();
                    say(&mut output, &format!("Progress: {percent:.0}%")).await?;
                } else if let Some(reply) = runtime.submit(trimmed).await? {
                    say(&mut output, &render_message(&reply)).await?;
                }
            }
            Phase::Feedback => {
                prompt(&mut output, "> ").await?;
                let Some(line) = lines.next_line().await? else {
                    return Ok(());
                };
                match line.trim() {
                    "/report" => match runtime.export_report().await {
                        Ok(path) => {
                            say(&mut output, &format!("Report saved to {}", path.display()))
                                .await?;
                        }
                        Err(Error::Report(e)) => {
                            say(&mut output, &format!("  ✗ {e}")).await?;
                        }
                        Err(e) => return Err(e),
                    },
                    "/new" => {
                        runtime.reset();
                        say(&mut output, "\n--- New session ---").await?;
                    }
                    "/quit" | "/exit" => return Ok(()),
                    _ => say(&mut output, "Commands: /report, /new, /quit").await?,
                }
            }
        }
    }
}

/// Ask for the four profile fields. `None` on end of input.
async fn collect_profile<R, W>(
    lines: &mut Lines<R>,
    output: &mut W,
) -> Result<Option<RawProfileInput>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    say(output, "--- Patient Profile ---").await?;
    let mut raw = RawProfileInput::default();

    let Some(age) = ask(lines, output, "Patient age (18-100): ").await? else {
        return Ok(None);
    };
    raw.age = age;

    let categories: Vec<String> = SymptomCategory::ALL.iter().map(|c| c.to_string()).collect();
    let Some(symptom) = ask(
        lines,
        output,
        &format!("Primary symptoms ({}): ", categories.join(", ")),
    )
    .await?
    else {
        return Ok(None);
    };
    raw.symptom = symptom;

    if let Ok(category) = raw.symptom.parse::<SymptomCategory>() {
        let template = category.template();
        say(
            output,
            &format!(
                "Quick profile for {}: behavior \"{}\", tone \"{}\"",
                category.label(),
                template.behavior,
                template.tone
            ),
        )
        .await?;
        let Some(answer) = ask(lines, output, "Use it? [Y/n]: ").await? else {
            return Ok(None);
        };
        if matches!(answer.trim().to_lowercase().as_str(), "" | "y" | "yes") {
            raw.apply_template(category);
        }
    }

    if raw.behavior.is_empty() {
        let Some(behavior) = ask(lines, output, "Behavior: ").await? else {
            return Ok(None);
        };
        raw.behavior = behavior;
    }
    if raw.tone.is_empty() {
        let Some(tone) = ask(lines, output, "Communication tone: ").await? else {
            return Ok(None);
        };
        raw.tone = tone;
    }

    say(output, readiness(&raw).status).await?;
    Ok(Some(raw))
}

fn render_message(message: &Message) -> String {
    match message.speaker {
        Speaker::Patient => format!("Patient: {}", message.text),
        Speaker::Trainee => format!("You: {}", message.text),
    }
}

async fn ask<R, W>(lines: &mut Lines<R>, output: &mut W, question: &str) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    prompt(output, question).await?;
    Ok(lines.next_line().await?)
}

async fn prompt<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.flush().await?;
    Ok(())
}

async fn say<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}
