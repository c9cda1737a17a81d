use therapy_trainer::cli::run_terminal;
use therapy_trainer::config::TrainerConfig;
use therapy_trainer::session::{SessionController, SessionRuntime};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (stderr keeps the transcript on stdout clean)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = TrainerConfig::from_env();
    config.validate()?;

    eprintln!("🧠 Therapy Trainer v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "   Reply delay: {} ms, progress target: {} messages",
        config.response_delay.as_millis(),
        config.progress_target
    );
    eprintln!("   Reports: {}\n", config.report_dir.display());

    let mut runtime = SessionRuntime::new(SessionController::with_defaults(config));

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    run_terminal(&mut runtime, stdin, tokio::io::stdout()).await?;

    Ok(())
}
