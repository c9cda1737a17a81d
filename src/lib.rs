//! Therapy Trainer — simulated patient sessions for psychotherapy practice.

pub mod cli;
pub mod config;
pub mod error;
pub mod patient;
pub mod report;
pub mod session;
