use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use pr_reviewer::config::ReviewConfig;
use pr_reviewer::errors::Error;
use pr_reviewer::run_review;

#[tokio::main]
async fn main() -> ExitCode {
    // Optional .env for local runs; CI passes real environment variables.
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cfg = match ReviewConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("reviewing {}#{}", cfg.repo, cfg.pr_number);

    match run_review(&cfg).await {
        Ok(report) => {
            info!(
                "completed: files={} summary_posted={} inline={}/{} failed",
                report.reviewed_files,
                report.publish.summary_posted,
                report.publish.inline_posted,
                report.publish.inline_failed
            );
            // Individual inline-post failures never affect the exit code.
            ExitCode::SUCCESS
        }
        Err(e) if e.is_graceful() => {
            info!("no relevant changes detected, nothing to review");
            ExitCode::SUCCESS
        }
        Err(Error::Model(m)) => {
            // Keep the raw reply visible for diagnosis.
            error!("model failure: {}", m);
            if let pr_reviewer::errors::ModelError::InvalidJson { raw, .. } = &m {
                error!("raw model reply: {}", raw);
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("review run failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
