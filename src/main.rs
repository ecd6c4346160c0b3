mod analytics;
mod config;
mod errors;
mod models;
mod report;
mod runner;
mod simulation;

use crate::config::AppConfig;
use crate::errors::SimResult;
use crate::report::RunReport;
use crate::simulation::CancelToken;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cfg = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    let seed = cfg.seed.unwrap_or_else(rand::random::<u64>);
    tracing::info!(seed, scenario = ?cfg.scenario, "rusty_walks starting");

    // Ctrl-C flips the token; the worker notices between trials.
    let cancel = CancelToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling simulation");
            signal_token.cancel();
        }
    });

    let format = cfg.report_format;
    let worker_cfg = cfg.clone();
    let result = tokio::task::spawn_blocking(move || run_scenarios(&worker_cfg, seed, &cancel)).await;

    let reports = match result.map_err(errors::SimError::from).and_then(|r| r) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, "simulation failed");
            std::process::exit(1);
        }
    };

    for report in reports {
        match report.render(format) {
            Ok(line) => println!("{line}"),
            Err(e) => {
                tracing::error!(error = %e, "failed to render report");
                std::process::exit(1);
            }
        }
    }
}

/// Run every scenario the config selects, in order. Stops at the first error.
fn run_scenarios(cfg: &AppConfig, seed: u64, cancel: &CancelToken) -> SimResult<Vec<RunReport>> {
    let mut reports = Vec::with_capacity(2);

    if cfg.scenario.includes_terminal() {
        reports.push(runner::run_terminal(&cfg.terminal, seed, cancel)?);
    }
    if cfg.scenario.includes_crossing() {
        reports.push(runner::run_crossing(&cfg.crossing, seed, cancel)?);
    }

    Ok(reports)
}
