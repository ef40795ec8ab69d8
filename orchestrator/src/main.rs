//! Main entry point for the orchestrator binary
//!
//! Wires the real HTTP client, the configured result sink and the logging
//! status reporter into one orchestrator run.

use anyhow::Context;
use clap::Parser;
use tokio::signal;

use orchestrator::{
    config::api_key_from_env,
    services::{ConsoleSink, FileSink, LogStatusReporter, RealJobClient},
    orchestrator::run_until_interrupted,
    AppConfig, Args, Orchestrator, OrchestratorError, OrchestratorResult, ResultSink, RunReport,
};
use shared::{logging, run_debug, run_info, run_warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();
    logging::init_tracing(Some(&args.log_level));

    let api_key = api_key_from_env().context("API key lookup failed")?;
    let config = args
        .into_config(api_key)
        .context("invalid command line arguments")?;

    logging::log_startup("batched generation run");
    run_debug!(
        "Count: {}, Max per batch: {}, Batches planned: {}, Model: {}",
        config.request.total_count(),
        config.request.max_per_batch(),
        config.request.batch_count(),
        config.client.model
    );

    let client = RealJobClient::new(config.client.clone())?;
    let reporter = LogStatusReporter::new();

    let result = if config.sink.download {
        let sink = FileSink::new(&config.sink, Some(&config.client))?;
        run_info!("📁 Saving artifacts to {}", sink.output_dir().display());
        run_with_sink(client, sink, reporter, &config).await
    } else {
        run_with_sink(client, ConsoleSink::stdout(), reporter, &config).await
    };

    match result {
        Ok(report) => {
            if report.delivery.is_complete() {
                logging::log_success(&format!(
                    "Delivered {} artifact(s) in {} batch(es)",
                    report.delivery.delivered.len(),
                    report.batches
                ));
            } else {
                for failure in &report.delivery.failed {
                    run_warn!("⚠️ Artifact {} ({}) not delivered: {}", failure.position, failure.artifact, failure.error);
                }
                run_warn!(
                    "⚠️ Delivered {} of {} artifact(s)",
                    report.delivery.delivered.len(),
                    report.delivery.total()
                );
            }
            Ok(())
        }
        Err(OrchestratorError::Interrupted) => {
            logging::log_shutdown("Received Ctrl+C signal");
            Err(OrchestratorError::Interrupted.into())
        }
        Err(e) => {
            logging::log_error("Generation run", &e);
            Err(e.into())
        }
    }
}

/// Run the orchestrator until it finishes or Ctrl+C arrives
async fn run_with_sink<S>(
    client: RealJobClient,
    sink: S,
    reporter: LogStatusReporter,
    config: &AppConfig,
) -> OrchestratorResult<RunReport>
where
    S: ResultSink + 'static,
{
    let orchestrator = Orchestrator::new(client, sink, reporter, config.orchestrator.clone());

    run_until_interrupted(orchestrator.run(config.request.clone()), signal::ctrl_c()).await
}
