use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tollgate::config::TollgateConfig;
use tollgate::gate::AdmissionGate;
use tollgate::submit::{Document, HttpSender, SubmissionRequest, SubmissionService};

/// Submit registry documents through a windowed admission gate.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Configuration file (YAML); TOLLGATE__* environment variables override it
    #[arg(short, long)]
    config: Option<String>,

    /// JSON file containing the document to submit
    #[arg(short, long)]
    document: String,

    /// Detached signature sent with the document
    #[arg(short, long)]
    signature: String,

    /// Number of concurrent submissions of the document
    #[arg(long, default_value_t = 1)]
    copies: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    info!("Starting Tollgate");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = TollgateConfig::load(args.config.as_deref())?;
    info!(
        window = %config.gate.window,
        capacity = config.gate.capacity,
        url = %config.api.url,
        "Configuration loaded"
    );

    let contents = std::fs::read_to_string(&args.document)
        .with_context(|| format!("failed to read document {}", args.document))?;
    let document: Document = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse document {}", args.document))?;

    let gate = Arc::new(AdmissionGate::from_config(&config.gate)?);
    let sender = HttpSender::new(&config.api)?;
    let service = Arc::new(SubmissionService::new(Arc::clone(&gate), sender));
    let request = Arc::new(SubmissionRequest::new(document, args.signature));

    let submissions = (0..args.copies).map(|copy| {
        let service = Arc::clone(&service);
        let request = Arc::clone(&request);
        async move { (copy, service.submit(request.as_ref()).await) }
    });

    let run = futures::future::join_all(submissions);
    tokio::pin!(run);

    let results = tokio::select! {
        results = &mut run => results,
        _ = shutdown_signal() => {
            // Release anything still waiting for a slot, then collect what finished.
            gate.shutdown();
            run.await
        }
    };

    let mut failed = 0;
    for (copy, result) in results {
        match result {
            Ok(outcome) => info!(copy, status = outcome.status, body = %outcome.body, "Response"),
            Err(e) => {
                failed += 1;
                error!(copy, error = %e, "Submission failed");
            }
        }
    }

    gate.shutdown();
    info!(submitted = args.copies - failed, failed, "Tollgate finished");

    if failed > 0 {
        anyhow::bail!("{} of {} submissions failed", failed, args.copies);
    }
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down admission gate");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down admission gate");
        }
    }
}
