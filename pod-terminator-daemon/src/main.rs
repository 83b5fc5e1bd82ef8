use clap::Parser as _;
use pod_terminator::SystemClock;
use pod_terminator::Terminator;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use args::Args;

mod args;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Args::parse().into_run_config();
    tracing::info!(
        max_seconds = config.max_age.as_secs(),
        namespace = config.namespace().unwrap_or_default(),
        cycle_delay = config.cycle_delay.as_secs(),
        dry_run = config.dry_run,
        "Starting pod-terminator"
    );

    let clock = SystemClock;
    let (mut client, mut credentials) = pod_terminator::connect(&config, &clock).await?;

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    Terminator::new(&config, &mut client, credentials.as_mut(), clock)
        .run(shutdown)
        .await;

    tracing::info!("Bye");
    Ok(())
}

async fn cancel_on_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(%err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
    shutdown.cancel();
}
