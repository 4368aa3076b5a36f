//! `monitor` command implementation.
//!
//! Runs the dispatch loop against an in-process bus fed by a replay file or
//! the simulated service, printing the cached position periodically.

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use attribute_cache::{AttributeCache, QueryFacade};
use config_loader::ConfigLoader;
use contracts::Snapshot;
use dispatcher::{channel_bus, DispatchLoop, NotificationPublisher, StopOutcome};

use crate::cli::MonitorArgs;
use crate::replay::read_frames;
use crate::service::SimulatedService;

/// Execute the `monitor` command
pub async fn run_monitor(args: &MonitorArgs) -> Result<()> {
    let config = ConfigLoader::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(port) = config.telemetry.metrics_port {
        observability::init_metrics_only(port)?;
    }

    let interval = Duration::from_millis(args.interval_ms.max(1));
    let cache = Arc::new(AttributeCache::new());
    let facade = QueryFacade::new(Arc::clone(&cache));

    let (publisher, mut connector) = channel_bus("monitor", config.dispatch.channel_capacity);
    let mut dispatch = DispatchLoop::new("monitor", config.dispatch.clone(), Arc::clone(&cache));
    dispatch
        .connect(&mut connector)
        .context("Failed to connect to notification bus")?;
    dispatch.listen().context("Failed to start dispatch loop")?;

    let feeding = Arc::new(AtomicBool::new(true));
    let feeder = spawn_feeder(args, publisher, interval, Arc::clone(&feeding))?;

    let deadline = async {
        match args.duration_secs {
            0 => std::future::pending::<()>().await,
            secs => tokio::time::sleep(Duration::from_secs(secs)).await,
        }
    };
    tokio::pin!(deadline);
    let shutdown = setup_shutdown_signal();
    tokio::pin!(shutdown);

    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                print_snapshot(&facade.snapshot_all(), args.json)?;
                if !dispatch.is_listening() {
                    info!("Notification source drained");
                    break;
                }
            }
            _ = &mut deadline => {
                info!(duration_secs = args.duration_secs, "Monitor duration elapsed");
                break;
            }
            _ = &mut shutdown => {
                warn!("Received shutdown signal, stopping monitor...");
                break;
            }
        }
    }

    feeding.store(false, Ordering::Release);
    let metrics = Arc::clone(dispatch.metrics());
    let outcome = tokio::task::spawn_blocking(move || dispatch.stop())
        .await
        .context("Dispatch stop task failed")??;
    if outcome == StopOutcome::TimedOut {
        warn!("Dispatch thread detached after stop timeout");
    }
    if let Err(e) = feeder.await {
        warn!(error = %e, "Feeder task failed");
    }

    print_snapshot(&facade.snapshot_all(), args.json)?;
    info!(metrics = ?metrics.snapshot(), "Monitor finished");
    Ok(())
}

/// Start publishing notifications on a blocking task
fn spawn_feeder(
    args: &MonitorArgs,
    publisher: NotificationPublisher,
    interval: Duration,
    feeding: Arc<AtomicBool>,
) -> Result<tokio::task::JoinHandle<()>> {
    if let Some(path) = &args.replay {
        let frames = read_frames(path)
            .with_context(|| format!("Failed to read replay file {}", path.display()))?;
        info!(path = %path.display(), frames = frames.len(), "Replaying notifications");

        return Ok(tokio::task::spawn_blocking(move || {
            for frame in frames {
                if !feeding.load(Ordering::Acquire) {
                    break;
                }
                if let Err(e) = publisher.publish(frame) {
                    warn!(error = %e, "Replay stopped");
                    break;
                }
            }
            debug!("Replay complete");
            // dropping the publisher closes the bus
        }));
    }

    info!(interval_ms = interval.as_millis() as u64, "Simulating notifications");
    Ok(tokio::task::spawn_blocking(move || {
        let mut service = SimulatedService::default();
        while feeding.load(Ordering::Acquire) {
            if let Err(e) = publisher.publish(service.next_update()) {
                warn!(error = %e, "Simulation stopped");
                break;
            }
            std::thread::sleep(interval);
        }
    }))
}

fn print_snapshot(snapshot: &Snapshot, json: bool) -> Result<()> {
    if json {
        let line = serde_json::to_string(snapshot).context("Failed to serialize snapshot")?;
        println!("{line}");
    } else {
        let fields: Vec<String> = snapshot
            .iter()
            .map(|(key, value)| format!("{key}={value:.8}"))
            .collect();
        println!(
            "[{}] {}",
            snapshot.timestamp_ms.unwrap_or_default(),
            fields.join(" ")
        );
    }
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
