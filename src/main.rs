//! Momentum engine entry point.
//!
//! Loads configuration and the trading set, initialises structured logging,
//! connects the gateway, then pumps inbound events through the engine until
//! the feed ends or Ctrl+C is pressed.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use momentum_engine::bus::EventBus;
use momentum_engine::config::{self, AppConfig};
use momentum_engine::engine::{EngineSettings, StrategyEngine};
use momentum_engine::feed;
use momentum_engine::gateway::paper::PaperGateway;
use momentum_engine::gateway::TradingGateway;
use momentum_engine::types::{EngineEvent, Event};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path =
        std::env::var("MOMENTUM_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let cfg = AppConfig::load(&config_path)?;

    init_logging();

    info!(
        name = %cfg.engine.name,
        setting_path = %cfg.engine.setting_path,
        price_offset = %cfg.engine.price_offset,
        history_capacity = cfg.engine.history_capacity,
        "Momentum engine starting up"
    );

    // An empty or unreadable trading set is fatal.
    let trading_symbols = config::load_trading_symbols(&cfg.engine.setting_path)
        .context("Cannot start without a trading set")?;

    // -- Initialise components -------------------------------------------

    let gateway = PaperGateway::new(&cfg.gateway.name);
    gateway.connect().await?;
    let gateway: Arc<dyn TradingGateway> = Arc::new(gateway);

    let bus = EventBus::default();
    let printer = spawn_printer(bus.subscribe());

    let settings = EngineSettings::from_config(&cfg, trading_symbols);
    let mut engine = StrategyEngine::new(gateway.clone(), bus, settings);

    let (tx, rx) = mpsc::channel(cfg.engine.channel_capacity);
    let feed_task = tokio::spawn(run_feed(cfg.feed.path.clone(), tx));

    // -- Main loop -------------------------------------------------------

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    tokio::select! {
        handled = engine.run(rx) => {
            info!(handled, "Feed exhausted");
        }
        _ = &mut shutdown => {
            info!("Shutdown signal received.");
            feed_task.abort();
        }
    }

    // Dropping the engine closes the bus, which lets the printer drain and exit.
    drop(engine);
    let _ = printer.await;

    if let Err(e) = gateway.close().await {
        error!(gateway = gateway.name(), error = %e, "Failed to close gateway");
    }
    info!(name = %cfg.engine.name, "Momentum engine shut down cleanly.");

    Ok(())
}

/// Read events from the configured file, or stdin when none is set.
async fn run_feed(path: Option<String>, tx: mpsc::Sender<Event>) {
    let result = match path {
        Some(path) => match tokio::fs::File::open(&path).await {
            Ok(file) => {
                info!(path = %path, "Reading events from file");
                feed::pump_events(BufReader::new(file), tx).await
            }
            Err(e) => {
                error!(path = %path, error = %e, "Cannot open event feed");
                return;
            }
        },
        None => {
            info!("Reading events from stdin");
            feed::pump_events(BufReader::new(tokio::io::stdin()), tx).await
        }
    };

    match result {
        Ok(count) => debug!(count, "Feed finished"),
        Err(e) => error!(error = %e, "Feed failed"),
    }
}

/// Print everything the engine publishes, like a console log window.
fn spawn_printer(mut rx: broadcast::Receiver<EngineEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(EngineEvent::Log(log)) => {
                    info!(source = %log.source, datetime = %log.datetime, "{}", log.message);
                }
                Ok(EngineEvent::Signal(signal)) => {
                    debug!(
                        instrument = %signal.instrument,
                        datetime = %signal.datetime,
                        last_price = %signal.last_price,
                        target = %signal.target,
                        "Signal"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Printer fell behind, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("momentum_engine=info"));

    let json_logging = std::env::var("MOMENTUM_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
