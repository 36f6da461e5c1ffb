use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use refcache::cache::CacheManager;
use refcache::config::{Config, DEFAULT_TOPIC_PREFIX};
use refcache::events::{MemoryEventBus, DEFAULT_CAPACITY};
use refcache::mock_data;
use refcache::storage::inmemory::InMemoryRepository;
use refcache_core::dataset::DatasetKey;
use refcache_core::events::{serialize_items, EventBus};

/// refcache - Reference data cache kept coherent over pub/sub
#[derive(Parser, Debug)]
#[command(name = "refcache")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Prefix of change topics
    #[arg(long, default_value = DEFAULT_TOPIC_PREFIX, env = "REFCACHE_TOPIC_PREFIX")]
    topic_prefix: String,

    /// Capacity of the in-memory event channel
    #[arg(long, default_value_t = DEFAULT_CAPACITY, env = "REFCACHE_EVENT_CAPACITY")]
    event_capacity: usize,

    /// Publish a sample rule change after startup
    #[arg(long)]
    demo_event: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "refcache=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config {
        topic_prefix: cli.topic_prefix,
        event_capacity: cli.event_capacity,
    };

    let repository = Arc::new(InMemoryRepository::new());
    mock_data::seed_repository(&repository).await;
    let bus = Arc::new(MemoryEventBus::with_capacity(config.event_capacity));

    let manager = CacheManager::new(repository.clone(), bus.clone(), &config);
    manager.start().await?;

    for key in DatasetKey::ALL {
        let len = manager.read(key).await.map(|items| items.len()).unwrap_or(0);
        tracing::info!(dataset = %key, len, "Dataset cached");
    }

    if let Some(statuses) = manager.read(DatasetKey::WorkflowStatus).await {
        tracing::debug!("Workflow statuses:\n{}", serialize_items(&statuses)?);
    }

    if cli.demo_event {
        let event = mock_data::add_demo_rule(&repository).await;
        bus.publish(&event.topic(&config.topic_prefix), &event).await?;
        tracing::info!(entity_type = event.entity_type(), "Published demo change event");
    }

    tracing::info!("Cache running, press Ctrl+C to stop");
    shutdown_signal().await?;

    if manager.shutdown().await {
        tracing::info!(rules = manager.store().rules().await.len(), "Cache stopped");
    } else {
        tracing::warn!("Cache listener could not be removed cleanly");
    }

    Ok(())
}

/// Wait for shutdown signals (Ctrl+C or SIGTERM).
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = signal::ctrl_c() => {
                result?;
                tracing::info!("Received Ctrl+C, shutting down...");
            }
            _ = terminate.recv() => {
                tracing::info!("Received SIGTERM, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await?;
        tracing::info!("Received Ctrl+C, shutting down...");
    }

    Ok(())
}
