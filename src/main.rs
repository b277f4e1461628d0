mod bridge;
mod catalog;
mod config;
mod matcher;
mod model;
mod normalizer;
mod source;

use catalog::CatalogStore;
use config::{load_config, AppConfig};
use source::{build_source, reload, CatalogSource};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};
use futures::future::join_all;

const DEFAULT_CONFIG: &str = "config.json";
const RELOAD_COMMAND: &str = ":reload";

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Log panics instead of dying silently on a worker thread
    std::panic::set_hook(Box::new(|panic_info| {
        error!("Panic occurred: {}", panic_info);
    }));

    // First argument ending in .json is the config file, the rest are device names
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let config_path = match args.first() {
        Some(first) if first.ends_with(".json") => args.remove(0),
        _ => DEFAULT_CONFIG.to_string(),
    };

    let config: Arc<AppConfig> = match load_config(&config_path) {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!("Config load error ({}): {}", config_path, e);
            return;
        }
    };

    let source: Arc<dyn CatalogSource> = match build_source(&config) {
        Ok(s) => Arc::from(s),
        Err(e) => {
            error!("Failed to set up catalog source: {}", e);
            return;
        }
    };

    // Initial catalog load is mandatory
    let store = Arc::new(CatalogStore::empty());
    if let Err(e) = reload(source.as_ref(), &store, config.format(), config.platform).await {
        error!("Initial catalog load failed: {}", e);
        return;
    }

    if !args.is_empty() {
        resolve_all(&args, &store, &config).await;
        return;
    }

    let refresh_notify = Arc::new(Notify::new());
    spawn_reloader(source.clone(), store.clone(), config.clone(), refresh_notify.clone());

    info!("Reading device names from stdin ('{}' reloads the catalog)...", RELOAD_COMMAND);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read stdin: {}", e);
                break;
            }
        };

        if line.trim() == RELOAD_COMMAND {
            info!("Manual reload requested.");
            refresh_notify.notify_one();
            continue;
        }
        let name = resolve_one(&line, &store, &config).await;
        print_result(&line, &name);
    }
    info!("Input closed, shutting down.");
}

/// Resolves several names concurrently and prints them in input order.
async fn resolve_all(names: &[String], store: &CatalogStore, config: &AppConfig) {
    let tasks: Vec<_> = names
        .iter()
        .map(|raw| resolve_one(raw, store, config))
        .collect();
    let results = join_all(tasks).await;
    for (raw, name) in names.iter().zip(results) {
        print_result(raw, &name);
    }
}

/// Goes through the host boundary exactly like an embedding caller would:
/// a fixed-capacity buffer that receives the profile name.
async fn resolve_one(raw: &str, store: &CatalogStore, config: &AppConfig) -> String {
    let mut buf = vec![0u8; config.response_capacity];
    let written =
        bridge::find_auto_input_config_name(store, raw, &mut buf, config.threshold).await;
    let name = bridge::read_name(&buf[..written]).into_owned();

    if let Some(profile) = store.snapshot().catalog.find(&name) {
        for (slot, settings) in profile.controllers.iter().enumerate() {
            let plugged = settings
                .get("plugged")
                .map(ToString::to_string)
                .unwrap_or_else(|| "unset".into());
            debug!(
                "'{}' controller {}: {} mapping entries, plugged {}",
                profile.name,
                slot + 1,
                settings.len(),
                plugged
            );
        }
    }
    name
}

fn print_result(raw: &str, name: &str) {
    if name.is_empty() {
        println!("{} => <no match>", raw);
    } else {
        println!("{} => {}", raw, name);
    }
}

/// Reloads the catalog on a timer or when a manual refresh is requested.
fn spawn_reloader(
    source: Arc<dyn CatalogSource>,
    store: Arc<CatalogStore>,
    config: Arc<AppConfig>,
    refresh_notify: Arc<Notify>,
) {
    tokio::spawn(async move {
        loop {
            if config.reload_interval_seconds == 0 {
                refresh_notify.notified().await;
                info!("Manual refresh triggered.");
            } else {
                tokio::select! {
                    _ = sleep(Duration::from_secs(config.reload_interval_seconds)) => {
                        info!("Reload timer triggered.");
                    }
                    _ = refresh_notify.notified() => {
                        info!("Manual refresh triggered.");
                    }
                }
            }

            if reload(source.as_ref(), &store, config.format(), config.platform)
                .await
                .is_ok()
            {
                let snapshot = store.snapshot();
                info!(
                    "Catalog now {} profiles from {} (loaded {})",
                    snapshot.catalog.len(),
                    snapshot.source,
                    snapshot.loaded_at.to_rfc3339()
                );
            }
        }
    });
}
