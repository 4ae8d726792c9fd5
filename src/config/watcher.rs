//! Configuration file watcher for hot reload.
//!
//! A reload re-reads and validates the whole file, then hands it to the
//! server, which applies the new quota policy and any `[features]` entries
//! whose value changed. Listener, concurrency capacity, upstream bound and
//! input pattern are read once at startup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::GatewayConfig;

/// Watches the gateway's TOML file and publishes validated reloads.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<GatewayConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiver the server drains.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<GatewayConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file. Dropping the returned handle stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    reload(&path, &tx);
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// Load `path` and publish it. An invalid file keeps the running config.
///
/// Returns true when a new config was sent.
fn reload(path: &Path, tx: &mpsc::UnboundedSender<GatewayConfig>) -> bool {
    match load_config(path) {
        Ok(config) => {
            tracing::info!(
                path = ?path,
                quota_limit = config.quota.limit,
                quota_window_secs = config.quota.window_secs,
                "Gateway config reloaded"
            );
            tx.send(config).is_ok()
        }
        Err(e) => {
            tracing::error!(
                path = ?path,
                error = %e,
                "Failed to reload config, keeping current configuration"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}.toml", name, std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_valid_file_is_published() {
        let path = scratch_file("gateway-reload-ok", "[quota]\nlimit = 9\n");
        let (watcher, mut rx) = ConfigWatcher::new(&path);

        assert!(reload(&path, &watcher.update_tx));
        assert_eq!(rx.try_recv().unwrap().quota.limit, 9);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_invalid_file_is_dropped() {
        let path = scratch_file("gateway-reload-bad", "[quota]\nlimit = 0\n");
        let (watcher, mut rx) = ConfigWatcher::new(&path);

        assert!(!reload(&path, &watcher.update_tx));
        assert!(rx.try_recv().is_err());
        std::fs::remove_file(&path).unwrap();
    }
}
