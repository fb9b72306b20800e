//! Application context: store path resolution and service construction.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use padvault_core::{PadService, SqlitePadStore};

/// Client key for admission control; the CLI is a single local client.
pub const CLIENT_KEY: &str = "local";

pub struct AppContext {
    store_path: PathBuf,
}

impl AppContext {
    pub fn new(store: Option<String>) -> Self {
        let store_path = store.map(PathBuf::from).unwrap_or_else(default_store_path);
        Self { store_path }
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Open the store and wrap it in a service. The sweep secret, when
    /// deployed, comes from `PADVAULT_SWEEP_SECRET`.
    pub fn open_service(&self) -> anyhow::Result<PadService<SqlitePadStore>> {
        if let Some(parent) = self.store_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create store directory {}", parent.display())
                })?;
            }
        }

        let store = SqlitePadStore::open(&self.store_path).with_context(|| {
            format!("Failed to open pad store at {}", self.store_path.display())
        })?;

        let mut service = PadService::new(store);
        if let Ok(secret) = std::env::var("PADVAULT_SWEEP_SECRET") {
            if !secret.trim().is_empty() {
                service = service.with_sweep_secret(secret);
            }
        }
        Ok(service)
    }
}

fn default_store_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".padvault").join("pads.db"))
        .unwrap_or_else(|| PathBuf::from("padvault.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_store_path_wins() {
        let ctx = AppContext::new(Some("/tmp/custom/pads.db".to_string()));
        assert_eq!(ctx.store_path(), Path::new("/tmp/custom/pads.db"));
    }

    #[test]
    fn test_open_service_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("pads.db");

        let ctx = AppContext::new(Some(path.to_string_lossy().into_owned()));
        ctx.open_service().unwrap();
        assert!(path.exists());
    }
}
