use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::filter::ITEMS_PER_PAGE;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3146";
const DEFAULT_AUTH_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub templates_dir: PathBuf,
    /// Latency of the simulated auth gateway.
    pub auth_delay: Duration,
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3146)),
            templates_dir: default_templates_dir(),
            auth_delay: Duration::from_millis(DEFAULT_AUTH_DELAY_MS),
            page_size: ITEMS_PER_PAGE,
        }
    }
}

pub fn default_templates_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/templates"))
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let bind_addr = var("OWLIST_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("OWLIST_BIND_ADDR must be a socket address like 0.0.0.0:3146")?;
        let templates_dir = var("OWLIST_TEMPLATES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_templates_dir);
        let auth_delay_ms = match var("OWLIST_AUTH_DELAY_MS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .with_context(|| format!("OWLIST_AUTH_DELAY_MS is not a number: {}", v))?,
            None => DEFAULT_AUTH_DELAY_MS,
        };
        let page_size = match var("OWLIST_PAGE_SIZE") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .with_context(|| format!("OWLIST_PAGE_SIZE must be a positive number: {}", v))?,
            None => ITEMS_PER_PAGE,
        };

        if !templates_dir.is_dir() {
            anyhow::bail!("Templates directory not found: {}", templates_dir.display());
        }
        info!(
            "Config: bind {}, templates {}, auth delay {}ms, page size {}",
            bind_addr,
            templates_dir.display(),
            auth_delay_ms,
            page_size
        );
        Ok(Self {
            bind_addr,
            templates_dir,
            auth_delay: Duration::from_millis(auth_delay_ms),
            page_size,
        })
    }

    /// Glob tera loads templates from.
    pub fn templates_glob(&self) -> String {
        format!("{}/**/*.html", self.templates_dir.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_bundled_templates() {
        let config = Config::default();
        assert!(config.templates_dir.is_dir());
        assert!(config.templates_glob().ends_with("templates/**/*.html"));
        assert_eq!(config.page_size, ITEMS_PER_PAGE);
        assert_eq!(config.bind_addr.port(), 3146);
    }
}
