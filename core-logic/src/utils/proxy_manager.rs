use crate::config::ProxyConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub struct ProxyManager;

impl ProxyManager {
    /// Loads proxies from `path`. A missing file means "no proxies".
    /// Format expected: independent lines of ip:port[:username:password]
    pub fn load_proxies(path: impl AsRef<Path>) -> Result<Vec<ProxyConfig>> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("{} not found. Running without proxies.", path.display());
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let proxies = Self::parse(&content);

        info!("Loaded {} proxies from {}", proxies.len(), path.display());
        Ok(proxies)
    }

    pub fn parse(content: &str) -> Vec<ProxyConfig> {
        let mut proxies = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split(':').collect();
            if parts.len() < 2 {
                warn!("Skipping invalid proxy line: {}", line);
                continue;
            }

            // ip:port:user:pass -> 4 parts
            // ip:port -> 2 parts
            let url = format!("http://{}:{}", parts[0], parts[1]);

            let (username, password) = if parts.len() >= 4 {
                (Some(parts[2].to_string()), Some(parts[3].to_string()))
            } else {
                (None, None)
            };

            proxies.push(ProxyConfig {
                url,
                username,
                password,
            });
        }

        proxies
    }

    /// Round-robin assignment: account `index` always gets the same proxy.
    pub fn assign(proxies: &[ProxyConfig], index: usize) -> Option<&ProxyConfig> {
        if proxies.is_empty() {
            None
        } else {
            proxies.get(index % proxies.len())
        }
    }
}
