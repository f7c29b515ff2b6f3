use crate::error::CredentialError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Opaque per-account authorization payload, exactly as issued by the host platform.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credential {
    raw: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("raw", &"***REDACTED***")
            .finish()
    }
}

/// User identity embedded in a credential's `user` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountIdentity {
    pub id: u64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl AccountIdentity {
    pub fn display_name(&self) -> String {
        self.first_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(self.username.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| self.id.to_string())
    }
}

impl Credential {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The credential as sent on the wire
    pub fn expose(&self) -> &str {
        &self.raw
    }

    /// Decodes the URL-encoded user JSON carried in the `user` parameter.
    pub fn identity(&self) -> Result<AccountIdentity, CredentialError> {
        let user_json = url::form_urlencoded::parse(self.raw.as_bytes())
            .find(|(key, _)| key == "user")
            .map(|(_, value)| value.into_owned())
            .ok_or(CredentialError::MissingUser)?;

        serde_json::from_str(&user_json).map_err(|e| CredentialError::InvalidUserJson {
            reason: e.to_string(),
        })
    }
}

pub struct CredentialManager {
    credentials: Vec<Credential>,
}

impl CredentialManager {
    /// Loads credentials from a newline-delimited file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials from {}", path.display()))?;
        let manager = Self::parse(&content);
        info!(
            "Loaded {} accounts from {}",
            manager.count(),
            path.display()
        );
        Ok(manager)
    }

    /// Parses file content; blank lines and `#` comments are ignored, lines
    /// without a readable identity are dropped with a warning.
    pub fn parse(content: &str) -> Self {
        let mut credentials = Vec::new();

        for (i, line) in content.replace('\r', "").lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let credential = Credential::new(line);
            match credential.identity() {
                Ok(_) => credentials.push(credential),
                Err(e) => warn!("Skipping credential on line {}: {}", i + 1, e),
            }
        }

        Self { credentials }
    }

    pub fn count(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    pub fn credentials(&self) -> &[Credential] {
        &self.credentials
    }
}
