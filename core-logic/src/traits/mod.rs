use crate::error::NetworkError;
use crate::utils::credential_manager::Credential;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Raw answer of a JSON POST: the HTTP status and the decoded body.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonResponse {
    pub status: u16,
    pub body: Value,
}

impl JsonResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Server-supplied `message` field, if any
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(|m| m.as_str())
    }
}

/// The one call shape every game endpoint uses: POST a JSON body, read back JSON.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `body` to `path` (relative to the transport's base URL) with the
    /// given per-session headers.
    async fn post_json(
        &self,
        path: &str,
        headers: &[(String, String)],
        body: Value,
    ) -> std::result::Result<JsonResponse, NetworkError>;
}

/// Totals reported by one account turn
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AccountStats {
    pub coins: u64,
    pub taps: u64,
    pub skipped: bool,
}

#[async_trait]
pub trait AccountWorker: Send + Sync {
    /// Runs one full turn for the account at roster position `index`
    async fn run_account(&self, index: usize, credential: &Credential) -> Result<AccountStats>;
}
