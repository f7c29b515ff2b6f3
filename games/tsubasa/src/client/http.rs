use crate::config::ApiConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use core_logic::{JsonResponse, MetricsCollector, NetworkError, ProxyConfig, Transport};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Proxy};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;

// Header names must be lowercase for HeaderName::from_static.
const BROWSER_HEADERS: &[(&str, &str)] = &[
    ("accept", "application/json, text/plain, */*"),
    ("accept-language", "en-US;q=0.6,en;q=0.5"),
    ("origin", "https://app.ton.tsubasa-rivals.com"),
    ("referer", "https://app.ton.tsubasa-rivals.com/"),
    (
        "sec-ch-ua",
        "\"Not/A)Brand\";v=\"99\", \"Google Chrome\";v=\"115\", \"Chromium\";v=\"115\"",
    ),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", "\"Windows\""),
    ("sec-fetch-dest", "empty"),
    ("sec-fetch-mode", "cors"),
    ("sec-fetch-site", "same-origin"),
    (
        "user-agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36",
    ),
];

/// reqwest-backed transport for one account turn. Built fresh per account so
/// each one can go out through its own proxy.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(api: &ApiConfig, proxy: Option<&ProxyConfig>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for &(name, value) in BROWSER_HEADERS {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }

        let timeout = Duration::from_secs(api.timeout_secs);
        let mut client_builder = Client::builder().default_headers(headers).timeout(timeout);

        if let Some(proxy_conf) = proxy {
            let mut proxy = Proxy::all(&proxy_conf.url)
                .with_context(|| format!("Invalid proxy url {}", proxy_conf.url))?;
            if let (Some(u), Some(p)) = (&proxy_conf.username, &proxy_conf.password) {
                proxy = proxy.basic_auth(u, p);
            }
            client_builder = client_builder.proxy(proxy);
        }

        let client = client_builder
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn map_error(&self, endpoint: &str, e: reqwest::Error) -> NetworkError {
        if e.is_timeout() {
            NetworkError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
                endpoint: endpoint.to_string(),
            }
        } else if e.is_connect() {
            NetworkError::ConnectionRefused {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            }
        } else {
            NetworkError::RequestFailed {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(
        &self,
        path: &str,
        headers: &[(String, String)],
        body: Value,
    ) -> Result<JsonResponse, NetworkError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.post(&url).json(&body);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let started = Instant::now();
        let response = request.send().await.map_err(|e| self.map_error(path, e))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| self.map_error(path, e))?;
        MetricsCollector::global().record_call_latency(started.elapsed());

        debug!("POST {} | Status: {}", path, status);

        let body = match serde_json::from_str::<Value>(&text) {
            Ok(value) => value,
            Err(e) if status == 200 => {
                return Err(NetworkError::InvalidResponse {
                    endpoint: path.to_string(),
                    reason: e.to_string(),
                })
            }
            Err(_) => Value::Null,
        };

        Ok(JsonResponse { status, body })
    }
}
