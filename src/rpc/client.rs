//! HTTP client for the node's `abci_query` endpoint.

use super::{NodeQuery, RpcError, RpcResult};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Default node RPC endpoint.
pub const DEFAULT_RPC_URL: &str = "http://localhost:26657";

/// JSON-RPC envelope returned by `GET /abci_query`.
#[derive(Debug, Deserialize)]
struct QueryEnvelope {
    result: Option<QueryResult>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    response: QueryResponse,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    log: String,
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<String>,
}

/// Queries a node over its CometBFT RPC interface.
#[derive(Debug, Clone)]
pub struct RpcClient {
    base_url: String,
    http: Client,
}

impl RpcClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> RpcResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl NodeQuery for RpcClient {
    async fn query(&self, path: &str) -> RpcResult<Option<Vec<u8>>> {
        let url = format!("{}/abci_query", self.base_url);
        let quoted_path = format!("\"{}\"", path);
        tracing::debug!(%url, path, "querying node");

        let resp = self
            .http
            .get(&url)
            .query(&[
                ("path", quoted_path.as_str()),
                ("data", ""),
                ("prove", "false"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RpcError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: QueryEnvelope = resp
            .json()
            .await
            .map_err(|e| RpcError::InvalidResponse(e.to_string()))?;
        parse_envelope(path, envelope)
    }
}

fn parse_envelope(path: &str, envelope: QueryEnvelope) -> RpcResult<Option<Vec<u8>>> {
    if let Some(err) = envelope.error {
        let log = match err.data {
            Some(data) if !data.is_empty() => format!("{}: {}", err.message, data),
            _ => err.message,
        };
        return Err(RpcError::Query {
            path: path.to_string(),
            code: err.code,
            log,
        });
    }

    let response = envelope
        .result
        .ok_or_else(|| RpcError::InvalidResponse("missing 'result' field".to_string()))?
        .response;

    if response.code != 0 {
        return Err(RpcError::Query {
            path: path.to_string(),
            code: response.code,
            log: response.log,
        });
    }

    match response.value {
        Some(value) if !value.is_empty() => Ok(Some(general_purpose::STANDARD.decode(value)?)),
        _ => Ok(None),
    }
}
