//! Node storage queries.
//!
//! The proposal tools only need "the bytes stored under this path". The
//! [`NodeQuery`] trait captures that so commands can run against
//! [`mock::MockNodeQuery`] in tests and [`RpcClient`] in production.

use crate::proposal::{decode_epoch, decode_proposal_query, DecodeError, Epoch, ProposalRecord};
use async_trait::async_trait;
use thiserror::Error;

pub mod client;
pub mod mock;

pub use client::RpcClient;

/// Storage path of the node's last committed epoch.
pub const EPOCH_PATH: &str = "/shell/epoch";

/// Storage path of a governance proposal.
pub fn proposal_path(id: u64) -> String {
    format!("/vp/governance/proposal/{}", id)
}

/// Result type for node queries.
pub type RpcResult<T> = Result<T, RpcError>;

/// Transport and protocol errors from the node's query interface.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The HTTP request could not be completed.
    #[error("could not reach node: {0}")]
    Transport(#[from] reqwest::Error),

    /// The node answered with a non-success HTTP status.
    #[error("node returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The query itself was rejected by the node.
    #[error("query '{path}' failed with code {code}: {log}")]
    Query { path: String, code: i64, log: String },

    /// The response body did not have the expected shape.
    #[error("invalid query response: {0}")]
    InvalidResponse(String),

    /// The value field was not valid base64.
    #[error("invalid base64 in query value: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// Errors from fetching and decoding a chain value.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The node has nothing stored under this proposal id.
    #[error("proposal {0} not found")]
    ProposalNotFound(u64),

    /// The node returned no value for the epoch query.
    #[error("node returned no value for '{0}'")]
    MissingValue(String),
}

/// Read raw storage values from a node.
#[async_trait]
pub trait NodeQuery: Send + Sync {
    /// Raw bytes under `path`, or `None` when the node returned no value.
    async fn query(&self, path: &str) -> RpcResult<Option<Vec<u8>>>;
}

/// Fetch and decode the node's last committed epoch.
pub async fn fetch_current_epoch<Q: NodeQuery + ?Sized>(node: &Q) -> Result<Epoch, FetchError> {
    let raw = node
        .query(EPOCH_PATH)
        .await?
        .ok_or_else(|| FetchError::MissingValue(EPOCH_PATH.to_string()))?;
    let epoch = decode_epoch(&raw)?;
    tracing::debug!(epoch = epoch.0, "fetched current epoch");
    Ok(epoch)
}

/// Fetch and decode a proposal by id.
pub async fn fetch_proposal<Q: NodeQuery + ?Sized>(
    node: &Q,
    id: u64,
) -> Result<ProposalRecord, FetchError> {
    let path = proposal_path(id);
    let raw = node
        .query(&path)
        .await?
        .ok_or(FetchError::ProposalNotFound(id))?;
    tracing::debug!(id, bytes = raw.len(), "fetched proposal bytes");

    decode_proposal_query(&raw)?.ok_or(FetchError::ProposalNotFound(id))
}

#[cfg(test)]
mod tests {
    use super::mock::MockNodeQuery;
    use super::*;
    use crate::proposal::{encode_proposal, Address, ProposalType};

    fn stored_proposal(id: u64) -> Vec<u8> {
        let record = ProposalRecord {
            id,
            content: [("title", "Test")].into_iter().collect(),
            author: Address::Implicit([5u8; 20]),
            proposal_type: ProposalType::Default,
            voting_start_epoch: Epoch(2),
            voting_end_epoch: Epoch(4),
            activation_epoch: Epoch(5),
        };
        let mut bytes = vec![1u8];
        bytes.extend(encode_proposal(&record).unwrap());
        bytes
    }

    #[test]
    fn test_proposal_path() {
        assert_eq!(proposal_path(0), "/vp/governance/proposal/0");
        assert_eq!(proposal_path(42), "/vp/governance/proposal/42");
    }

    #[tokio::test]
    async fn test_fetch_current_epoch() {
        let node = MockNodeQuery::new().with_value(EPOCH_PATH, 17u64.to_le_bytes().to_vec());
        assert_eq!(fetch_current_epoch(&node).await.unwrap(), Epoch(17));
    }

    #[tokio::test]
    async fn test_fetch_current_epoch_missing() {
        let node = MockNodeQuery::new();
        let err = fetch_current_epoch(&node).await.unwrap_err();
        assert!(matches!(err, FetchError::MissingValue(_)));
    }

    #[tokio::test]
    async fn test_fetch_proposal() {
        let node = MockNodeQuery::new().with_value(&proposal_path(3), stored_proposal(3));
        let record = fetch_proposal(&node, 3).await.unwrap();
        assert_eq!(record.id, 3);
        assert_eq!(record.content.get("title"), Some("Test"));
    }

    #[tokio::test]
    async fn test_fetch_proposal_none_envelope() {
        let node = MockNodeQuery::new().with_value(&proposal_path(9), vec![0]);
        let err = fetch_proposal(&node, 9).await.unwrap_err();
        assert!(matches!(err, FetchError::ProposalNotFound(9)));
    }

    #[tokio::test]
    async fn test_fetch_proposal_malformed_is_decode_error() {
        let node = MockNodeQuery::new().with_value(&proposal_path(1), vec![1, 2, 3]);
        let err = fetch_proposal(&node, 1).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(DecodeError::MalformedRecord(_))));
    }

    #[tokio::test]
    async fn test_fetch_proposal_transport_failure_is_rpc_error() {
        let node = MockNodeQuery::new().failing("connection refused");
        let err = fetch_proposal(&node, 1).await.unwrap_err();
        assert!(matches!(err, FetchError::Rpc(_)));
    }
}
