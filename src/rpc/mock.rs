//! Mock node for testing.
//!
//! Serves canned storage values by path without any network access.

use super::{NodeQuery, RpcError, RpcResult};
use async_trait::async_trait;
use std::collections::HashMap;

/// In-memory [`NodeQuery`] backed by a path -> bytes table.
#[derive(Debug, Clone, Default)]
pub struct MockNodeQuery {
    values: HashMap<String, Vec<u8>>,
    failure: Option<String>,
}

impl MockNodeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `path` (for test setup).
    pub fn with_value(mut self, path: &str, value: Vec<u8>) -> Self {
        self.values.insert(path.to_string(), value);
        self
    }

    /// Make every query fail as if the node were unavailable.
    pub fn failing(mut self, reason: &str) -> Self {
        self.failure = Some(reason.to_string());
        self
    }
}

#[async_trait]
impl NodeQuery for MockNodeQuery {
    async fn query(&self, path: &str) -> RpcResult<Option<Vec<u8>>> {
        if let Some(reason) = &self.failure {
            return Err(RpcError::Http {
                status: 503,
                body: reason.clone(),
            });
        }
        Ok(self.values.get(path).cloned())
    }
}
