//! Governance proposal record types.

use super::address::Address;
use super::pgf::{AddRemove, PgfAction};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// Width of the payload hash carried by wasm proposals.
pub const DATA_HASH_LEN: usize = 32;

/// Chain epoch.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize,
)]
pub struct Epoch(pub u64);

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Epoch {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// SHA-256 digest of an off-chain payload (e.g. a wasm module).
#[derive(Clone, Copy, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize)]
pub struct DataHash(pub [u8; DATA_HASH_LEN]);

impl DataHash {
    pub fn as_bytes(&self) -> &[u8; DATA_HASH_LEN] {
        &self.0
    }

    /// Uppercase hex, the form operators compare against build checksums.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }
}

impl fmt::Display for DataHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for DataHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataHash({})", self.to_hex())
    }
}

/// Proposal metadata (title, abstract, ...).
///
/// Encoded like a map: `u32` count followed by key/value string pairs.
/// Entries keep the order in which they were decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct ProposalContent(Vec<(String, String)>);

impl ProposalContent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value. Replacing keeps the original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ProposalContent {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut content = Self::new();
        for (key, value) in iter {
            content.insert(key, value);
        }
        content
    }
}

impl fmt::Display for ProposalContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "\"{}\": \"{}\"", key, value)?;
        }
        f.write_str("}")
    }
}

impl Serialize for ProposalContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Closed set of proposal kinds. The Borsh tag is the declaration order.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum ProposalType {
    Default,
    DefaultWithWasm(DataHash),
    PgfSteward(Vec<AddRemove<Address>>),
    PgfPayment(Vec<PgfAction>),
}

impl ProposalType {
    /// Number of known variants; tags at or above this are rejected.
    pub const VARIANT_COUNT: u8 = 4;

    pub fn label(&self) -> &'static str {
        match self {
            ProposalType::Default => "Default",
            ProposalType::DefaultWithWasm(_) => "Default with Wasm",
            ProposalType::PgfSteward(_) => "PGF Steward",
            ProposalType::PgfPayment(_) => "PGF Payment",
        }
    }
}

impl fmt::Display for ProposalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A governance proposal as stored on chain.
///
/// Field order is the wire order.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct ProposalRecord {
    pub id: u64,
    pub content: ProposalContent,
    pub author: Address,
    pub proposal_type: ProposalType,
    pub voting_start_epoch: Epoch,
    pub voting_end_epoch: Epoch,
    /// Meaningful only if the proposal passed.
    pub activation_epoch: Epoch,
}

impl ProposalRecord {
    /// Payload hash, present only for wasm proposals.
    pub fn data_hash(&self) -> Option<&DataHash> {
        match &self.proposal_type {
            ProposalType::DefaultWithWasm(hash) => Some(hash),
            _ => None,
        }
    }
}
