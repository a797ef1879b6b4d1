//! Borsh decoding of stored proposal records.
//!
//! Layout, in order: `id: u64`, content map, author address, proposal type
//! (`u8` tag + payload), voting start, voting end and activation epochs
//! (`u64` each). Integers are little-endian, lengths are `u32` prefixes.

use super::types::{Epoch, ProposalRecord};
use thiserror::Error;

/// Smallest possible encoding: id, empty content map, internal address
/// (two tags), payload-free type tag, three epochs.
pub const MIN_RECORD_LEN: usize = 8 + 4 + 2 + 1 + 3 * 8;

/// Decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The bytes do not form a valid proposal record.
    #[error("malformed proposal record: {0}")]
    MalformedRecord(String),
}

impl DecodeError {
    fn malformed(err: impl std::fmt::Display) -> Self {
        DecodeError::MalformedRecord(err.to_string())
    }
}

/// Decode a stored proposal record.
///
/// The whole buffer must be consumed. Truncated input, overrunning length
/// prefixes, unknown variant tags, trailing bytes and empty voting windows
/// are all rejected as [`DecodeError::MalformedRecord`].
pub fn decode_proposal(raw: &[u8]) -> Result<ProposalRecord, DecodeError> {
    if raw.len() < MIN_RECORD_LEN {
        return Err(DecodeError::MalformedRecord(format!(
            "record is {} bytes, shorter than the {} byte minimum",
            raw.len(),
            MIN_RECORD_LEN
        )));
    }

    let record: ProposalRecord = borsh::from_slice(raw).map_err(DecodeError::malformed)?;
    check_voting_window(&record)?;

    tracing::debug!(
        id = record.id,
        bytes = raw.len(),
        proposal_type = record.proposal_type.label(),
        "decoded proposal record"
    );

    Ok(record)
}

/// Decode the `Option` envelope returned by the node's storage query.
///
/// `Ok(None)` means the node has no proposal under the queried id.
pub fn decode_proposal_query(raw: &[u8]) -> Result<Option<ProposalRecord>, DecodeError> {
    match raw.split_first() {
        Some((0, [])) => Ok(None),
        Some((0, rest)) => Err(DecodeError::MalformedRecord(format!(
            "{} trailing bytes after empty option",
            rest.len()
        ))),
        Some((1, record)) => decode_proposal(record).map(Some),
        Some((tag, _)) => Err(DecodeError::MalformedRecord(format!(
            "invalid option tag {}",
            tag
        ))),
        None => Err(DecodeError::MalformedRecord("empty response".to_string())),
    }
}

/// Decode the node's current epoch (a bare `u64`).
pub fn decode_epoch(raw: &[u8]) -> Result<Epoch, DecodeError> {
    borsh::from_slice::<Epoch>(raw).map_err(|e| {
        DecodeError::MalformedRecord(format!("epoch is not a u64 ({} bytes): {}", raw.len(), e))
    })
}

/// Encode a record in the storage layout.
pub fn encode_proposal(record: &ProposalRecord) -> std::io::Result<Vec<u8>> {
    borsh::to_vec(record)
}

fn check_voting_window(record: &ProposalRecord) -> Result<(), DecodeError> {
    if record.voting_start_epoch >= record.voting_end_epoch {
        return Err(DecodeError::MalformedRecord(format!(
            "voting start epoch {} is not before end epoch {}",
            record.voting_start_epoch, record.voting_end_epoch
        )));
    }
    Ok(())
}
