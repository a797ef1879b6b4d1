//! Governance proposal records.
//!
//! A proposal is read from the node as raw Borsh bytes, decoded in one pass
//! into a [`ProposalRecord`], and given a [`ProposalStatus`] relative to the
//! node's current epoch. Decoding is pure: no I/O, no shared state.

pub mod address;
pub mod decode;
pub mod display;
pub mod pgf;
pub mod status;
pub mod types;

#[cfg(test)]
mod proptests;

pub use address::{Address, AddressError, InternalAddress, DEFAULT_ADDRESS_HRP};
pub use decode::{
    decode_epoch, decode_proposal, decode_proposal_query, encode_proposal, DecodeError,
    MIN_RECORD_LEN,
};
pub use display::ProposalReport;
pub use pgf::{AddRemove, Amount, PgfAction, PgfTarget};
pub use status::{derive_status, ProposalStatus};
pub use types::{DataHash, Epoch, ProposalContent, ProposalRecord, ProposalType, DATA_HASH_LEN};
