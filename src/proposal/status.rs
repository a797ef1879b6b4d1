//! Voting status derived from a record and the current epoch.

use super::types::{Epoch, ProposalRecord};
use serde::Serialize;
use std::fmt;

/// Where the current epoch falls relative to the voting window.
///
/// Variants are ordered, so the status never decreases as the epoch grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProposalStatus {
    Pending,
    OnGoing,
    Ended,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Pending => "pending",
            ProposalStatus::OnGoing => "on-going",
            ProposalStatus::Ended => "ended",
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The voting window is `[voting_start_epoch, voting_end_epoch)`.
pub fn derive_status(record: &ProposalRecord, current_epoch: Epoch) -> ProposalStatus {
    if current_epoch < record.voting_start_epoch {
        ProposalStatus::Pending
    } else if current_epoch < record.voting_end_epoch {
        ProposalStatus::OnGoing
    } else {
        ProposalStatus::Ended
    }
}
