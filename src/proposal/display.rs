//! Operator-facing rendering of a decoded proposal.

use super::address::AddressError;
use super::pgf::AddRemove;
use super::status::{derive_status, ProposalStatus};
use super::types::{Epoch, ProposalContent, ProposalRecord, ProposalType};
use serde::Serialize;

/// Everything shown for one proposal query, with addresses already rendered.
#[derive(Debug, Clone, Serialize)]
pub struct ProposalReport<'a> {
    pub last_committed_epoch: u64,
    pub proposal_id: u64,
    #[serde(rename = "type")]
    pub proposal_type: &'static str,
    pub author: String,
    pub content: &'a ProposalContent,
    pub start_epoch: u64,
    pub end_epoch: u64,
    pub activation_epoch: u64,
    pub status: ProposalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_hash: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub steward_changes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub payments: Vec<String>,
}

impl<'a> ProposalReport<'a> {
    /// Build the report, rendering addresses with `hrp`.
    pub fn new(
        record: &'a ProposalRecord,
        current_epoch: Epoch,
        hrp: &str,
    ) -> Result<Self, AddressError> {
        let (steward_changes, payments) = match &record.proposal_type {
            ProposalType::PgfSteward(changes) => (
                changes
                    .iter()
                    .map(|change| describe_steward_change(change, hrp))
                    .collect::<Result<Vec<_>, _>>()?,
                Vec::new(),
            ),
            ProposalType::PgfPayment(actions) => (
                Vec::new(),
                actions
                    .iter()
                    .map(|action| action.describe(hrp))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            _ => (Vec::new(), Vec::new()),
        };

        Ok(Self {
            last_committed_epoch: current_epoch.0,
            proposal_id: record.id,
            proposal_type: record.proposal_type.label(),
            author: record.author.encode(hrp)?,
            content: &record.content,
            start_epoch: record.voting_start_epoch.0,
            end_epoch: record.voting_end_epoch.0,
            activation_epoch: record.activation_epoch.0,
            status: derive_status(record, current_epoch),
            data_hash: record.data_hash().map(|hash| hash.to_hex()),
            steward_changes,
            payments,
        })
    }

    /// Labeled lines, in the order the node's own client prints them.
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Last committed epoch: {}", self.last_committed_epoch),
            format!("Proposal Id: {}", self.proposal_id),
            format!("Type: {}", self.proposal_type),
            format!("Author: {}", self.author),
            format!("Content: {}", self.content),
            format!("Start Epoch: {}", self.start_epoch),
            format!("End Epoch: {}", self.end_epoch),
            format!("Activation Epoch: {}", self.activation_epoch),
            format!("Status: {}", self.status),
        ];
        if let Some(hash) = &self.data_hash {
            lines.push(format!("Data Hash: {}", hash));
        }
        if !self.steward_changes.is_empty() {
            lines.push(format!("Steward Changes: {}", self.steward_changes.join(", ")));
        }
        if !self.payments.is_empty() {
            lines.push(format!("Payments: {}", self.payments.join(", ")));
        }
        lines
    }

    pub fn to_text(&self) -> String {
        self.to_lines().join("\n")
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn describe_steward_change(
    change: &AddRemove<super::address::Address>,
    hrp: &str,
) -> Result<String, AddressError> {
    Ok(format!("{} {}", change.label(), change.inner().encode(hrp)?))
}
