//! Public goods funding payloads carried by PGF proposals.

use super::address::Address;
use borsh::{BorshDeserialize, BorshSerialize};
use std::fmt;

/// Addition or removal of an entry from an on-chain set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize)]
pub enum AddRemove<T> {
    Add(T),
    Remove(T),
}

impl<T> AddRemove<T> {
    pub fn label(&self) -> &'static str {
        match self {
            AddRemove::Add(_) => "Add",
            AddRemove::Remove(_) => "Remove",
        }
    }

    pub fn inner(&self) -> &T {
        match self {
            AddRemove::Add(value) | AddRemove::Remove(value) => value,
        }
    }
}

/// Unsigned 256-bit token amount, four little-endian `u64` limbs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize)]
pub struct Amount([u64; 4]);

impl Amount {
    pub fn from_limbs(limbs: [u64; 4]) -> Self {
        Self(limbs)
    }

    pub fn limbs(&self) -> [u64; 4] {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|limb| *limb == 0)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self([value, 0, 0, 0])
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }

        // Repeated division by ten, most significant limb first.
        let mut limbs = self.0;
        let mut digits = Vec::with_capacity(78);
        while limbs.iter().any(|limb| *limb != 0) {
            let mut rem: u128 = 0;
            for limb in limbs.iter_mut().rev() {
                let current = (rem << 64) | u128::from(*limb);
                *limb = (current / 10) as u64;
                rem = current % 10;
            }
            digits.push(b'0' + rem as u8);
        }
        digits.reverse();

        let rendered = std::str::from_utf8(&digits).map_err(|_| fmt::Error)?;
        f.write_str(rendered)
    }
}

/// Recipient of a funding action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize)]
pub enum PgfTarget {
    /// Account on this chain.
    Internal { target: Address, amount: Amount },
    /// Account on a counterparty chain, reached over IBC.
    Ibc {
        target: String,
        amount: Amount,
        port_id: String,
        channel_id: String,
    },
}

impl PgfTarget {
    pub fn amount(&self) -> Amount {
        match self {
            PgfTarget::Internal { amount, .. } | PgfTarget::Ibc { amount, .. } => *amount,
        }
    }

    /// Render the recipient, using `hrp` for on-chain addresses.
    pub fn describe(&self, hrp: &str) -> Result<String, super::address::AddressError> {
        Ok(match self {
            PgfTarget::Internal { target, amount } => {
                format!("{} ({})", target.encode(hrp)?, amount)
            }
            PgfTarget::Ibc {
                target,
                amount,
                port_id,
                channel_id,
            } => format!("{}/{}/{} ({})", port_id, channel_id, target, amount),
        })
    }
}

/// A single funding action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize)]
pub enum PgfAction {
    /// Start or stop a recurring payment.
    Continuous(AddRemove<PgfTarget>),
    /// One-off retroactive payment.
    Retro(PgfTarget),
}

impl PgfAction {
    pub fn describe(&self, hrp: &str) -> Result<String, super::address::AddressError> {
        Ok(match self {
            PgfAction::Continuous(change) => {
                format!("Continuous {} {}", change.label(), change.inner().describe(hrp)?)
            }
            PgfAction::Retro(target) => format!("Retro {}", target.describe(hrp)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_display_small() {
        assert_eq!(Amount::from(0).to_string(), "0");
        assert_eq!(Amount::from(1_000_000).to_string(), "1000000");
        assert_eq!(Amount::from(u64::MAX).to_string(), "18446744073709551615");
    }

    #[test]
    fn test_amount_display_crosses_limb_boundary() {
        let two_pow_64 = Amount::from_limbs([0, 1, 0, 0]);
        assert_eq!(two_pow_64.to_string(), "18446744073709551616");

        let two_pow_128 = Amount::from_limbs([0, 0, 1, 0]);
        assert_eq!(two_pow_128.to_string(), "340282366920938463463374607431768211456");
    }

    #[test]
    fn test_amount_borsh_width() {
        let bytes = borsh::to_vec(&Amount::from(5)).unwrap();
        assert_eq!(bytes.len(), 32);
        assert_eq!(bytes[0], 5);
    }

    #[test]
    fn test_pgf_action_describe() {
        let internal = PgfAction::Continuous(AddRemove::Add(PgfTarget::Internal {
            target: Address::Implicit([0u8; 20]),
            amount: Amount::from(42),
        }));
        assert_eq!(
            internal.describe("tnam").unwrap(),
            "Continuous Add tnam1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqjpwq6t (42)"
        );

        let ibc = PgfAction::Retro(PgfTarget::Ibc {
            target: "cosmos1recipient".to_string(),
            amount: Amount::from(7),
            port_id: "transfer".to_string(),
            channel_id: "channel-0".to_string(),
        });
        assert_eq!(
            ibc.describe("tnam").unwrap(),
            "Retro transfer/channel-0/cosmos1recipient (7)"
        );
    }

    #[test]
    fn test_add_remove_accessors() {
        let change = AddRemove::Remove(3u8);
        assert_eq!(change.label(), "Remove");
        assert_eq!(*change.inner(), 3);
    }
}
