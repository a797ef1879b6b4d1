//! Chain addresses and their bech32m display form.
//!
//! Addresses are kept as raw bytes exactly as they were decoded. The
//! human-readable string is produced only when rendering.

use bech32::{ToBase32, Variant};
use borsh::{BorshDeserialize, BorshSerialize};
use std::fmt;
use thiserror::Error;

/// Length of the hash carried by established and implicit addresses.
pub const HASH_LEN: usize = 20;

/// Raw encoding length: one prefix byte followed by the address hash.
pub const ADDR_ENCODING_LEN: usize = 1 + HASH_LEN;

/// Human-readable part used when no other prefix is configured.
pub const DEFAULT_ADDRESS_HRP: &str = "tnam";

/// Prefix byte placed in front of the hash before bech32m encoding.
const ADDRESS_ENCODING_PREFIX: u8 = 0;

/// Address rendering errors.
#[derive(Debug, Error)]
pub enum AddressError {
    /// The configured human-readable part is not valid for bech32m.
    #[error("invalid address prefix '{hrp}': {source}")]
    InvalidHrp {
        hrp: String,
        #[source]
        source: bech32::Error,
    },
}

/// Protocol-internal accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize)]
pub enum InternalAddress {
    Implicit,
    Established,
    Pos,
    SlashPool,
    Parameters,
    Governance,
    Ibc,
    EthBridge,
    BridgePool,
    Multitoken,
    Pgf,
    /// Wrapped Ethereum token, keyed by its 20-byte contract address.
    Erc20([u8; 20]),
    /// Non-usable token, keyed by its 20-byte contract address.
    Nut([u8; 20]),
    /// IBC token, keyed by its 20-byte denomination hash.
    IbcToken([u8; 20]),
    Masp,
    TempStorage,
    ReplayProtection,
}

impl InternalAddress {
    /// Variant name used in the rendered form.
    pub fn name(&self) -> &'static str {
        match self {
            InternalAddress::Implicit => "Implicit",
            InternalAddress::Established => "Established",
            InternalAddress::Pos => "Pos",
            InternalAddress::SlashPool => "SlashPool",
            InternalAddress::Parameters => "Parameters",
            InternalAddress::Governance => "Governance",
            InternalAddress::Ibc => "Ibc",
            InternalAddress::EthBridge => "EthBridge",
            InternalAddress::BridgePool => "BridgePool",
            InternalAddress::Multitoken => "Multitoken",
            InternalAddress::Pgf => "Pgf",
            InternalAddress::Erc20(_) => "Erc20",
            InternalAddress::Nut(_) => "Nut",
            InternalAddress::IbcToken(_) => "IbcToken",
            InternalAddress::Masp => "Masp",
            InternalAddress::TempStorage => "TempStorage",
            InternalAddress::ReplayProtection => "ReplayProtection",
        }
    }
}

impl fmt::Display for InternalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InternalAddress::Erc20(key) | InternalAddress::Nut(key) | InternalAddress::IbcToken(key) => {
                write!(f, "{}(0x{})", self.name(), hex::encode(key))
            }
            _ => f.write_str(self.name()),
        }
    }
}

/// An account address as stored on chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize)]
pub enum Address {
    Internal(InternalAddress),
    Established([u8; HASH_LEN]),
    Implicit([u8; HASH_LEN]),
}

impl Address {
    /// Raw bytes fed to the bech32m encoder, or `None` for internal addresses.
    pub fn to_raw_bytes(&self) -> Option<[u8; ADDR_ENCODING_LEN]> {
        let hash = match self {
            Address::Established(hash) | Address::Implicit(hash) => hash,
            Address::Internal(_) => return None,
        };
        let mut raw = [0u8; ADDR_ENCODING_LEN];
        raw[0] = ADDRESS_ENCODING_PREFIX;
        raw[1..].copy_from_slice(hash);
        Some(raw)
    }

    /// Render with the given human-readable part.
    ///
    /// Internal addresses have no bech32m form and render as
    /// `Internal(<Variant>)` regardless of `hrp`.
    pub fn encode(&self, hrp: &str) -> Result<String, AddressError> {
        match self.to_raw_bytes() {
            Some(raw) => bech32::encode(hrp, raw.to_base32(), Variant::Bech32m).map_err(|source| {
                AddressError::InvalidHrp {
                    hrp: hrp.to_string(),
                    source,
                }
            }),
            None => Ok(self.to_string()),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Internal(internal) => write!(f, "Internal({})", internal),
            _ => {
                let encoded = self.encode(DEFAULT_ADDRESS_HRP).map_err(|_| fmt::Error)?;
                f.write_str(&encoded)
            }
        }
    }
}
