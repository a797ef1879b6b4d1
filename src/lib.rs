//! nodeops - operator tooling for a Namada node
//!
//! Three independent tools share this crate:
//! - `proposal`: decode and render an on-chain governance proposal
//! - `artifacts`: download CI build artifacts and list wasm checksums
//! - `diagnostics`: collect, redact and archive node diagnostics
//!
//! Everything is sequential. Clients are built per invocation and passed
//! explicitly; there is no global state.

pub mod artifacts;
pub mod diagnostics;
pub mod proposal;
pub mod rpc;
