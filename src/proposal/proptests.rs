//! Property-based tests for proposal decoding and status derivation
//!
//! Tests for:
//! - Decoding: roundtrip, truncation rejection, unknown tag rejection
//! - Status: monotonic in the current epoch, exact window boundaries

use super::address::{Address, InternalAddress};
use super::decode::{decode_proposal, encode_proposal, DecodeError};
use super::pgf::{AddRemove, Amount, PgfAction, PgfTarget};
use super::status::{derive_status, ProposalStatus};
use super::types::{DataHash, Epoch, ProposalContent, ProposalRecord, ProposalType};
use proptest::prelude::*;

fn arb_address() -> impl Strategy<Value = Address> {
    prop_oneof![
        any::<[u8; 20]>().prop_map(Address::Established),
        any::<[u8; 20]>().prop_map(Address::Implicit),
        Just(Address::Internal(InternalAddress::Governance)),
        Just(Address::Internal(InternalAddress::Pgf)),
        any::<[u8; 20]>().prop_map(|key| Address::Internal(InternalAddress::Erc20(key))),
    ]
}

fn arb_amount() -> impl Strategy<Value = Amount> {
    any::<[u64; 4]>().prop_map(Amount::from_limbs)
}

fn arb_target() -> impl Strategy<Value = PgfTarget> {
    prop_oneof![
        (arb_address(), arb_amount())
            .prop_map(|(target, amount)| PgfTarget::Internal { target, amount }),
        ("[a-z0-9]{1,40}", arb_amount(), "[a-z]{1,10}", "channel-[0-9]{1,3}").prop_map(
            |(target, amount, port_id, channel_id)| PgfTarget::Ibc {
                target,
                amount,
                port_id,
                channel_id,
            }
        ),
    ]
}

fn arb_proposal_type() -> impl Strategy<Value = ProposalType> {
    prop_oneof![
        Just(ProposalType::Default),
        any::<[u8; 32]>().prop_map(|hash| ProposalType::DefaultWithWasm(DataHash(hash))),
        prop::collection::vec(
            arb_address().prop_flat_map(|addr| prop_oneof![
                Just(AddRemove::Add(addr)),
                Just(AddRemove::Remove(addr)),
            ]),
            0..4
        )
        .prop_map(ProposalType::PgfSteward),
        prop::collection::vec(
            prop_oneof![
                arb_target().prop_map(PgfAction::Retro),
                arb_target().prop_map(|t| PgfAction::Continuous(AddRemove::Add(t))),
            ],
            0..4
        )
        .prop_map(ProposalType::PgfPayment),
    ]
}

fn arb_record() -> impl Strategy<Value = ProposalRecord> {
    (
        any::<u64>(),
        prop::collection::vec(("[a-z_]{1,12}", ".{0,40}"), 0..6),
        arb_address(),
        arb_proposal_type(),
        0u64..1_000_000,
        1u64..1_000,
        any::<u64>(),
    )
        .prop_map(|(id, entries, author, proposal_type, start, len, activation)| {
            ProposalRecord {
                id,
                content: entries.into_iter().collect::<ProposalContent>(),
                author,
                proposal_type,
                voting_start_epoch: Epoch(start),
                voting_end_epoch: Epoch(start + len),
                activation_epoch: Epoch(activation),
            }
        })
}

// ============================================================================
// DECODING PROPERTY TESTS
// ============================================================================

proptest! {
    /// Property: Encode then decode reproduces every field exactly
    #[test]
    fn decode_roundtrip_preserves_record(record in arb_record()) {
        let bytes = encode_proposal(&record).unwrap();
        let decoded = decode_proposal(&bytes).unwrap();
        prop_assert_eq!(decoded, record);
    }

    /// Property: Any strict prefix of a valid encoding is rejected
    #[test]
    fn truncated_record_is_rejected(record in arb_record(), cut in any::<prop::sample::Index>()) {
        let bytes = encode_proposal(&record).unwrap();
        let len = cut.index(bytes.len());
        let result = decode_proposal(&bytes[..len]);
        prop_assert!(matches!(result, Err(DecodeError::MalformedRecord(_))));
    }

    /// Property: A type tag outside the known set is rejected
    #[test]
    fn unknown_type_tag_is_rejected(
        record in arb_record(),
        tag in ProposalType::VARIANT_COUNT..=u8::MAX,
    ) {
        let offset = 8
            + borsh::to_vec(&record.content).unwrap().len()
            + borsh::to_vec(&record.author).unwrap().len();
        let mut bytes = encode_proposal(&record).unwrap();
        bytes[offset] = tag;
        prop_assert!(matches!(decode_proposal(&bytes), Err(DecodeError::MalformedRecord(_))));
    }

    /// Property: Decoding arbitrary bytes never panics
    #[test]
    fn decode_arbitrary_bytes_does_not_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode_proposal(&bytes);
    }
}

// ============================================================================
// STATUS PROPERTY TESTS
// ============================================================================

proptest! {
    /// Property: Status never regresses as the epoch increases
    #[test]
    fn status_is_monotonic(record in arb_record(), a in any::<u64>(), b in any::<u64>()) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(derive_status(&record, Epoch(low)) <= derive_status(&record, Epoch(high)));
    }

    /// Property: Window is closed at start and open at end
    #[test]
    fn status_boundaries_are_exact(record in arb_record()) {
        let start = record.voting_start_epoch.0;
        let end = record.voting_end_epoch.0;

        prop_assert_eq!(derive_status(&record, Epoch(start)), ProposalStatus::OnGoing);
        prop_assert_eq!(derive_status(&record, Epoch(end)), ProposalStatus::Ended);
        if start > 0 {
            prop_assert_eq!(derive_status(&record, Epoch(start - 1)), ProposalStatus::Pending);
        }
    }
}
