//! Read-path aggregation: discover every record relevant to an identity and
//! enrich it into a caller-facing view.
//!
//! Two independent structural scans (owner field, beneficiary field), a
//! union with address-level dedup, then a second round of live balance
//! lookups. Every per-record step is independently fallible: a record that
//! fails to decode or vanishes between the scan and the balance read is
//! logged and dropped, never allowed to fail the whole listing - races with
//! `Claim`/`Cancel` are normal here.

use std::collections::HashSet;

use tracing::warn;

use crate::address::Address;
use crate::layout::{BENEFICIARY_OFFSET, OWNER_OFFSET};
use crate::ledger::RecordStore;
use crate::record::EscrowRecord;

/// One record as presented to a caller: stored fields plus derived view
/// fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedRecord {
    pub address: Address,
    pub record: EscrowRecord,
    /// Custody balance read live from the runtime, not from the record.
    pub balance: u64,
    /// `"{days}d {hours}h {minutes}m"` until the deadline, or `"Expired"`.
    pub time_remaining: String,
    /// Whether `identity` is this record's owner (as opposed to only its
    /// beneficiary).
    pub is_owner: bool,
}

/// Every record where `identity` is the owner or the beneficiary,
/// deduplicated by record address and enriched relative to `now`.
///
/// A record whose owner equals its beneficiary is matched by both scans but
/// appears once.
pub fn list_records_for<S: RecordStore>(
    store: &S,
    identity: &Address,
    now: i64,
) -> Vec<EnrichedRecord> {
    let owned = store.scan_raw(OWNER_OFFSET, identity.as_ref());
    let receiving = store.scan_raw(BENEFICIARY_OFFSET, identity.as_ref());

    let mut seen: HashSet<Address> = HashSet::new();
    let mut out = Vec::new();
    for (address, raw) in owned.into_iter().chain(receiving) {
        if !seen.insert(address) {
            continue;
        }
        let record = match EscrowRecord::decode(&raw) {
            Ok(record) => record,
            Err(err) => {
                warn!(%address, %err, "skipping record that failed to decode");
                continue;
            }
        };
        // Second round: live balance. The record may have been destroyed
        // since the scan; drop it rather than failing the listing.
        let Some(balance) = store.balance(&address) else {
            warn!(%address, "record vanished between scan and balance read; skipping");
            continue;
        };
        out.push(EnrichedRecord {
            time_remaining: format_time_remaining(record.deadline, now),
            is_owner: record.owner == *identity,
            address,
            record,
            balance,
        });
    }
    out
}

/// Render the time left until `deadline` as `"{days}d {hours}h {minutes}m"`,
/// discarding sub-minute precision, or the literal `"Expired"` once the
/// deadline is at or behind `now`.
pub fn format_time_remaining(deadline: i64, now: i64) -> String {
    let remaining = deadline.saturating_sub(now);
    if remaining <= 0 {
        return "Expired".to_owned();
    }
    let days = remaining / 86_400;
    let hours = (remaining % 86_400) / 3_600;
    let minutes = (remaining % 3_600) / 60;
    format!("{days}d {hours}h {minutes}m")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::derive_record_address;
    use crate::error::EscrowError;
    use crate::ledger::MemoryLedger;
    use crate::lifecycle::Operation;

    const NOW: i64 = 1_700_000_000;

    fn identity(tag: u8) -> Address {
        Address::new([tag; 32])
    }

    fn create(
        ledger: &MemoryLedger,
        owner: &Address,
        beneficiary: &Address,
        seed: &str,
        deposit: u64,
    ) -> Address {
        let (target, _) = derive_record_address(owner, seed).unwrap();
        ledger
            .execute(
                owner,
                &target,
                &Operation::Initialize {
                    deadline: NOW + 3_600,
                    beneficiary: *beneficiary,
                    seed: seed.to_owned(),
                },
            )
            .unwrap();
        if deposit > 0 {
            ledger
                .execute(owner, &target, &Operation::Deposit { amount: deposit })
                .unwrap();
        }
        target
    }

    #[test]
    fn formats_days_hours_minutes() {
        assert_eq!(format_time_remaining(NOW + 90_061, NOW), "1d 1h 1m");
        assert_eq!(format_time_remaining(NOW + 59, NOW), "0d 0h 0m");
        assert_eq!(format_time_remaining(NOW + 86_400, NOW), "1d 0h 0m");
    }

    #[test]
    fn formats_expired_at_and_after_deadline() {
        assert_eq!(format_time_remaining(NOW - 1, NOW), "Expired");
        assert_eq!(format_time_remaining(NOW, NOW), "Expired");
        assert_eq!(format_time_remaining(i64::MIN, NOW), "Expired");
    }

    #[test]
    fn lists_owned_and_receiving_records_with_roles() {
        let x = identity(1);
        let y = identity(2);
        let z = identity(3);
        let ledger = MemoryLedger::new(NOW);
        ledger.airdrop(&x, 1_000_000).unwrap();
        ledger.airdrop(&y, 1_000_000).unwrap();

        // X owns A; X is beneficiary of B (owned by Y).
        let a = create(&ledger, &x, &z, "s1", 100);
        let b = create(&ledger, &y, &x, "s2", 200);
        // Unrelated record, must not appear.
        create(&ledger, &y, &z, "s3", 300);

        let mut listed = list_records_for(&ledger, &x, NOW);
        listed.sort_by_key(|e| e.balance);

        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].address, a);
        assert!(listed[0].is_owner);
        assert_eq!(listed[0].balance, 100);
        assert_eq!(listed[1].address, b);
        assert!(!listed[1].is_owner);
        assert_eq!(listed[1].balance, 200);
        assert_eq!(listed[0].time_remaining, "0d 1h 0m");
    }

    #[test]
    fn self_beneficiary_record_appears_once() {
        let x = identity(1);
        let ledger = MemoryLedger::new(NOW);
        ledger.airdrop(&x, 1_000_000).unwrap();

        let c = create(&ledger, &x, &x, "s1", 50);

        let listed = list_records_for(&ledger, &x, NOW);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].address, c);
        assert!(listed[0].is_owner);
    }

    #[test]
    fn vanished_record_is_dropped_not_fatal() {
        // A store whose balance lookups always miss simulates the race
        // where every matched record was destroyed between scan and read.
        struct VanishingStore<'a>(&'a MemoryLedger);

        impl RecordStore for VanishingStore<'_> {
            fn scan_raw(&self, offset: usize, needle: &[u8]) -> Vec<(Address, Vec<u8>)> {
                self.0.scan_raw(offset, needle)
            }
            fn record_raw(&self, address: &Address) -> Option<Vec<u8>> {
                self.0.record_raw(address)
            }
            fn balance(&self, _address: &Address) -> Option<u64> {
                None
            }
        }

        let x = identity(1);
        let ledger = MemoryLedger::new(NOW);
        ledger.airdrop(&x, 1_000_000).unwrap();
        create(&ledger, &x, &identity(2), "s1", 10);

        let listed = list_records_for(&VanishingStore(&ledger), &x, NOW);
        assert!(listed.is_empty());
    }

    #[test]
    fn undecodable_scan_hit_is_dropped_not_fatal() {
        struct GarbageStore;

        impl RecordStore for GarbageStore {
            fn scan_raw(&self, _offset: usize, _needle: &[u8]) -> Vec<(Address, Vec<u8>)> {
                vec![(Address::new([9u8; 32]), vec![0u8; 12])]
            }
            fn record_raw(&self, _address: &Address) -> Option<Vec<u8>> {
                None
            }
            fn balance(&self, _address: &Address) -> Option<u64> {
                Some(0)
            }
        }

        let listed = list_records_for(&GarbageStore, &identity(1), NOW);
        assert!(listed.is_empty());
    }

    #[test]
    fn listing_reflects_live_balance_not_a_snapshot() {
        let x = identity(1);
        let ledger = MemoryLedger::new(NOW);
        ledger.airdrop(&x, 1_000_000).unwrap();
        let target = create(&ledger, &x, &identity(2), "s1", 100);

        ledger
            .execute(&x, &target, &Operation::Deposit { amount: 400 })
            .unwrap();

        let listed = list_records_for(&ledger, &x, NOW);
        assert_eq!(listed[0].balance, 500);
        assert_eq!(ledger.balance(&target), Some(500));
        assert_eq!(
            ledger.execute(&x, &target, &Operation::Deposit { amount: 0 }),
            Err(EscrowError::InvalidAmount)
        );
    }
}
