//! The collaborator boundary: what the hosting ledger must provide, and an
//! in-memory implementation of it for tests and local simulation.
//!
//! The protocol core never owns a clock or storage - both are injected
//! through the traits here, which keeps the state machine unit-testable
//! without a real ledger. [`MemoryLedger`] plays the runtime's part: each
//! [`MemoryLedger::execute`] is one atomic, serializable transaction that
//! revalidates preconditions against the record's state as of that
//! execution, applies the balance transfer with checked arithmetic, and
//! commits record creation/mutation/destruction - all of it or none of it.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::debug;

use crate::address::Address;
use crate::error::EscrowError;
use crate::lifecycle::{apply, Operation, Transfer};
use crate::record::EscrowRecord;

/// A readable ledger clock, in unix seconds.
pub trait Clock {
    fn now(&self) -> i64;
}

/// Read-only view of the runtime's record store, as the aggregator sees it.
///
/// `scan_raw` matches serialized records by fixed-offset byte equality - the
/// structural-filter primitive behind the owner/beneficiary scans. All three
/// methods are non-mutating and may be issued concurrently; a record can
/// vanish between a scan and a `balance` call, which is why `balance`
/// returns an `Option` rather than defaulting to zero.
pub trait RecordStore {
    /// All records whose serialized bytes equal `needle` at `offset`,
    /// returned as `(record address, serialized record)`.
    fn scan_raw(&self, offset: usize, needle: &[u8]) -> Vec<(Address, Vec<u8>)>;

    /// Serialized record at `address`, if one still exists.
    fn record_raw(&self, address: &Address) -> Option<Vec<u8>>;

    /// Custody balance held at `address`, if the account still exists.
    fn balance(&self, address: &Address) -> Option<u64>;
}

// ── MemoryLedger ─────────────────────────────────────────────────────────────

struct LedgerState {
    now: i64,
    balances: HashMap<Address, u64>,
    records: HashMap<Address, EscrowRecord>,
}

/// In-memory runtime with the contract the protocol assumes: atomic
/// serializable execution, an authenticated caller per call, a monotonic
/// clock, keyed record storage, and native-value transfer.
///
/// Test conveniences mirror the usual SVM harness shape: [`airdrop`] funds
/// a wallet out of thin air, [`warp_to`] advances the clock.
///
/// [`airdrop`]: MemoryLedger::airdrop
/// [`warp_to`]: MemoryLedger::warp_to
pub struct MemoryLedger {
    state: Mutex<LedgerState>,
}

impl MemoryLedger {
    pub fn new(genesis_time: i64) -> Self {
        Self {
            state: Mutex::new(LedgerState {
                now: genesis_time,
                balances: HashMap::new(),
                records: HashMap::new(),
            }),
        }
    }

    /// Credit `amount` to `address` from nowhere.
    pub fn airdrop(&self, address: &Address, amount: u64) -> Result<(), EscrowError> {
        let mut state = self.lock();
        let entry = state.balances.entry(*address).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or(EscrowError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Advance the clock to `timestamp`. The clock is monotonic: warping
    /// backwards is a no-op.
    pub fn warp_to(&self, timestamp: i64) {
        let mut state = self.lock();
        if timestamp > state.now {
            state.now = timestamp;
        }
    }

    /// Execute one lifecycle operation as a single serialized transaction.
    ///
    /// `target` is the record address the operation acts on (for
    /// `Initialize`, the address derived from the caller and seed). On any
    /// error the ledger is left exactly as it was.
    pub fn execute(
        &self,
        caller: &Address,
        target: &Address,
        op: &Operation,
    ) -> Result<(), EscrowError> {
        let mut state = self.lock();

        let existing = state.records.get(target);
        let balance = state.balances.get(target).copied().unwrap_or(0);
        let applied = apply(target, existing, balance, caller, state.now, op)?;

        // Stage the transfer before touching anything, so a failure cannot
        // leave a half-applied balance.
        if let Some(transfer) = applied.transfer {
            let (from_after, to_after) = stage_transfer(&state.balances, &transfer)?;
            state.balances.insert(transfer.from, from_after);
            state.balances.insert(transfer.to, to_after);
        }

        match applied.record {
            Some(record) => {
                state.records.insert(*target, record);
            }
            None => {
                // Terminal: the record and its storage cease to exist. The
                // balance was already swept by the staged transfer.
                state.records.remove(target);
                state.balances.remove(target);
            }
        }

        debug!(record = %target, caller = %caller, now = state.now, "operation committed");
        Ok(())
    }

    /// Decoded record at `address`, if it exists. Read-only convenience for
    /// callers that already know the address.
    pub fn record(&self, address: &Address) -> Option<EscrowRecord> {
        self.lock().records.get(address).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LedgerState> {
        // A poisoned mutex means a panic mid-commit in another test thread;
        // the state behind it is still consistent because commits stage
        // before writing.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Compute post-transfer balances without mutating anything. Fails if the
/// payer cannot cover the amount or the payee would overflow.
fn stage_transfer(
    balances: &HashMap<Address, u64>,
    transfer: &Transfer,
) -> Result<(u64, u64), EscrowError> {
    // Every protocol transfer moves value between a wallet and a record
    // address; the two can never coincide because record addresses are
    // off-curve and wallets sign.
    debug_assert!(transfer.from != transfer.to);
    let from_balance = balances.get(&transfer.from).copied().unwrap_or(0);
    let to_balance = balances.get(&transfer.to).copied().unwrap_or(0);
    let from_after = from_balance
        .checked_sub(transfer.amount)
        .ok_or(EscrowError::InsufficientFunds)?;
    let to_after = to_balance
        .checked_add(transfer.amount)
        .ok_or(EscrowError::ArithmeticOverflow)?;
    Ok((from_after, to_after))
}

impl Clock for MemoryLedger {
    fn now(&self) -> i64 {
        self.lock().now
    }
}

impl RecordStore for MemoryLedger {
    fn scan_raw(&self, offset: usize, needle: &[u8]) -> Vec<(Address, Vec<u8>)> {
        let state = self.lock();
        let mut matches = Vec::new();
        for (address, record) in &state.records {
            let Ok(raw) = record.encode() else { continue };
            let end = offset.saturating_add(needle.len());
            if raw.len() >= end && &raw[offset..end] == needle {
                matches.push((*address, raw));
            }
        }
        matches
    }

    fn record_raw(&self, address: &Address) -> Option<Vec<u8>> {
        self.lock().records.get(address)?.encode().ok()
    }

    fn balance(&self, address: &Address) -> Option<u64> {
        self.lock().balances.get(address).copied()
    }
}
