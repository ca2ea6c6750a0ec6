//! **Vigil** - a trustless dead-man's-switch escrow protocol.
//!
//! An owner locks native value in a custody record addressed by
//! `(owner, seed)`. If the owner fails to check in before the record's
//! deadline, control passes irrevocably to the beneficiary, who may sweep
//! the full balance. No off-chain arbiter: the rules are time and
//! authorization invariants evaluated atomically by the hosting ledger.
//!
//! # Operations
//!
//! | Operation | Signer | Effect |
//! |---|---|---|
//! | `Initialize` | owner | create the record; deadline must be future |
//! | `Deposit` | owner | move value into custody, additive |
//! | `Checkin` | owner | push the deadline forward, only before expiry |
//! | `Claim` | beneficiary | sweep the balance at/after expiry; terminal |
//! | `Cancel` | owner | reclaim the balance any time; terminal |
//!
//! # Shape of the crate
//!
//! The state machine ([`lifecycle`]) is a pure transition function; clock
//! and storage are injected through the [`ledger`] traits, and
//! [`ledger::MemoryLedger`] is an in-memory runtime honoring the atomicity
//! contract for tests and simulation. [`derive`] maps `(owner, seed)` to an
//! off-curve record address with no registry. [`calendar`] turns
//! `(days, months, years)` extensions into absolute deadlines. [`aggregate`]
//! rebuilds a caller's view of all their records from structural scans of
//! the store.
//!
//! `Expired` is a view, not a field: lifecycle state is always recomputed
//! from the stored deadline and an injected "now"
//! ([`record::EscrowRecord::status`]), so it can never drift.

pub mod address;
pub mod aggregate;
pub mod calendar;
pub mod derive;
pub mod error;
pub mod layout;
pub mod ledger;
pub mod lifecycle;
pub mod record;

pub use address::Address;
pub use aggregate::{format_time_remaining, list_records_for, EnrichedRecord};
pub use calendar::{extended_deadline, extension_seconds, Extension};
pub use derive::{derive_record_address, derive_with_bump, MAX_SEED_LEN, RECORD_SEED_PREFIX};
pub use error::EscrowError;
pub use ledger::{Clock, MemoryLedger, RecordStore};
pub use lifecycle::{apply, Applied, Operation, Transfer};
pub use record::{EscrowRecord, RecordStatus};

// ── Macros ───────────────────────────────────────────────────────────────────

/// Require a boolean condition: return `$err` (converted via `Into`) if false.
///
/// ```rust,ignore
/// require!(amount > 0, EscrowError::InvalidAmount);
/// ```
#[macro_export]
macro_rules! require {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err.into());
        }
    };
}

/// Require two [`Address`] values to be equal.
///
/// ```rust,ignore
/// require_keys_eq!(&record.owner, caller, EscrowError::Unauthorized);
/// ```
#[macro_export]
macro_rules! require_keys_eq {
    ($a:expr, $b:expr, $err:expr) => {
        if *$a != *$b {
            return Err($err.into());
        }
    };
}
