//! The escrow custody state machine.
//!
//! Every operation is a pure function from `(current record state, custody
//! balance, caller identity, ledger time, arguments)` to `(new record state,
//! transfer)` or an error. Nothing here touches storage or a clock: the
//! hosting runtime reads the record, evaluates [`apply`] inside its atomic
//! critical section, and commits the outcome - so precondition checks are
//! always evaluated against the state *as of* the serialized execution,
//! never against a stale snapshot the caller read earlier.
//!
//! Operations, required signer, and their protocol errors:
//!
//! | Operation | Signer | Errors |
//! |---|---|---|
//! | `Initialize(deadline, beneficiary, seed)` | owner | `InvalidDeadline` |
//! | `Deposit(amount)` | owner | `InvalidAmount` |
//! | `Checkin(new_deadline)` | owner | `DeadlineExceeded`, `InvalidDeadline` |
//! | `Claim` | beneficiary | `DeadlineNotReached` |
//! | `Cancel` | owner | - |
//!
//! Wrong-signer (`Unauthorized`) and missing-record (`RecordNotFound`)
//! failures are distinct from the four named errors above.

use crate::address::Address;
use crate::derive::derive_record_address;
use crate::error::EscrowError;
use crate::record::EscrowRecord;
use crate::{require, require_keys_eq};

/// A lifecycle operation, as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Create the record at the address derived from `(caller, seed)`.
    /// Moves no funds; the balance starts at zero.
    Initialize {
        deadline: i64,
        beneficiary: Address,
        seed: String,
    },
    /// Move `amount` from the owner into custody. Callable any number of
    /// times before a terminal operation - including after expiry; late
    /// top-ups are deliberately not blocked.
    Deposit { amount: u64 },
    /// Re-affirm control and push the deadline forward. Only possible while
    /// the record is still active.
    Checkin { new_deadline: i64 },
    /// Beneficiary sweeps the full balance at or after expiry. Terminal.
    Claim,
    /// Owner reclaims the full balance at any time before a successful
    /// claim. Terminal.
    Cancel,
}

/// A native-value movement the runtime must perform as part of committing
/// an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub from: Address,
    pub to: Address,
    pub amount: u64,
}

/// Outcome of a successful transition.
///
/// `record: None` means the record is destroyed - the terminal half of the
/// lifecycle. The runtime commits the record change and the transfer as one
/// atomic effect or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub record: Option<EscrowRecord>,
    pub transfer: Option<Transfer>,
}

/// Evaluate one operation against the current state of a single record.
///
/// * `record_address` - the storage address the operation targets.
/// * `existing` - the record currently at that address, if any.
/// * `balance` - custody balance currently held at that address.
/// * `caller` - the authenticated signer of this call.
/// * `now` - the ledger clock at serialized execution time.
pub fn apply(
    record_address: &Address,
    existing: Option<&EscrowRecord>,
    balance: u64,
    caller: &Address,
    now: i64,
    op: &Operation,
) -> Result<Applied, EscrowError> {
    match op {
        Operation::Initialize {
            deadline,
            beneficiary,
            seed,
        } => initialize(record_address, existing, caller, now, *deadline, beneficiary, seed),
        Operation::Deposit { amount } => {
            deposit(record_address, existing, caller, *amount)
        }
        Operation::Checkin { new_deadline } => checkin(existing, caller, now, *new_deadline),
        Operation::Claim => claim(record_address, existing, balance, caller, now),
        Operation::Cancel => cancel(record_address, existing, balance, caller),
    }
}

fn initialize(
    record_address: &Address,
    existing: Option<&EscrowRecord>,
    caller: &Address,
    now: i64,
    deadline: i64,
    beneficiary: &Address,
    seed: &str,
) -> Result<Applied, EscrowError> {
    require!(existing.is_none(), EscrowError::RecordExists);
    require!(deadline > now, EscrowError::InvalidDeadline);

    // The record must live exactly where (caller, seed) says it does.
    let (derived, bump) = derive_record_address(caller, seed)?;
    require_keys_eq!(&derived, record_address, EscrowError::AddressMismatch);

    Ok(Applied {
        record: Some(EscrowRecord {
            owner: *caller,
            beneficiary: *beneficiary,
            deadline,
            last_checkin: now,
            bump,
            seed: seed.to_owned(),
        }),
        transfer: None,
    })
}

fn deposit(
    record_address: &Address,
    existing: Option<&EscrowRecord>,
    caller: &Address,
    amount: u64,
) -> Result<Applied, EscrowError> {
    let record = existing.ok_or(EscrowError::RecordNotFound)?;
    require_keys_eq!(&record.owner, caller, EscrowError::Unauthorized);
    require!(amount > 0, EscrowError::InvalidAmount);

    Ok(Applied {
        record: Some(record.clone()),
        transfer: Some(Transfer {
            from: *caller,
            to: *record_address,
            amount,
        }),
    })
}

fn checkin(
    existing: Option<&EscrowRecord>,
    caller: &Address,
    now: i64,
    new_deadline: i64,
) -> Result<Applied, EscrowError> {
    let record = existing.ok_or(EscrowError::RecordNotFound)?;
    require_keys_eq!(&record.owner, caller, EscrowError::Unauthorized);
    // Expiry first: once the deadline has passed, no proposed new deadline
    // can revive the record.
    require!(now < record.deadline, EscrowError::DeadlineExceeded);
    require!(new_deadline > now, EscrowError::InvalidDeadline);

    let mut updated = record.clone();
    updated.deadline = new_deadline;
    updated.last_checkin = now;
    Ok(Applied {
        record: Some(updated),
        transfer: None,
    })
}

fn claim(
    record_address: &Address,
    existing: Option<&EscrowRecord>,
    balance: u64,
    caller: &Address,
    now: i64,
) -> Result<Applied, EscrowError> {
    let record = existing.ok_or(EscrowError::RecordNotFound)?;
    require_keys_eq!(&record.beneficiary, caller, EscrowError::Unauthorized);
    require!(now >= record.deadline, EscrowError::DeadlineNotReached);

    Ok(Applied {
        record: None,
        transfer: Some(Transfer {
            from: *record_address,
            to: *caller,
            amount: balance,
        }),
    })
}

fn cancel(
    record_address: &Address,
    existing: Option<&EscrowRecord>,
    balance: u64,
    caller: &Address,
) -> Result<Applied, EscrowError> {
    let record = existing.ok_or(EscrowError::RecordNotFound)?;
    require_keys_eq!(&record.owner, caller, EscrowError::Unauthorized);

    Ok(Applied {
        record: None,
        transfer: Some(Transfer {
            from: *record_address,
            to: *caller,
            amount: balance,
        }),
    })
}
