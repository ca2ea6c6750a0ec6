//! Calendar-aware deadline extension.
//!
//! An owner extends a record by `(days, months, years)` rather than a raw
//! second count. The extension is applied to a wall-clock instant in exactly
//! that order - days, then months, then years - and the result is expressed
//! as whole seconds to add to the ledger's current time.
//!
//! The order is observable: month addition clamps at month ends (Jan 31 +
//! 1 month = Feb 28/29), so adding days before months can land on a
//! different date than the reverse. Applying day-then-month-then-year is the
//! documented behavior, kept for reproducibility.

use chrono::{DateTime, Days, Months, Utc};

use crate::error::EscrowError;

/// A relative extension of a record's deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Extension {
    pub days: u32,
    pub months: u32,
    pub years: u32,
}

impl Extension {
    pub const fn new(days: u32, months: u32, years: u32) -> Self {
        Self {
            days,
            months,
            years,
        }
    }

    /// An all-zero extension leaves the deadline where it is; callers
    /// usually want to reject it before submitting a check-in.
    pub const fn is_zero(&self) -> bool {
        self.days == 0 && self.months == 0 && self.years == 0
    }
}

/// Convert an extension into whole seconds, relative to `from`.
///
/// Fails with [`EscrowError::InvalidDeadline`] when the target date is not
/// representable (calendar overflow).
pub fn extension_seconds(from: DateTime<Utc>, extension: &Extension) -> Result<i64, EscrowError> {
    let months_from_years = extension
        .years
        .checked_mul(12)
        .ok_or(EscrowError::InvalidDeadline)?;
    let future = from
        .checked_add_days(Days::new(u64::from(extension.days)))
        .ok_or(EscrowError::InvalidDeadline)?
        .checked_add_months(Months::new(extension.months))
        .ok_or(EscrowError::InvalidDeadline)?
        .checked_add_months(Months::new(months_from_years))
        .ok_or(EscrowError::InvalidDeadline)?;
    Ok((future - from).num_seconds())
}

/// New absolute deadline: the ledger's current time plus the extension
/// evaluated against the wall clock.
///
/// Ledger time and wall-clock time are sampled separately by the caller
/// (they come from different authorities); the extension length is computed
/// on the wall clock and anchored to the ledger clock, matching how the
/// deadline will later be compared on-ledger.
pub fn extended_deadline(
    ledger_now: i64,
    wall_now: DateTime<Utc>,
    extension: &Extension,
) -> Result<i64, EscrowError> {
    let seconds = extension_seconds(wall_now, extension)?;
    ledger_now
        .checked_add(seconds)
        .ok_or(EscrowError::InvalidDeadline)
}
