use thiserror::Error;

/// Every way an escrow operation or query can fail.
///
/// The taxonomy matters more than the list:
///
/// - **Validation errors** ([`InvalidDeadline`](EscrowError::InvalidDeadline),
///   [`InvalidAmount`](EscrowError::InvalidAmount)) are caller-correctable and
///   reject the whole operation with no state change.
/// - **Timing-precondition errors**
///   ([`DeadlineExceeded`](EscrowError::DeadlineExceeded),
///   [`DeadlineNotReached`](EscrowError::DeadlineNotReached)) encode "too
///   late" and "too early". They are normal-path outcomes of a time-locked
///   protocol, not exceptional failures.
/// - **Authorization** ([`Unauthorized`](EscrowError::Unauthorized)) is fatal
///   to the call and never retried.
/// - **Not-found** ([`RecordNotFound`](EscrowError::RecordNotFound)) arises
///   naturally from races with `Claim`/`Cancel`: the record is gone, not
///   temporarily unavailable.
///
/// All failures are atomic - a rejected operation leaves no partial transfer
/// or partial field update behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EscrowError {
    /// A deadline was not strictly in the future at the moment it was set.
    #[error("deadline must be in the future")]
    InvalidDeadline,

    /// A deposit of zero value.
    #[error("deposit amount must be greater than zero")]
    InvalidAmount,

    /// Check-in attempted at or after the record's deadline. Expiry is the
    /// irrevocable trigger point: once passed, the owner cannot re-affirm.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// Claim attempted before the record's deadline.
    #[error("deadline not reached")]
    DeadlineNotReached,

    /// The caller is not the signer the operation requires (owner or
    /// beneficiary, depending on the operation).
    #[error("signer is not authorized for this operation")]
    Unauthorized,

    /// The record does not exist or was already destroyed by a terminal
    /// operation.
    #[error("record does not exist or was already closed")]
    RecordNotFound,

    /// Initialize targeted an address that already holds a record. Seed
    /// uniqueness is a caller obligation; this is the collision surface.
    #[error("a record already exists at the derived address")]
    RecordExists,

    /// The record address does not match its `(owner, seed)` derivation.
    #[error("record address does not match its derivation")]
    AddressMismatch,

    /// No bump in `255..=0` produced an off-curve address. Cryptographically
    /// negligible for SHA-256 output, but the search is bounded so the case
    /// must be representable.
    #[error("no off-curve address found in the bump space")]
    DerivationExhausted,

    /// The derivation seed exceeds the maximum length.
    #[error("seed exceeds the maximum length")]
    SeedTooLong,

    /// Balance arithmetic overflowed.
    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    /// The paying account does not hold enough value for the transfer.
    #[error("insufficient funds for transfer")]
    InsufficientFunds,

    /// Serialized record data is shorter than the layout requires.
    #[error("record data is truncated")]
    RecordTooSmall,

    /// Serialized data does not start with the record discriminator.
    #[error("record discriminator mismatch")]
    BadDiscriminator,

    /// The stored seed bytes are not valid UTF-8.
    #[error("record seed is not valid UTF-8")]
    MalformedSeed,

    /// A string could not be parsed as a base58 32-byte address.
    #[error("address is not 32 bytes of base58")]
    InvalidAddress,
}

impl EscrowError {
    /// Stable numeric code for the four published protocol errors, as seen
    /// by external callers. Everything else surfaces only through this
    /// crate's API and carries no code.
    pub fn code(&self) -> Option<u32> {
        match self {
            EscrowError::InvalidDeadline => Some(6000),
            EscrowError::InvalidAmount => Some(6001),
            EscrowError::DeadlineExceeded => Some(6002),
            EscrowError::DeadlineNotReached => Some(6003),
            _ => None,
        }
    }
}
