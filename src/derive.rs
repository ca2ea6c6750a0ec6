//! Deterministic record addressing without a registry.
//!
//! `derive_record_address(owner, seed)` is a pure function: anyone who knows
//! the owner identity and the seed can locate the record with no network
//! access and no private key. The derived address must be *off-curve* - not
//! a valid Ed25519 point - so no external signer can ever exist for it; the
//! runtime can then trust that the record is only mutable through the
//! protocol's own rules.
//!
//! The search walks a one-byte bump space from 255 downward and returns the
//! first off-curve candidate. Roughly half of all 32-byte strings decompress
//! to a curve point, so the expected search length is about two hashes and
//! exhausting all 256 bumps is cryptographically negligible - but the search
//! is bounded, so the exhausted case is surfaced as an error rather than a
//! loop.

use sha2::{Digest, Sha256};

use crate::address::Address;
use crate::error::EscrowError;

/// Fixed seed tag mixed into every record derivation.
pub const RECORD_SEED_PREFIX: &[u8] = b"escrow";

/// Domain separator appended after the bump, so record addresses can never
/// collide with hashes computed for any other purpose.
const DERIVE_DOMAIN: &[u8] = b"VigilEscrowRecord";

/// Maximum seed length in bytes. Observed practice is a millisecond
/// timestamp string (13 bytes); 32 leaves headroom without letting records
/// grow unbounded.
pub const MAX_SEED_LEN: usize = 32;

/// Derive the unique record address for `(owner, seed)`.
///
/// Returns the address and the bump that produced it. Same inputs always
/// yield the same output. Fails with [`EscrowError::SeedTooLong`] for
/// oversized seeds and [`EscrowError::DerivationExhausted`] if no bump in
/// `255..=0` lands off-curve.
///
/// Seed uniqueness is a **caller obligation**: two records created by the
/// same owner with the same seed derive the same address and the second
/// `Initialize` will fail against the first.
pub fn derive_record_address(owner: &Address, seed: &str) -> Result<(Address, u8), EscrowError> {
    check_seed(seed)?;
    for bump in (0..=u8::MAX).rev() {
        let candidate = hash_candidate(owner, seed, bump);
        if !candidate.is_on_curve() {
            return Ok((candidate, bump));
        }
    }
    Err(EscrowError::DerivationExhausted)
}

/// Recompute the address for a known bump. Skips the search; pair with an
/// equality check against a stored address to validate a `(seed, bump)`
/// claim cheaply.
pub fn derive_with_bump(owner: &Address, seed: &str, bump: u8) -> Result<Address, EscrowError> {
    check_seed(seed)?;
    Ok(hash_candidate(owner, seed, bump))
}

#[inline(always)]
fn check_seed(seed: &str) -> Result<(), EscrowError> {
    if seed.len() > MAX_SEED_LEN {
        return Err(EscrowError::SeedTooLong);
    }
    Ok(())
}

fn hash_candidate(owner: &Address, seed: &str, bump: u8) -> Address {
    let mut hasher = Sha256::new();
    hasher.update(RECORD_SEED_PREFIX);
    hasher.update(owner.as_bytes());
    hasher.update(seed.as_bytes());
    hasher.update([bump]);
    hasher.update(DERIVE_DOMAIN);
    let digest: [u8; 32] = hasher.finalize().into();
    Address::new(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn owner() -> Address {
        Address::new([9u8; 32])
    }

    #[test]
    fn derivation_is_deterministic() {
        let (a1, b1) = derive_record_address(&owner(), "1712345678901").unwrap();
        let (a2, b2) = derive_record_address(&owner(), "1712345678901").unwrap();
        assert_eq!(a1, a2);
        assert_eq!(b1, b2);
    }

    #[test]
    fn distinct_seeds_give_distinct_addresses() {
        let (a1, _) = derive_record_address(&owner(), "s1").unwrap();
        let (a2, _) = derive_record_address(&owner(), "s2").unwrap();
        assert_ne!(a1, a2);
    }

    #[test]
    fn distinct_owners_give_distinct_addresses() {
        let other = Address::new([10u8; 32]);
        let (a1, _) = derive_record_address(&owner(), "s1").unwrap();
        let (a2, _) = derive_record_address(&other, "s1").unwrap();
        assert_ne!(a1, a2);
    }

    #[test]
    fn known_bump_recomputes_the_same_address() {
        let (addr, bump) = derive_record_address(&owner(), "s1").unwrap();
        assert_eq!(derive_with_bump(&owner(), "s1", bump).unwrap(), addr);
    }

    #[test]
    fn oversized_seed_is_rejected() {
        let long = "x".repeat(MAX_SEED_LEN + 1);
        assert_eq!(
            derive_record_address(&owner(), &long),
            Err(EscrowError::SeedTooLong)
        );
        assert_eq!(
            derive_with_bump(&owner(), &long, 255),
            Err(EscrowError::SeedTooLong)
        );
    }

    proptest! {
        #[test]
        fn derived_addresses_are_always_off_curve(
            owner_bytes in any::<[u8; 32]>(),
            seed in "[a-z0-9]{1,32}",
        ) {
            let owner = Address::new(owner_bytes);
            let (addr, bump) = derive_record_address(&owner, &seed).unwrap();
            prop_assert!(!addr.is_on_curve());
            prop_assert_eq!(derive_with_bump(&owner, &seed, bump).unwrap(), addr);
        }
    }
}
