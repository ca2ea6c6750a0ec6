use core::fmt;
use core::str::FromStr;

use ed25519_dalek::VerifyingKey;

use crate::error::EscrowError;

/// A 32-byte ledger identity: either a signer's Ed25519 public key or a
/// derived record address.
///
/// The distinction is structural, not nominal - a derived record address is
/// exactly a 32-byte value for which no curve point (and therefore no private
/// key) exists. See [`Address::is_on_curve`] and the derivation in
/// [`crate::derive`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 32]);

impl Address {
    pub const LEN: usize = 32;

    #[inline(always)]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[inline(always)]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[inline(always)]
    pub const fn to_bytes(self) -> [u8; 32] {
        self.0
    }

    /// Whether these bytes decompress to a valid Ed25519 curve point.
    ///
    /// On-curve means a private key *could* exist for this address, so it
    /// could sign. Record addresses must be off-curve: the runtime can then
    /// trust that the record is only ever mutated through programmatic rules,
    /// never by an external signer forging ownership.
    pub fn is_on_curve(&self) -> bool {
        VerifyingKey::from_bytes(&self.0).is_ok()
    }
}

impl From<[u8; 32]> for Address {
    #[inline(always)]
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    #[inline(always)]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = EscrowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|_| EscrowError::InvalidAddress)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| EscrowError::InvalidAddress)?;
        Ok(Self(arr))
    }
}
