use crate::address::Address;
use crate::error::EscrowError;
use crate::layout::{
    check_discriminator, record_len, RecordReader, RecordWriter, DISC_LEN, RECORD_DISC,
};

/// One persisted custody agreement between an owner and a beneficiary.
///
/// The custody balance is *not* a field here: it is native value held by the
/// runtime at the record's derived address, so it lives and moves with the
/// ledger, never with the serialized record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscrowRecord {
    /// Funding party. Fixed at creation, never reassigned.
    pub owner: Address,
    /// Identity entitled to claim once the deadline passes. Fixed at creation.
    pub beneficiary: Address,
    /// Absolute unix timestamp after which the beneficiary may claim.
    /// Mutable only by the owner via check-in, and only while still active.
    pub deadline: i64,
    /// Unix timestamp of the most recent owner re-affirmation. Set at
    /// creation and on every successful check-in, so `last_checkin` never
    /// exceeds the ledger time at which `deadline` was last assigned.
    pub last_checkin: i64,
    /// Derivation auxiliary value pinning the record address off-curve.
    pub bump: u8,
    /// Opaque caller-supplied string that, together with `owner`, determines
    /// the record address.
    pub seed: String,
}

/// Lifecycle state of a *live* record, derived from stored fields and an
/// injected "now" - never persisted, so it cannot drift from the deadline.
///
/// The two terminal states (claimed, cancelled) have no variant here: a
/// terminal operation destroys the record, so a record you can observe is
/// either active or expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    /// Deadline still in the future; the owner retains control.
    Active,
    /// Deadline at or behind the clock; control has passed to the
    /// beneficiary.
    Expired,
}

impl EscrowRecord {
    /// Serialized size: discriminator + fixed fields + length-prefixed seed.
    #[inline(always)]
    pub fn serialized_len(&self) -> usize {
        record_len(self.seed.len())
    }

    /// Serialize to the fixed-offset layout in [`crate::layout`].
    pub fn encode(&self) -> Result<Vec<u8>, EscrowError> {
        let mut buf = vec![0u8; self.serialized_len()];
        let mut w = RecordWriter::new(&mut buf);
        w.write_bytes(&RECORD_DISC)?;
        w.write_address(&self.owner)?;
        w.write_address(&self.beneficiary)?;
        w.write_i64(self.deadline)?;
        w.write_i64(self.last_checkin)?;
        w.write_u8(self.bump)?;
        w.write_u32(self.seed.len() as u32)?;
        w.write_bytes(self.seed.as_bytes())?;
        Ok(buf)
    }

    /// Deserialize from the fixed-offset layout, verifying the
    /// discriminator, bounds, and seed encoding.
    pub fn decode(data: &[u8]) -> Result<Self, EscrowError> {
        check_discriminator(data)?;
        let mut cur = RecordReader::new(data);
        cur.skip(DISC_LEN)?;
        let owner = cur.read_address()?;
        let beneficiary = cur.read_address()?;
        let deadline = cur.read_i64()?;
        let last_checkin = cur.read_i64()?;
        let bump = cur.read_u8()?;
        let seed_len = cur.read_u32()? as usize;
        let seed_bytes = cur.read_bytes(seed_len)?;
        let seed = core::str::from_utf8(seed_bytes)
            .map_err(|_| EscrowError::MalformedSeed)?
            .to_owned();
        Ok(Self {
            owner,
            beneficiary,
            deadline,
            last_checkin,
            bump,
            seed,
        })
    }

    /// Lifecycle view relative to `now`. Expiry is inclusive: at exactly
    /// `deadline` the record is already [`RecordStatus::Expired`].
    #[inline(always)]
    pub fn status(&self, now: i64) -> RecordStatus {
        if now >= self.deadline {
            RecordStatus::Expired
        } else {
            RecordStatus::Active
        }
    }

    #[inline(always)]
    pub fn is_expired(&self, now: i64) -> bool {
        self.status(now) == RecordStatus::Expired
    }
}
