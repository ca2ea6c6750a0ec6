//! Fixed-offset binary layout of a custody record.
//!
//! The layout doubles as the serialization format and the substrate for the
//! aggregator's structural filters - field offsets are part of the external
//! interface, so they live here as named constants rather than being implied
//! by read order.
//!
//! Layout:
//!   [0..8]    [u8; 8]  discriminator  (= [`RECORD_DISC`])
//!   [8..40]   Address  owner
//!   [40..72]  Address  beneficiary
//!   [72..80]  i64      deadline       (unix seconds)
//!   [80..88]  i64      last_checkin   (unix seconds)
//!   [88]      u8       bump
//!   [89..93]  u32      seed length
//!   [93..]    bytes    seed           (UTF-8)
//!
//! Total: 93 + seed.len() bytes. All integers little-endian.

use crate::address::Address;
use crate::error::EscrowError;

/// Record type tag: the first 8 bytes of `SHA-256("record:escrow")`.
///
/// Computed at compile time so the constant can never drift from its
/// definition.
pub const RECORD_DISC: [u8; 8] = record_discriminator();

const fn record_discriminator() -> [u8; 8] {
    let digest = sha2_const_stable::Sha256::new()
        .update(b"record:escrow")
        .finalize();
    [
        digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6], digest[7],
    ]
}

/// Byte length of the discriminator prefix.
pub const DISC_LEN: usize = 8;

// Field offsets. OWNER_OFFSET and BENEFICIARY_OFFSET are load-bearing for
// the aggregator's structural scans.
pub const OWNER_OFFSET: usize = 8;
pub const BENEFICIARY_OFFSET: usize = 40;
pub const DEADLINE_OFFSET: usize = 72;
pub const LAST_CHECKIN_OFFSET: usize = 80;
pub const BUMP_OFFSET: usize = 88;
pub const SEED_LEN_OFFSET: usize = 89;
pub const SEED_OFFSET: usize = 93;

/// Serialized size of a record before its variable-length seed.
pub const RECORD_BASE_LEN: usize = 93;

/// Serialized size of a record holding a seed of `seed_len` bytes.
#[inline(always)]
pub const fn record_len(seed_len: usize) -> usize {
    RECORD_BASE_LEN + seed_len
}

/// Verify serialized data starts with the record discriminator.
#[inline(always)]
pub fn check_discriminator(data: &[u8]) -> Result<(), EscrowError> {
    if data.len() < DISC_LEN {
        return Err(EscrowError::RecordTooSmall);
    }
    if data[..DISC_LEN] != RECORD_DISC {
        return Err(EscrowError::BadDiscriminator);
    }
    Ok(())
}

// ── RecordReader ─────────────────────────────────────────────────────────────

/// Bounds-checked read cursor over serialized record bytes.
///
/// Tracks the current position and reads typed fields sequentially. Every
/// read is bounds-checked - you get [`EscrowError::RecordTooSmall`] instead
/// of a panic when data is truncated. Field order must match the layout
/// above; the offset constants exist so tests can pin that down.
pub struct RecordReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> RecordReader<'a> {
    #[inline(always)]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte offset into the slice.
    #[inline(always)]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline(always)]
    pub fn read_u8(&mut self) -> Result<u8, EscrowError> {
        if self.pos >= self.data.len() {
            return Err(EscrowError::RecordTooSmall);
        }
        let val = self.data[self.pos];
        self.pos += 1;
        Ok(val)
    }

    #[inline(always)]
    pub fn read_u32(&mut self) -> Result<u32, EscrowError> {
        let end = self.pos + 4;
        if end > self.data.len() {
            return Err(EscrowError::RecordTooSmall);
        }
        let val = u32::from_le_bytes(self.data[self.pos..end].try_into().unwrap());
        self.pos = end;
        Ok(val)
    }

    #[inline(always)]
    pub fn read_i64(&mut self) -> Result<i64, EscrowError> {
        let end = self.pos + 8;
        if end > self.data.len() {
            return Err(EscrowError::RecordTooSmall);
        }
        let val = i64::from_le_bytes(self.data[self.pos..end].try_into().unwrap());
        self.pos = end;
        Ok(val)
    }

    #[inline(always)]
    pub fn read_address(&mut self) -> Result<Address, EscrowError> {
        let end = self.pos + Address::LEN;
        if end > self.data.len() {
            return Err(EscrowError::RecordTooSmall);
        }
        let arr: [u8; 32] = self.data[self.pos..end].try_into().unwrap();
        self.pos = end;
        Ok(arr.into())
    }

    /// Read `n` raw bytes from the current position.
    #[inline(always)]
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], EscrowError> {
        let end = self
            .pos
            .checked_add(n)
            .ok_or(EscrowError::RecordTooSmall)?;
        if end > self.data.len() {
            return Err(EscrowError::RecordTooSmall);
        }
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Skip `n` bytes without reading them.
    #[inline(always)]
    pub fn skip(&mut self, n: usize) -> Result<(), EscrowError> {
        self.read_bytes(n).map(|_| ())
    }
}

// ── RecordWriter ─────────────────────────────────────────────────────────────

/// Bounds-checked write cursor over a record buffer being initialized.
///
/// Position-tracked counterpart to [`RecordReader`]. All writes are
/// little-endian.
pub struct RecordWriter<'a> {
    data: &'a mut [u8],
    pos: usize,
}

impl<'a> RecordWriter<'a> {
    #[inline(always)]
    pub fn new(data: &'a mut [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Number of bytes written so far.
    #[inline(always)]
    pub fn written(&self) -> usize {
        self.pos
    }

    #[inline(always)]
    pub fn write_u8(&mut self, val: u8) -> Result<(), EscrowError> {
        if self.pos >= self.data.len() {
            return Err(EscrowError::RecordTooSmall);
        }
        self.data[self.pos] = val;
        self.pos += 1;
        Ok(())
    }

    #[inline(always)]
    pub fn write_u32(&mut self, val: u32) -> Result<(), EscrowError> {
        self.write_bytes(&val.to_le_bytes())
    }

    #[inline(always)]
    pub fn write_i64(&mut self, val: i64) -> Result<(), EscrowError> {
        self.write_bytes(&val.to_le_bytes())
    }

    #[inline(always)]
    pub fn write_address(&mut self, addr: &Address) -> Result<(), EscrowError> {
        self.write_bytes(addr.as_bytes())
    }

    #[inline(always)]
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), EscrowError> {
        let end = self
            .pos
            .checked_add(bytes.len())
            .ok_or(EscrowError::RecordTooSmall)?;
        if end > self.data.len() {
            return Err(EscrowError::RecordTooSmall);
        }
        self.data[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }
}
