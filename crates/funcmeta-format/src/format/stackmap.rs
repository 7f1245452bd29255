//! Pointer-map funcdata format.
//!
//! ```text
//! n:    i32 LE    number of bitmaps
//! nbit: i32 LE    bits per bitmap (one per pointer-sized slot)
//! n × ceil(nbit / 8) bytes, bit i of a bitmap set = slot i holds a pointer
//! ```
//!
//! The stack map index PC table selects which bitmap is live at a PC.

use super::varint::{DecodeError, Reader};

#[derive(Clone, Copy, Debug)]
pub struct StackMapView<'a> {
    count: usize,
    nbit: usize,
    bitmaps: &'a [u8],
}

impl<'a> StackMapView<'a> {
    pub fn new(bytes: &'a [u8]) -> Result<Self, DecodeError> {
        let mut r = Reader::new(bytes);
        let n = r.read_i32_le()?;
        let nbit = r.read_i32_le()?;
        let count = usize::try_from(n).map_err(|_| DecodeError::Truncated(i64::from(n)))?;
        let nbit = usize::try_from(nbit).map_err(|_| DecodeError::Truncated(i64::from(nbit)))?;
        let size = count
            .checked_mul(nbit.div_ceil(8))
            .ok_or(DecodeError::Truncated(i64::from(n)))?;
        let bitmaps = r.read_bytes(size)?;
        Ok(Self {
            count,
            nbit,
            bitmaps,
        })
    }

    /// Number of bitmaps.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Bits per bitmap.
    pub fn nbit(&self) -> usize {
        self.nbit
    }

    pub fn bitmap(&self, index: usize) -> Option<&'a [u8]> {
        if index >= self.count {
            return None;
        }
        let stride = self.nbit.div_ceil(8);
        Some(&self.bitmaps[index * stride..(index + 1) * stride])
    }

    /// Whether slot `bit` of bitmap `index` holds a pointer.
    pub fn is_pointer(&self, index: usize, bit: usize) -> bool {
        if bit >= self.nbit {
            return false;
        }
        self.bitmap(index)
            .is_some_and(|bm| bm[bit / 8] & (1 << (bit % 8)) != 0)
    }
}
