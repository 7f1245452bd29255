//! Pointer bitmap construction for the pointer-map funcdata slots.
//!
//! Encoded as `n (i32) | nbit (i32) | n bitmaps of ceil(nbit / 8) bytes`,
//! little-endian, bit `i` of a bitmap at byte `i / 8`, position `i % 8`.

use crate::error::MarshalError;

/// A set of equally sized pointer bitmaps.
///
/// The stack-map-index PC table selects which bitmap is live at a PC.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StackMap {
    nbit: u32,
    bitmaps: Vec<Vec<u8>>,
}

impl StackMap {
    /// Empty map whose bitmaps will hold `nbit` bits each.
    pub fn new(nbit: u32) -> Self {
        Self {
            nbit,
            bitmaps: Vec::new(),
        }
    }

    fn stride(&self) -> usize {
        (self.nbit as usize).div_ceil(8)
    }

    /// Append a bitmap built from one flag per slot, returning its index.
    ///
    /// Missing trailing slots are non-pointers; extra slots are ignored.
    pub fn push(&mut self, pointers: &[bool]) -> usize {
        let mut bitmap = vec![0u8; self.stride()];
        for (bit, _) in pointers
            .iter()
            .enumerate()
            .take(self.nbit as usize)
            .filter(|(_, ptr)| **ptr)
        {
            bitmap[bit / 8] |= 1 << (bit % 8);
        }
        self.bitmaps.push(bitmap);
        self.bitmaps.len() - 1
    }

    pub fn nbit(&self) -> u32 {
        self.nbit
    }

    pub fn len(&self) -> usize {
        self.bitmaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bitmaps.is_empty()
    }

    /// Serialize the map. Both counts must fit the signed 32-bit header.
    pub fn to_bytes(&self) -> Result<Vec<u8>, MarshalError> {
        let n = i32::try_from(self.bitmaps.len())
            .map_err(|_| MarshalError::new(format!("too many bitmaps: {}", self.bitmaps.len())))?;
        let nbit = i32::try_from(self.nbit)
            .map_err(|_| MarshalError::new(format!("bitmap too wide: {} bits", self.nbit)))?;

        let mut out = Vec::with_capacity(8 + self.bitmaps.len() * self.stride());
        out.extend_from_slice(&n.to_le_bytes());
        out.extend_from_slice(&nbit.to_le_bytes());
        for bitmap in &self.bitmaps {
            out.extend_from_slice(bitmap);
        }
        Ok(out)
    }
}

/// Builds a single-bitmap [`StackMap`] one slot at a time.
#[derive(Clone, Debug, Default)]
pub struct StackMapBuilder {
    bits: Vec<bool>,
}

impl StackMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_field(&mut self, ptr: bool) -> &mut Self {
        self.bits.push(ptr);
        self
    }

    pub fn add_fields(&mut self, count: usize, ptr: bool) -> &mut Self {
        self.bits.extend(std::iter::repeat_n(ptr, count));
        self
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn build(&self) -> StackMap {
        let mut map = StackMap::new(self.bits.len() as u32);
        map.push(&self.bits);
        map
    }
}
