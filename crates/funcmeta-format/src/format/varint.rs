//! Varint primitives and a bounds-checked byte reader.
//!
//! Unsigned values use LEB128 (7 bits per byte, high bit = continuation).
//! Signed values are zig-zag mapped first so small magnitudes of either sign
//! stay short.

/// Read-side decoding failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unexpected end of input at offset {0}")]
    UnexpectedEof(usize),
    #[error("varint at offset {0} overflows 64 bits")]
    Overflow(usize),
    #[error("unterminated entry starting at offset {0}")]
    Unterminated(usize),
    #[error("offset {offset} out of bounds (len {len})")]
    OutOfBounds { offset: usize, len: usize },
    #[error("value {0} does not fit the target type")]
    Truncated(i64),
    #[error("invalid UTF-8 at offset {0}")]
    InvalidUtf8(usize),
}

/// Append `v` as an unsigned LEB128 varint.
pub fn write_uvarint(out: &mut Vec<u8>, mut v: u64) {
    while v >= 0x80 {
        out.push((v as u8) | 0x80);
        v >>= 7;
    }
    out.push(v as u8);
}

/// Append `v` as a zig-zag encoded varint.
pub fn write_svarint(out: &mut Vec<u8>, v: i64) {
    write_uvarint(out, zigzag(v));
}

#[inline]
fn zigzag(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

#[inline]
fn unzigzag(v: u64) -> i64 {
    ((v >> 1) as i64) ^ -((v & 1) as i64)
}

/// Cursor over a byte slice.
#[derive(Clone, Debug)]
pub struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// Start reading at `offset`.
    pub fn at(bytes: &'a [u8], offset: usize) -> Result<Self, DecodeError> {
        if offset > bytes.len() {
            return Err(DecodeError::OutOfBounds {
                offset,
                len: bytes.len(),
            });
        }
        Ok(Self { bytes, offset })
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.offset >= self.bytes.len()
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let b = *self
            .bytes
            .get(self.offset)
            .ok_or(DecodeError::UnexpectedEof(self.offset))?;
        self.offset += 1;
        Ok(b)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(DecodeError::UnexpectedEof(self.bytes.len()))?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    pub fn read_u32_le(&mut self) -> Result<u32, DecodeError> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_i32_le(&mut self) -> Result<i32, DecodeError> {
        Ok(self.read_u32_le()? as i32)
    }

    pub fn read_uvarint(&mut self) -> Result<u64, DecodeError> {
        let start = self.offset;
        let mut result = 0u64;
        let mut shift = 0u32;
        loop {
            let byte = self.read_u8()?;
            if shift == 63 && byte > 1 {
                return Err(DecodeError::Overflow(start));
            }
            result |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
            if shift > 63 {
                return Err(DecodeError::Overflow(start));
            }
        }
    }

    pub fn read_svarint(&mut self) -> Result<i64, DecodeError> {
        self.read_uvarint().map(unzigzag)
    }
}
