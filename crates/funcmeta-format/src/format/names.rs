//! Function name pool format.
//!
//! ```text
//! offset 0      -> \0                          (reserved: no name)
//! name_off[0]   -> prefix marker suffix \0
//! name_off[1]   -> prefix marker suffix \0
//! ...
//! ```

use super::GENERIC_MARKER;
use super::varint::DecodeError;

/// Split a function name around its generic instantiation list.
///
/// The list runs from the first `[` to the last `]` after it and is replaced
/// by [`GENERIC_MARKER`]. Names without a `[`, or with a `[` that is never
/// closed, come back whole as the prefix with an empty marker and suffix.
pub fn func_name_parts(name: &str) -> (&str, &str, &str) {
    let Some(open) = name.find('[') else {
        return (name, "", "");
    };
    match name.rfind(']') {
        Some(close) if close > open => (&name[..open], GENERIC_MARKER, &name[close + 1..]),
        _ => (name, "", ""),
    }
}

/// View over an encoded name pool.
#[derive(Clone, Copy, Debug)]
pub struct NameTableView<'a> {
    pool: &'a [u8],
}

impl<'a> NameTableView<'a> {
    pub fn new(pool: &'a [u8]) -> Self {
        Self { pool }
    }

    /// Raw bytes of the name at `offset`, without the terminating NUL.
    pub fn get_bytes(&self, offset: i32) -> Result<&'a [u8], DecodeError> {
        let start =
            usize::try_from(offset).map_err(|_| DecodeError::Truncated(i64::from(offset)))?;
        if start >= self.pool.len() {
            return Err(DecodeError::OutOfBounds {
                offset: start,
                len: self.pool.len(),
            });
        }
        let rest = &self.pool[start..];
        let end = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(DecodeError::Unterminated(start))?;
        Ok(&rest[..end])
    }

    /// Name at `offset`. Offset 0 yields the empty name.
    pub fn get(&self, offset: i32) -> Result<&'a str, DecodeError> {
        let bytes = self.get_bytes(offset)?;
        std::str::from_utf8(bytes)
            .map_err(|e| DecodeError::InvalidUtf8(offset as usize + e.valid_up_to()))
    }
}
