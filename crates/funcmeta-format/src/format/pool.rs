//! Append-only byte pool shared by all functions of one batch.
//!
//! Offsets handed out by [`Pool::append`] stay valid for the pool's lifetime:
//! bytes are never rewritten or removed. The pool is owned by a single
//! encoding pass and moved out with [`Pool::into_bytes`] when the batch is done.

use std::ops::Deref;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pool {
    bytes: Vec<u8>,
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pool whose first byte is a zero pad, so no real entry sits at offset 0.
    pub fn with_reserved_zero() -> Self {
        Self { bytes: vec![0] }
    }

    /// Append `data`, returning the offset where it starts.
    pub fn append(&mut self, data: &[u8]) -> usize {
        let offset = self.bytes.len();
        self.bytes.extend_from_slice(data);
        offset
    }

    /// Append a single byte, returning its offset.
    pub fn push(&mut self, byte: u8) -> usize {
        let offset = self.bytes.len();
        self.bytes.push(byte);
        offset
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl Deref for Pool {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}
