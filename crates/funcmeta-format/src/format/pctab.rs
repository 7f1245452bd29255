//! PC-indexed table format and its read-side view.
//!
//! A table is a sequence of records terminated by a single `0x00` byte:
//!
//! ```text
//! record := uvarint(pc_step) svarint(value_delta)
//! ```
//!
//! `pc_step` counts quantum units from the previous record's PC. The PC cursor
//! starts one unit before the function entry, so every step is at least 1 and
//! a zero byte in step position always terminates the table. Values start at
//! 0 and every kind stores signed deltas.
//!
//! Lookup is last-value-wins: a PC inherits the value of the closest record at
//! or before it. PCs before the first record have no information.

use super::varint::{DecodeError, Reader};

/// One `(pc, value)` sample: from `pc` onward the table's value is `value`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PcValue {
    pub pc: u32,
    pub value: i32,
}

impl PcValue {
    pub const fn new(pc: u32, value: i32) -> Self {
        Self { pc, value }
    }
}

/// View of one encoded table inside a pool.
#[derive(Clone, Copy, Debug)]
pub struct PcTableView<'a> {
    bytes: &'a [u8],
    start: usize,
    quantum: u32,
}

impl<'a> PcTableView<'a> {
    /// View a table that starts at the beginning of `bytes`.
    pub fn new(bytes: &'a [u8], quantum: u32) -> Self {
        Self {
            bytes,
            start: 0,
            quantum: quantum.max(1),
        }
    }

    /// View the table at `offset` of a PC-table pool.
    ///
    /// Offset 0 is the pool's reserved "no table" position and yields `None`.
    pub fn in_pool(
        pool: &'a [u8],
        offset: u32,
        quantum: u32,
    ) -> Result<Option<Self>, DecodeError> {
        if offset == 0 {
            return Ok(None);
        }
        let start = offset as usize;
        if start >= pool.len() {
            return Err(DecodeError::OutOfBounds {
                offset: start,
                len: pool.len(),
            });
        }
        Ok(Some(Self {
            bytes: pool,
            start,
            quantum: quantum.max(1),
        }))
    }

    pub fn iter(&self) -> PcTableIter<'a> {
        PcTableIter {
            reader: Reader::at(self.bytes, self.start).unwrap_or_else(|_| Reader::new(&[])),
            quantum: u64::from(self.quantum),
            cursor: -1,
            value: 0,
            done: false,
        }
    }

    /// Decode every record.
    pub fn decode(&self) -> Result<Vec<PcValue>, DecodeError> {
        self.iter().collect()
    }

    /// Value in effect at `pc`, or `None` when no record precedes it.
    pub fn lookup(&self, pc: u32) -> Result<Option<i32>, DecodeError> {
        let mut found = None;
        for record in self.iter() {
            let record = record?;
            if record.pc > pc {
                break;
            }
            found = Some(record.value);
        }
        Ok(found)
    }

    /// Number of bytes the table occupies, terminator included.
    pub fn encoded_len(&self) -> Result<usize, DecodeError> {
        let mut iter = self.iter();
        for record in iter.by_ref() {
            record?;
        }
        Ok(iter.reader.offset() - self.start)
    }
}

/// Iterator over decoded records.
#[derive(Clone, Debug)]
pub struct PcTableIter<'a> {
    reader: Reader<'a>,
    quantum: u64,
    /// PC cursor in quantum units; starts one unit before entry.
    cursor: i64,
    value: i64,
    done: bool,
}

impl PcTableIter<'_> {
    fn step(&mut self) -> Result<Option<PcValue>, DecodeError> {
        let at = self.reader.offset();
        let step = match self.reader.read_uvarint() {
            Ok(step) => step,
            Err(DecodeError::UnexpectedEof(_)) => return Err(DecodeError::Unterminated(at)),
            Err(e) => return Err(e),
        };
        if step == 0 {
            return Ok(None);
        }
        let delta = self.reader.read_svarint()?;

        self.cursor = i64::try_from(step)
            .ok()
            .and_then(|s| self.cursor.checked_add(s))
            .ok_or(DecodeError::Overflow(at))?;
        self.value = self.value.checked_add(delta).ok_or(DecodeError::Overflow(at))?;

        let pc = (self.cursor as u64)
            .checked_mul(self.quantum)
            .and_then(|pc| u32::try_from(pc).ok())
            .ok_or(DecodeError::Truncated(self.cursor))?;
        let value = i32::try_from(self.value).map_err(|_| DecodeError::Truncated(self.value))?;
        Ok(Some(PcValue { pc, value }))
    }
}

impl Iterator for PcTableIter<'_> {
    type Item = Result<PcValue, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.step() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
