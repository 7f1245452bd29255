//! PC-indexed table encoding.
//!
//! See [`funcmeta_format::format`] for the record layout. Samples are
//! validated before anything is written, so a failed table leaves the pool
//! untouched.

use funcmeta_format::{PcValue, Pool, write_svarint, write_uvarint};
use tracing::trace;

use crate::error::PcTableError;

/// Encode one table, terminator included.
///
/// A sample whose value equals the value already in effect adds no record.
/// The first sample always produces one.
pub fn encode_pcdata(
    samples: &[PcValue],
    text_size: u32,
    quantum: u32,
) -> Result<Vec<u8>, PcTableError> {
    let quantum = quantum.max(1);
    check_samples(samples, text_size, quantum)?;

    let mut out = Vec::with_capacity(samples.len() * 2 + 1);
    let mut cursor: i64 = -1;
    let mut value: i64 = 0;

    for (i, sample) in samples.iter().enumerate() {
        let next = i64::from(sample.value);
        if i > 0 && next == value {
            continue;
        }
        let units = i64::from(sample.pc / quantum);
        write_uvarint(&mut out, (units - cursor) as u64);
        write_svarint(&mut out, next - value);
        cursor = units;
        value = next;
    }

    out.push(0);
    Ok(out)
}

fn check_samples(samples: &[PcValue], text_size: u32, quantum: u32) -> Result<(), PcTableError> {
    let mut prev: Option<u32> = None;
    for sample in samples {
        if let Some(prev) = prev
            && sample.pc <= prev
        {
            return Err(PcTableError::Unordered {
                prev,
                pc: sample.pc,
            });
        }
        if sample.pc >= text_size {
            return Err(PcTableError::OutOfRange {
                pc: sample.pc,
                limit: text_size,
            });
        }
        if sample.pc % quantum != 0 {
            return Err(PcTableError::Misaligned {
                pc: sample.pc,
                quantum,
            });
        }
        prev = Some(sample.pc);
    }
    Ok(())
}

/// Collects the encoded tables of a batch into one pool.
///
/// Offset 0 is reserved and means "no table".
#[derive(Debug)]
pub struct PcTabBuilder {
    pool: Pool,
    quantum: u32,
}

impl PcTabBuilder {
    pub fn new(quantum: u32) -> Self {
        Self {
            pool: Pool::with_reserved_zero(),
            quantum: quantum.max(1),
        }
    }

    /// Encode and append a table, returning its pool offset (0 for `None`).
    pub fn push(
        &mut self,
        samples: Option<&[PcValue]>,
        text_size: u32,
    ) -> Result<usize, PcTableError> {
        let Some(samples) = samples else {
            return Ok(0);
        };
        let encoded = encode_pcdata(samples, text_size, self.quantum)?;
        let offset = self.pool.append(&encoded);
        trace!(offset, samples = samples.len(), len = encoded.len(), "pc table");
        Ok(offset)
    }

    pub fn quantum(&self) -> u32 {
        self.quantum
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// Whether any table has been appended beyond the reserved byte.
    pub fn is_empty(&self) -> bool {
        self.pool.len() <= 1
    }

    pub fn finish(self) -> Vec<u8> {
        self.pool.into_bytes()
    }
}
