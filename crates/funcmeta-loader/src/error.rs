//! Error types for metadata emission.

use funcmeta_format::{FuncdataSlot, INVALID_FUNCDATA_OFFSET, PcdataKind};

/// PC table samples that violate the encoder's contract.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PcTableError {
    #[error("pc {pc:#x} does not follow previous pc {prev:#x}")]
    Unordered { prev: u32, pc: u32 },
    #[error("pc {pc:#x} outside function text of {limit:#x} bytes")]
    OutOfRange { pc: u32, limit: u32 },
    #[error("pc {pc:#x} is not a multiple of the pc quantum {quantum}")]
    Misaligned { pc: u32, quantum: u32 },
}

/// A side-table blob failed to serialize itself.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct MarshalError {
    message: String,
}

impl MarshalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error during batch emission. The whole batch is abandoned.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EmitError {
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    #[error("code region is empty")]
    EmptyCodeRegion,
    #[error("too many functions: {0} (max 2147483647)")]
    TooManyFuncs(usize),
    #[error("function {index} ({name}): invalid argument size {value}")]
    InvalidArgsSize {
        index: usize,
        name: String,
        value: i32,
    },
    #[error("function {index} ({name:?}): name contains a NUL byte")]
    InvalidName { index: usize, name: String },
    #[error("function {index} ({name}): empty text")]
    EmptyText { index: usize, name: String },
    #[error(
        "function {index} ({name}): text {entry_off:#x}+{text_size:#x} exceeds code region of {code_size:#x} bytes"
    )]
    EntryOutOfRange {
        index: usize,
        name: String,
        entry_off: u32,
        text_size: u32,
        code_size: u32,
    },
    #[error("function {index} ({name}): deferreturn {offset:#x} outside text of {text_size:#x} bytes")]
    DeferReturnOutOfRange {
        index: usize,
        name: String,
        offset: u32,
        text_size: u32,
    },
    #[error("function {index} ({name}): file index {file_index} outside file table of {count} entries")]
    FileIndexOutOfRange {
        index: usize,
        name: String,
        file_index: u32,
        count: usize,
    },
    #[error("function {index} ({name}) at {entry_off:#x} precedes previous function at {prev:#x}")]
    Unsorted {
        index: usize,
        name: String,
        entry_off: u32,
        prev: u32,
    },
    #[error("function {index} ({name}) at {entry_off:#x} overlaps previous function ending at {prev_end:#x}")]
    Overlap {
        index: usize,
        name: String,
        entry_off: u32,
        prev_end: u32,
    },
    #[error("function {index} ({name}): {kind} table: {source}")]
    PcTable {
        index: usize,
        name: String,
        kind: PcdataKind,
        source: PcTableError,
    },
    #[error("function {index} ({name}): failed to marshal {slot}: {source}")]
    Marshal {
        index: usize,
        name: String,
        slot: FuncdataSlot,
        source: MarshalError,
    },
    #[error("{pool} pool too large: {len} bytes")]
    PoolOverflow { pool: &'static str, len: usize },
    #[error("verification failed for function {index}: {detail}")]
    VerifyMismatch { index: usize, detail: String },
}

/// Convert a pool position to a 32-bit offset.
///
/// Positions that would reach the invalid-offset sentinel are rejected so no
/// real offset can be mistaken for an absent slot.
pub(crate) fn pool_offset(pool: &'static str, offset: usize) -> Result<u32, EmitError> {
    u32::try_from(offset)
        .ok()
        .filter(|&off| off != INVALID_FUNCDATA_OFFSET)
        .ok_or(EmitError::PoolOverflow { pool, len: offset })
}
