//! Binary format of the function metadata handed to the host runtime.
//!
//! A registered batch consists of:
//! - a name pool (NUL-terminated names, offset 0 = no name)
//! - a PC-table pool (varint records, offset 0 = no table)
//! - a funcdata pool (opaque side-table blobs, 8 slots per function)
//! - one fixed-layout descriptor per function, followed by its
//!   `N_PCDATA` table offsets and `N_FUNCDATA` blob offsets

mod descriptor;
mod ids;
mod kinds;
mod names;
mod pctab;
mod pool;
mod stackmap;
mod varint;

#[cfg(test)]
mod pctab_tests;

pub use descriptor::FuncDescriptorView;
pub use ids::{ArgsSize, FuncFlag, FuncId};
pub use kinds::{FuncdataSlot, PcdataKind};
pub use names::{NameTableView, func_name_parts};
pub use pctab::{PcTableView, PcValue};
pub use pool::Pool;
pub use stackmap::StackMapView;
pub use varint::{DecodeError, Reader, write_svarint, write_uvarint};

/// Number of funcdata slots every descriptor carries.
pub const N_FUNCDATA: usize = 8;

/// Number of PC tables referenced from the trailing pcdata array.
///
/// `pcsp`, `pcfile` and `pcln` live in fixed header fields instead.
pub const N_PCDATA: usize = 4;

/// Funcdata offset meaning "this slot has no data for this function".
pub const INVALID_FUNCDATA_OFFSET: u32 = u32::MAX;

/// Argument size of functions whose frame size is unknown
/// (variadic helpers, assembly without an explicit frame).
pub const ARGS_SIZE_UNKNOWN: i32 = -0x8000_0000;

/// Minimum instruction length; PC deltas are stored in these units.
pub const MIN_LC: u32 = 1;

/// Pointer size of the host.
pub const PTR_SIZE: u32 = 8;

/// Placeholder substituted for a generic instantiation argument list.
pub const GENERIC_MARKER: &str = "[...]";
