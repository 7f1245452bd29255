//! Function metadata encoding for JIT-generated code.
//!
//! This crate turns the facts a code generator knows about its output into
//! the tables a host runtime needs to unwind, scan and attribute that code:
//! - `pctab` - PC-indexed tables (SP delta, file, line, stack map index, ...)
//! - `name_table` / `file_table` - NUL-terminated name and path pools
//! - `funcdata` - per-function side-table blobs with absent-slot sentinels
//! - `descriptor` - fixed-layout descriptor records, written through the
//!   layout resolved by [`funcmeta_format::layout`]
//! - `emitter` - the single-pass batch encoder producing a [`ModuleData`]
//!
//! ```
//! use funcmeta_format::{FuncLayout, NativeFuncType, PcValue, PcdataKind};
//! use funcmeta_loader::{Batch, Config, Func, emit};
//!
//! let layout = FuncLayout::resolve(&NativeFuncType).unwrap();
//! let mut batch = Batch::new(64);
//! batch.push(
//!     Func::new("decode_value", 0, 64)
//!         .with_pcdata(PcdataKind::Sp, vec![PcValue::new(0, 0), PcValue::new(4, 16)]),
//! );
//!
//! let module = emit(&batch, &layout, &Config::default()).unwrap();
//! assert_eq!(module.name(0).unwrap(), "decode_value");
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod config;
mod descriptor;
mod dump;
mod emitter;
mod error;
mod file_table;
mod func;
mod funcdata;
mod invariants;
mod module;
mod name_table;
mod pctab;
mod stackmap;

#[cfg(test)]
mod emit_tests;
#[cfg(test)]
mod pctab_tests;
#[cfg(test)]
pub mod test_utils;

pub use config::Config;
pub use descriptor::{DescriptorBuilder, DescriptorRefs, FuncDescriptor};
pub use dump::dump;
pub use emitter::{RegisterError, emit, register};
pub use error::{EmitError, MarshalError, PcTableError};
pub use file_table::FileTableBuilder;
pub use func::{Batch, Func, Funcdata, FuncdataSet, MarshalBinary, Pcdata, PcdataSet};
pub use funcdata::{FuncdataTable, write_funcdata};
pub use module::{FuncTabEntry, ModuleData, Registrar};
pub use name_table::NameTableBuilder;
pub use pctab::{PcTabBuilder, encode_pcdata};
pub use stackmap::{StackMap, StackMapBuilder};
