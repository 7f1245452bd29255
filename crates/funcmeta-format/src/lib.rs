//! Host-facing function metadata format for JIT-generated code.
//!
//! This crate contains:
//! - Format constants and sentinels (funcdata/pcdata counts, unknown args size)
//! - Descriptor field types (FuncId, FuncFlag, ArgsSize) and table kinds
//! - Varint primitives and the append-only [`Pool`]
//! - Layout introspection of the host's function descriptor type
//! - Read-side views over PC tables, name pools, stack maps and descriptors

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod format;
pub mod layout;

pub use format::{
    ARGS_SIZE_UNKNOWN, ArgsSize, DecodeError, FuncDescriptorView, FuncFlag, FuncId,
    FuncdataSlot, GENERIC_MARKER, INVALID_FUNCDATA_OFFSET, MIN_LC, N_FUNCDATA, N_PCDATA,
    NameTableView, PTR_SIZE, PcTableView, PcValue, PcdataKind, Pool, Reader, StackMapView,
    func_name_parts, write_svarint, write_uvarint,
};
pub use layout::{
    FieldInfo, FuncField, FuncLayout, HostType, LayoutError, NativeFuncType, RawFunc,
    StaticHostType,
};
