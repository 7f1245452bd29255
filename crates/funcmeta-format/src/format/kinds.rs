//! Fixed sets of side-table slots and PC table kinds.

use std::fmt;

use super::{N_FUNCDATA, N_PCDATA};

/// Funcdata slot, in the order the host expects the offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum FuncdataSlot {
    ArgsPointerMaps = 0,
    LocalsPointerMaps = 1,
    StackObjects = 2,
    InlTree = 3,
    OpenCodedDeferInfo = 4,
    ArgInfo = 5,
    ArgLiveInfo = 6,
    WrapInfo = 7,
}

impl FuncdataSlot {
    pub const ALL: [Self; N_FUNCDATA] = [
        Self::ArgsPointerMaps,
        Self::LocalsPointerMaps,
        Self::StackObjects,
        Self::InlTree,
        Self::OpenCodedDeferInfo,
        Self::ArgInfo,
        Self::ArgLiveInfo,
        Self::WrapInfo,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::ArgsPointerMaps => "args_pointer_maps",
            Self::LocalsPointerMaps => "locals_pointer_maps",
            Self::StackObjects => "stack_objects",
            Self::InlTree => "inl_tree",
            Self::OpenCodedDeferInfo => "open_coded_defer_info",
            Self::ArgInfo => "arg_info",
            Self::ArgLiveInfo => "arg_live_info",
            Self::WrapInfo => "wrap_info",
        }
    }
}

impl fmt::Display for FuncdataSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of PC-indexed table.
///
/// The first three are referenced from fixed descriptor fields; the remaining
/// four occupy the trailing pcdata array in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PcdataKind {
    /// PC -> stack pointer delta.
    Sp = 0,
    /// PC -> source file index.
    File = 1,
    /// PC -> source line number.
    Line = 2,
    /// PC -> safe-point classification.
    UnsafePoint = 3,
    /// PC -> stack map index into the pointer-map funcdata.
    StackMapIndex = 4,
    /// PC -> inlining tree index into the inl-tree funcdata.
    InlTreeIndex = 5,
    /// PC -> argument liveness index into the arg-live funcdata.
    ArgLiveIndex = 6,
}

impl PcdataKind {
    pub const COUNT: usize = 7;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Sp,
        Self::File,
        Self::Line,
        Self::UnsafePoint,
        Self::StackMapIndex,
        Self::InlTreeIndex,
        Self::ArgLiveIndex,
    ];

    /// Kinds stored in the trailing pcdata array, in slot order.
    pub const TRAILING: [Self; N_PCDATA] = [
        Self::UnsafePoint,
        Self::StackMapIndex,
        Self::InlTreeIndex,
        Self::ArgLiveIndex,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Position in the trailing pcdata array, or `None` for header tables.
    pub const fn trailing_index(self) -> Option<usize> {
        match self {
            Self::Sp | Self::File | Self::Line => None,
            _ => Some(self as usize - 3),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Sp => "pcsp",
            Self::File => "pcfile",
            Self::Line => "pcln",
            Self::UnsafePoint => "unsafe_point",
            Self::StackMapIndex => "stack_map_index",
            Self::InlTreeIndex => "inl_tree_index",
            Self::ArgLiveIndex => "arg_live_index",
        }
    }
}

impl fmt::Display for PcdataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
