//! Host type handles.

use std::mem::{offset_of, size_of};

use super::{FieldInfo, HostType};

/// Mirror of the host runtime's function descriptor header.
///
/// Followed in memory by `npcdata` u32 PC-table offsets and `nfuncdata` u32
/// funcdata offsets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct RawFunc {
    pub entry_off: u32,
    pub name_off: i32,
    pub args: i32,
    pub deferreturn: u32,
    pub pcsp: u32,
    pub pcfile: u32,
    pub pcln: u32,
    pub npcdata: u32,
    pub cu_offset: u32,
    pub start_line: i32,
    pub func_id: u8,
    pub flag: u8,
    pub _pad: [u8; 1],
    pub nfuncdata: u8,
}

const _: () = assert!(size_of::<RawFunc>() == 44);

macro_rules! field {
    ($name:ident: $ty:ty) => {
        FieldInfo::new(offset_of!(RawFunc, $name), size_of::<$ty>())
    };
}

/// Handle to the descriptor type this crate was compiled against.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeFuncType;

impl HostType for NativeFuncType {
    fn type_name(&self) -> &str {
        "_func"
    }

    fn size(&self) -> usize {
        size_of::<RawFunc>()
    }

    fn field(&self, name: &str) -> Option<FieldInfo> {
        let info = match name {
            "entryOff" => field!(entry_off: u32),
            "nameOff" => field!(name_off: i32),
            "args" => field!(args: i32),
            "deferreturn" => field!(deferreturn: u32),
            "pcsp" => field!(pcsp: u32),
            "pcfile" => field!(pcfile: u32),
            "pcln" => field!(pcln: u32),
            "npcdata" => field!(npcdata: u32),
            "cuOffset" => field!(cu_offset: u32),
            "startLine" => field!(start_line: i32),
            "funcID" => field!(func_id: u8),
            "flag" => field!(flag: u8),
            "nfuncdata" => field!(nfuncdata: u8),
            _ => return None,
        };
        Some(info)
    }
}

/// Host type described by a static field table.
///
/// Used for runtime versions whose layout is known ahead of time rather than
/// reflected from a Rust mirror.
#[derive(Clone, Copy, Debug)]
pub struct StaticHostType {
    name: &'static str,
    size: usize,
    fields: &'static [(&'static str, FieldInfo)],
}

impl StaticHostType {
    pub const fn new(
        name: &'static str,
        size: usize,
        fields: &'static [(&'static str, FieldInfo)],
    ) -> Self {
        Self { name, size, fields }
    }
}

impl HostType for StaticHostType {
    fn type_name(&self) -> &str {
        self.name
    }

    fn size(&self) -> usize {
        self.size
    }

    fn field(&self, name: &str) -> Option<FieldInfo> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|&(_, info)| info)
    }
}
