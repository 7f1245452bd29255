//! Function descriptor records.
//!
//! A record is the host's descriptor header followed by the trailing pcdata
//! offsets and the funcdata offsets:
//!
//! ```text
//! header (layout.header_size(), fields at resolved offsets)
//! pcdata[N_PCDATA]     u32 each, 0 = no table
//! funcdata[N_FUNCDATA] u32 each, INVALID_FUNCDATA_OFFSET = absent
//! ```

use funcmeta_format::{
    ArgsSize, FuncField, FuncFlag, FuncId, FuncLayout, INVALID_FUNCDATA_OFFSET, N_FUNCDATA,
    N_PCDATA,
};

use crate::error::EmitError;
use crate::func::Func;

/// Pool offsets a descriptor points at, resolved by the earlier encoders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DescriptorRefs {
    pub name_off: i32,
    pub pcsp: u32,
    pub pcfile: u32,
    pub pcln: u32,
    pub pcdata: [u32; N_PCDATA],
    pub funcdata: [u32; N_FUNCDATA],
}

impl Default for DescriptorRefs {
    fn default() -> Self {
        Self {
            name_off: 0,
            pcsp: 0,
            pcfile: 0,
            pcln: 0,
            pcdata: [0; N_PCDATA],
            funcdata: [INVALID_FUNCDATA_OFFSET; N_FUNCDATA],
        }
    }
}

/// One encoded descriptor together with the values it was built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FuncDescriptor {
    id: FuncId,
    flags: FuncFlag,
    args_size: ArgsSize,
    entry_off: u32,
    text_size: u32,
    defer_return: u32,
    file_index: u32,
    start_line: i32,
    refs: DescriptorRefs,
    bytes: Vec<u8>,
}

impl FuncDescriptor {
    pub fn id(&self) -> FuncId {
        self.id
    }

    pub fn flags(&self) -> FuncFlag {
        self.flags
    }

    pub fn args_size(&self) -> ArgsSize {
        self.args_size
    }

    pub fn entry_off(&self) -> u32 {
        self.entry_off
    }

    pub fn text_size(&self) -> u32 {
        self.text_size
    }

    pub fn end_off(&self) -> u32 {
        self.entry_off + self.text_size
    }

    pub fn defer_return(&self) -> u32 {
        self.defer_return
    }

    pub fn file_index(&self) -> u32 {
        self.file_index
    }

    pub fn start_line(&self) -> i32 {
        self.start_line
    }

    pub fn refs(&self) -> &DescriptorRefs {
        &self.refs
    }

    /// The record in host layout.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Validates functions and writes their descriptor records.
#[derive(Clone, Copy, Debug)]
pub struct DescriptorBuilder<'a> {
    layout: &'a FuncLayout,
    code_size: u32,
}

impl<'a> DescriptorBuilder<'a> {
    pub fn new(layout: &'a FuncLayout, code_size: u32) -> Self {
        Self { layout, code_size }
    }

    pub fn layout(&self) -> &'a FuncLayout {
        self.layout
    }

    /// Check the per-function facts that do not depend on other functions.
    pub fn validate(&self, index: usize, func: &Func) -> Result<(), EmitError> {
        if !func.args_size.is_valid() {
            return Err(EmitError::InvalidArgsSize {
                index,
                name: func.name.clone(),
                value: func.args_size.raw(),
            });
        }
        if func.text_size == 0 {
            return Err(EmitError::EmptyText {
                index,
                name: func.name.clone(),
            });
        }
        if func.end_off() > u64::from(self.code_size) {
            return Err(EmitError::EntryOutOfRange {
                index,
                name: func.name.clone(),
                entry_off: func.entry_off,
                text_size: func.text_size,
                code_size: self.code_size,
            });
        }
        if func.defer_return != 0 && func.defer_return >= func.text_size {
            return Err(EmitError::DeferReturnOutOfRange {
                index,
                name: func.name.clone(),
                offset: func.defer_return,
                text_size: func.text_size,
            });
        }
        Ok(())
    }

    pub fn build(
        &self,
        index: usize,
        func: &Func,
        refs: DescriptorRefs,
    ) -> Result<FuncDescriptor, EmitError> {
        self.validate(index, func)?;
        let bytes = self.encode(func, &refs);
        Ok(FuncDescriptor {
            id: func.id,
            flags: func.flags,
            args_size: func.args_size,
            entry_off: func.entry_off,
            text_size: func.text_size,
            defer_return: func.defer_return,
            file_index: func.file_index,
            start_line: func.start_line,
            refs,
            bytes,
        })
    }

    fn encode(&self, func: &Func, refs: &DescriptorRefs) -> Vec<u8> {
        let layout = self.layout;
        let mut buf = vec![0u8; layout.record_size()];

        let mut put_u32 = |at: usize, v: u32| buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
        put_u32(layout.offset(FuncField::EntryOff), func.entry_off);
        put_u32(layout.offset(FuncField::NameOff), refs.name_off as u32);
        put_u32(layout.offset(FuncField::Args), func.args_size.raw() as u32);
        put_u32(layout.offset(FuncField::DeferReturn), func.defer_return);
        put_u32(layout.offset(FuncField::Pcsp), refs.pcsp);
        put_u32(layout.offset(FuncField::Pcfile), refs.pcfile);
        put_u32(layout.offset(FuncField::Pcln), refs.pcln);
        put_u32(layout.offset(FuncField::Npcdata), N_PCDATA as u32);
        put_u32(layout.offset(FuncField::CuOffset), func.file_index);
        put_u32(layout.offset(FuncField::StartLine), func.start_line as u32);
        for (i, &off) in refs.pcdata.iter().enumerate() {
            put_u32(layout.pcdata_offset() + i * 4, off);
        }
        for (i, &off) in refs.funcdata.iter().enumerate() {
            put_u32(layout.funcdata_offset() + i * 4, off);
        }

        buf[layout.offset(FuncField::FuncId)] = func.id.get();
        buf[layout.offset(FuncField::Flag)] = func.flags.bits();
        buf[layout.offset(FuncField::Nfuncdata)] = N_FUNCDATA as u8;
        buf
    }
}
