//! Read-side view of one encoded function descriptor record.

use crate::layout::{FuncField, FuncLayout};

use super::ids::{ArgsSize, FuncFlag, FuncId};
use super::kinds::{FuncdataSlot, PcdataKind};
use super::varint::DecodeError;

/// Descriptor record decoded through a resolved [`FuncLayout`].
#[derive(Clone, Copy, Debug)]
pub struct FuncDescriptorView<'a> {
    bytes: &'a [u8],
    layout: &'a FuncLayout,
}

impl<'a> FuncDescriptorView<'a> {
    pub fn new(bytes: &'a [u8], layout: &'a FuncLayout) -> Result<Self, DecodeError> {
        if bytes.len() < layout.record_size() {
            return Err(DecodeError::UnexpectedEof(bytes.len()));
        }
        Ok(Self { bytes, layout })
    }

    #[inline]
    fn read_u32_at(&self, offset: usize) -> u32 {
        let b = &self.bytes[offset..offset + 4];
        u32::from_le_bytes([b[0], b[1], b[2], b[3]])
    }

    #[inline]
    fn u32_field(&self, field: FuncField) -> u32 {
        self.read_u32_at(self.layout.offset(field))
    }

    #[inline]
    fn u8_field(&self, field: FuncField) -> u8 {
        self.bytes[self.layout.offset(field)]
    }

    pub fn entry_off(&self) -> u32 {
        self.u32_field(FuncField::EntryOff)
    }

    pub fn name_off(&self) -> i32 {
        self.u32_field(FuncField::NameOff) as i32
    }

    pub fn args_size(&self) -> ArgsSize {
        ArgsSize::from_raw(self.u32_field(FuncField::Args) as i32)
    }

    pub fn defer_return(&self) -> u32 {
        self.u32_field(FuncField::DeferReturn)
    }

    pub fn file_index(&self) -> u32 {
        self.u32_field(FuncField::CuOffset)
    }

    pub fn start_line(&self) -> i32 {
        self.u32_field(FuncField::StartLine) as i32
    }

    pub fn func_id(&self) -> FuncId {
        FuncId::new(self.u8_field(FuncField::FuncId))
    }

    pub fn flags(&self) -> FuncFlag {
        FuncFlag::from_bits(self.u8_field(FuncField::Flag))
    }

    pub fn npcdata(&self) -> u32 {
        self.u32_field(FuncField::Npcdata)
    }

    pub fn nfuncdata(&self) -> u8 {
        self.u8_field(FuncField::Nfuncdata)
    }

    /// PC-table pool offset for `kind` (0 = no table).
    pub fn pcdata(&self, kind: PcdataKind) -> u32 {
        match kind {
            PcdataKind::Sp => self.u32_field(FuncField::Pcsp),
            PcdataKind::File => self.u32_field(FuncField::Pcfile),
            PcdataKind::Line => self.u32_field(FuncField::Pcln),
            _ => {
                let slot = kind.trailing_index().unwrap_or_default();
                self.read_u32_at(self.layout.pcdata_offset() + slot * 4)
            }
        }
    }

    /// Funcdata pool offset for `slot`, or the invalid-offset sentinel.
    pub fn funcdata(&self, slot: FuncdataSlot) -> u32 {
        self.read_u32_at(self.layout.funcdata_offset() + slot.index() * 4)
    }
}
