//! Emitted batch output and the registration hand-off.

use funcmeta_format::{
    DecodeError, FuncDescriptorView, FuncLayout, N_FUNCDATA, NameTableView, PcTableView,
    PcdataKind,
};

use crate::descriptor::FuncDescriptor;

/// Function table entry: where a function starts and where its record is.
///
/// The table ends with a sentinel whose `entry_off` is the end of the last
/// function's text and whose `func_off` is 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FuncTabEntry {
    pub entry_off: u32,
    pub func_off: u32,
}

/// Every encoded structure of one batch, ready to hand to a [`Registrar`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleData {
    pub(crate) code_size: u32,
    pub(crate) pc_quantum: u32,
    pub(crate) funcnametab: Vec<u8>,
    pub(crate) name_offsets: Vec<i32>,
    pub(crate) filetab: Vec<u8>,
    pub(crate) file_offsets: Vec<u32>,
    pub(crate) pctab: Vec<u8>,
    pub(crate) funcdata: Vec<u8>,
    pub(crate) funcdata_offsets: Vec<[u32; N_FUNCDATA]>,
    pub(crate) descriptors: Vec<FuncDescriptor>,
    pub(crate) functab: Vec<u8>,
    pub(crate) ftab: Vec<FuncTabEntry>,
}

impl ModuleData {
    pub fn code_size(&self) -> u32 {
        self.code_size
    }

    pub fn pc_quantum(&self) -> u32 {
        self.pc_quantum
    }

    pub fn funcnametab(&self) -> &[u8] {
        &self.funcnametab
    }

    pub fn name_offsets(&self) -> &[i32] {
        &self.name_offsets
    }

    pub fn filetab(&self) -> &[u8] {
        &self.filetab
    }

    pub fn file_offsets(&self) -> &[u32] {
        &self.file_offsets
    }

    pub fn pctab(&self) -> &[u8] {
        &self.pctab
    }

    pub fn funcdata(&self) -> &[u8] {
        &self.funcdata
    }

    pub fn funcdata_offsets(&self) -> &[[u32; N_FUNCDATA]] {
        &self.funcdata_offsets
    }

    pub fn descriptors(&self) -> &[FuncDescriptor] {
        &self.descriptors
    }

    /// Descriptor records laid out back to back, each pointer-aligned.
    pub fn functab(&self) -> &[u8] {
        &self.functab
    }

    pub fn ftab(&self) -> &[FuncTabEntry] {
        &self.ftab
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Stored name of function `index`.
    pub fn name(&self, index: usize) -> Result<&str, DecodeError> {
        let offset = self
            .name_offsets
            .get(index)
            .copied()
            .ok_or(DecodeError::OutOfBounds {
                offset: index,
                len: self.name_offsets.len(),
            })?;
        NameTableView::new(&self.funcnametab).get(offset)
    }

    /// Source path for a file index.
    pub fn file(&self, index: u32) -> Result<&str, DecodeError> {
        let offset = self
            .file_offsets
            .get(index as usize)
            .copied()
            .ok_or(DecodeError::OutOfBounds {
                offset: index as usize,
                len: self.file_offsets.len(),
            })?;
        NameTableView::new(&self.filetab).get(offset as i32)
    }

    /// PC table of `kind` for function `index`, or `None` when it has none.
    pub fn pc_table(
        &self,
        index: usize,
        kind: PcdataKind,
    ) -> Result<Option<PcTableView<'_>>, DecodeError> {
        let desc = self.descriptors.get(index).ok_or(DecodeError::OutOfBounds {
            offset: index,
            len: self.descriptors.len(),
        })?;
        let refs = desc.refs();
        let offset = match kind.trailing_index() {
            None => match kind {
                PcdataKind::Sp => refs.pcsp,
                PcdataKind::File => refs.pcfile,
                _ => refs.pcln,
            },
            Some(slot) => refs.pcdata[slot],
        };
        PcTableView::in_pool(&self.pctab, offset, self.pc_quantum)
    }

    /// Decode function `index`'s record straight out of the function table.
    pub fn descriptor_view<'a>(
        &'a self,
        index: usize,
        layout: &'a FuncLayout,
    ) -> Result<FuncDescriptorView<'a>, DecodeError> {
        let entry = self.ftab.get(index).filter(|_| index < self.descriptors.len());
        let entry = entry.ok_or(DecodeError::OutOfBounds {
            offset: index,
            len: self.descriptors.len(),
        })?;
        let start = entry.func_off as usize;
        let bytes = self.functab.get(start..).ok_or(DecodeError::OutOfBounds {
            offset: start,
            len: self.functab.len(),
        })?;
        FuncDescriptorView::new(bytes, layout)
    }

    /// CRC32 over every emitted table, in a fixed order.
    pub fn checksum(&self) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&self.code_size.to_le_bytes());
        hasher.update(&self.funcnametab);
        hasher.update(&self.filetab);
        hasher.update(&self.pctab);
        hasher.update(&self.funcdata);
        hasher.update(&self.functab);
        for entry in &self.ftab {
            hasher.update(&entry.entry_off.to_le_bytes());
            hasher.update(&entry.func_off.to_le_bytes());
        }
        hasher.finalize()
    }
}

/// Installs emitted metadata into the host runtime.
///
/// Implementations take ownership of the module data; the registration call
/// is the hand-off point after which the emitter keeps nothing.
pub trait Registrar {
    type Handle;
    type Error: std::error::Error;

    fn register(&mut self, module: ModuleData) -> Result<Self::Handle, Self::Error>;
}
