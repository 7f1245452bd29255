//! Per-function input records and the batch that carries them.

use std::fmt;

use funcmeta_format::{ArgsSize, FuncFlag, FuncId, FuncdataSlot, N_FUNCDATA, PcValue, PcdataKind};

use crate::error::MarshalError;
use crate::file_table::FileTableBuilder;
use crate::stackmap::StackMap;

/// Samples for one PC-indexed table, ordered by strictly increasing PC.
pub type Pcdata = Vec<PcValue>;

/// A blob that knows how to serialize itself into a funcdata slot.
pub trait MarshalBinary: fmt::Debug + Send + Sync {
    fn marshal_binary(&self) -> Result<Vec<u8>, MarshalError>;
}

/// Side-table payload for one funcdata slot.
#[derive(Debug)]
pub enum Funcdata {
    StackMap(StackMap),
    Bytes(Vec<u8>),
    Marshal(Box<dyn MarshalBinary>),
}

impl Funcdata {
    pub fn to_bytes(&self) -> Result<Vec<u8>, MarshalError> {
        match self {
            Self::StackMap(map) => map.to_bytes(),
            Self::Bytes(bytes) => Ok(bytes.clone()),
            Self::Marshal(blob) => blob.marshal_binary(),
        }
    }
}

impl From<StackMap> for Funcdata {
    fn from(map: StackMap) -> Self {
        Self::StackMap(map)
    }
}

impl From<Vec<u8>> for Funcdata {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// Optional table for every [`PcdataKind`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PcdataSet {
    tables: [Option<Pcdata>; PcdataKind::COUNT],
}

impl PcdataSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, kind: PcdataKind, samples: Pcdata) {
        self.tables[kind.index()] = Some(samples);
    }

    pub fn get(&self, kind: PcdataKind) -> Option<&Pcdata> {
        self.tables[kind.index()].as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.iter().all(Option::is_none)
    }
}

/// Optional blob for every [`FuncdataSlot`].
#[derive(Debug, Default)]
pub struct FuncdataSet {
    slots: [Option<Funcdata>; N_FUNCDATA],
}

impl FuncdataSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, slot: FuncdataSlot, data: Funcdata) {
        self.slots[slot.index()] = Some(data);
    }

    pub fn get(&self, slot: FuncdataSlot) -> Option<&Funcdata> {
        self.slots[slot.index()].as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

/// Everything the code generator knows about one emitted function.
#[derive(Debug)]
pub struct Func {
    pub id: FuncId,
    pub flags: FuncFlag,
    pub args_size: ArgsSize,
    /// Offset of the first instruction from the start of the code region.
    pub entry_off: u32,
    pub text_size: u32,
    /// Offset of the deferred-return trampoline from entry; 0 when absent.
    pub defer_return: u32,
    /// Index into the batch file table.
    pub file_index: u32,
    pub start_line: i32,
    pub name: String,
    pub pcdata: PcdataSet,
    pub funcdata: FuncdataSet,
}

impl Func {
    pub fn new(name: impl Into<String>, entry_off: u32, text_size: u32) -> Self {
        Self {
            id: FuncId::NORMAL,
            flags: FuncFlag::NONE,
            args_size: ArgsSize::default(),
            entry_off,
            text_size,
            defer_return: 0,
            file_index: 0,
            start_line: 0,
            name: name.into(),
            pcdata: PcdataSet::new(),
            funcdata: FuncdataSet::new(),
        }
    }

    pub fn with_id(mut self, id: FuncId) -> Self {
        self.id = id;
        self
    }

    pub fn with_flags(mut self, flags: FuncFlag) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_args_size(mut self, args_size: ArgsSize) -> Self {
        self.args_size = args_size;
        self
    }

    pub fn with_defer_return(mut self, offset: u32) -> Self {
        self.defer_return = offset;
        self
    }

    pub fn with_source(mut self, file_index: u32, start_line: i32) -> Self {
        self.file_index = file_index;
        self.start_line = start_line;
        self
    }

    pub fn with_pcdata(mut self, kind: PcdataKind, samples: Pcdata) -> Self {
        self.pcdata.set(kind, samples);
        self
    }

    pub fn with_funcdata(mut self, slot: FuncdataSlot, data: impl Into<Funcdata>) -> Self {
        self.funcdata.set(slot, data.into());
        self
    }

    /// One past the last byte of the function's text.
    pub fn end_off(&self) -> u64 {
        u64::from(self.entry_off) + u64::from(self.text_size)
    }
}

/// Functions emitted together into one contiguous code region.
///
/// Functions must be pushed in ascending entry order.
#[derive(Debug, Default)]
pub struct Batch {
    pub(crate) code_size: u32,
    pub(crate) files: FileTableBuilder,
    pub(crate) funcs: Vec<Func>,
}

impl Batch {
    pub fn new(code_size: u32) -> Self {
        Self {
            code_size,
            ..Self::default()
        }
    }

    /// Intern a source path, returning its file index.
    pub fn file(&mut self, path: &str) -> u32 {
        self.files.intern(path)
    }

    pub fn push(&mut self, func: Func) -> &mut Self {
        self.funcs.push(func);
        self
    }

    pub fn code_size(&self) -> u32 {
        self.code_size
    }

    pub fn funcs(&self) -> &[Func] {
        &self.funcs
    }

    pub fn files(&self) -> &FileTableBuilder {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }
}
