//! Layout introspection of the host's function descriptor type.
//!
//! The descriptor layout is private to the host runtime and may shift between
//! releases. Instead of hard-coding offsets, every field the descriptor
//! builder writes is looked up by name on a [`HostType`] handle. A missing or
//! reshaped field means this crate was built against a different host and the
//! embedder must not register any code.
//!
//! [`init`] resolves the layout once per process; the result is read-only
//! afterward.

mod host;


use std::fmt;
use std::sync::OnceLock;

pub use host::{NativeFuncType, RawFunc, StaticHostType};

use crate::format::{N_FUNCDATA, N_PCDATA};

/// Position and width of one field inside a host type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldInfo {
    pub offset: usize,
    pub size: usize,
}

impl FieldInfo {
    pub const fn new(offset: usize, size: usize) -> Self {
        Self { offset, size }
    }

    #[inline]
    pub const fn end(self) -> usize {
        self.offset + self.size
    }
}

/// Handle to a host type that can be asked for its field layout.
pub trait HostType {
    /// Name of the type, for diagnostics.
    fn type_name(&self) -> &str;

    /// Size of one instance in bytes.
    fn size(&self) -> usize;

    /// Layout of the field called `name`, if the type has one.
    fn field(&self, name: &str) -> Option<FieldInfo>;
}

/// Descriptor fields written by the builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FuncField {
    EntryOff,
    NameOff,
    Args,
    DeferReturn,
    Pcsp,
    Pcfile,
    Pcln,
    Npcdata,
    /// Base index into the file table.
    CuOffset,
    StartLine,
    FuncId,
    Flag,
    Nfuncdata,
}

impl FuncField {
    pub const COUNT: usize = 13;

    pub const ALL: [Self; Self::COUNT] = [
        Self::EntryOff,
        Self::NameOff,
        Self::Args,
        Self::DeferReturn,
        Self::Pcsp,
        Self::Pcfile,
        Self::Pcln,
        Self::Npcdata,
        Self::CuOffset,
        Self::StartLine,
        Self::FuncId,
        Self::Flag,
        Self::Nfuncdata,
    ];

    /// Field name as spelled by the host type.
    pub const fn host_name(self) -> &'static str {
        match self {
            Self::EntryOff => "entryOff",
            Self::NameOff => "nameOff",
            Self::Args => "args",
            Self::DeferReturn => "deferreturn",
            Self::Pcsp => "pcsp",
            Self::Pcfile => "pcfile",
            Self::Pcln => "pcln",
            Self::Npcdata => "npcdata",
            Self::CuOffset => "cuOffset",
            Self::StartLine => "startLine",
            Self::FuncId => "funcID",
            Self::Flag => "flag",
            Self::Nfuncdata => "nfuncdata",
        }
    }

    /// Width in bytes the builder writes for this field.
    pub const fn width(self) -> usize {
        match self {
            Self::FuncId | Self::Flag | Self::Nfuncdata => 1,
            _ => 4,
        }
    }

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for FuncField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.host_name())
    }
}

/// Layout mismatch between this crate and the host runtime.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("field {field} not found in struct {type_name}")]
    MissingField { type_name: String, field: &'static str },
    #[error("field {field} of {type_name} is {actual} bytes wide (expected {expected})")]
    FieldWidth {
        type_name: String,
        field: &'static str,
        actual: usize,
        expected: usize,
    },
    #[error("field {field} of {type_name} ends at {end}, past the type size {size}")]
    FieldOutOfBounds {
        type_name: String,
        field: &'static str,
        end: usize,
        size: usize,
    },
    #[error("fields {first} and {second} of {type_name} overlap")]
    FieldOverlap {
        type_name: String,
        first: &'static str,
        second: &'static str,
    },
    #[error("descriptor layout already initialized from {installed}, refusing {requested}")]
    Conflict { installed: String, requested: String },
}

/// Resolved byte offsets of every descriptor field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FuncLayout {
    type_name: String,
    size: usize,
    offsets: [usize; FuncField::COUNT],
}

impl FuncLayout {
    /// Look up every [`FuncField`] on `host`.
    pub fn resolve(host: &dyn HostType) -> Result<Self, LayoutError> {
        let type_name = host.type_name().to_string();
        let size = host.size();
        let mut infos = [FieldInfo::new(0, 0); FuncField::COUNT];

        for field in FuncField::ALL {
            let info = host
                .field(field.host_name())
                .ok_or_else(|| LayoutError::MissingField {
                    type_name: type_name.clone(),
                    field: field.host_name(),
                })?;
            if info.size != field.width() {
                return Err(LayoutError::FieldWidth {
                    type_name,
                    field: field.host_name(),
                    actual: info.size,
                    expected: field.width(),
                });
            }
            if info.offset.checked_add(info.size).is_none_or(|end| end > size) {
                return Err(LayoutError::FieldOutOfBounds {
                    type_name,
                    field: field.host_name(),
                    end: info.offset.saturating_add(info.size),
                    size,
                });
            }
            infos[field.index()] = info;
        }

        for (i, a) in FuncField::ALL.iter().enumerate() {
            for b in &FuncField::ALL[i + 1..] {
                let (x, y) = (infos[a.index()], infos[b.index()]);
                if x.offset < y.end() && y.offset < x.end() {
                    return Err(LayoutError::FieldOverlap {
                        type_name,
                        first: a.host_name(),
                        second: b.host_name(),
                    });
                }
            }
        }

        Ok(Self {
            type_name,
            size,
            offsets: infos.map(|info| info.offset),
        })
    }

    /// Name of the host type this layout was resolved from.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Byte offset of `field` inside the fixed descriptor header.
    #[inline]
    pub fn offset(&self, field: FuncField) -> usize {
        self.offsets[field.index()]
    }

    /// Size of the fixed descriptor header.
    pub fn header_size(&self) -> usize {
        self.size
    }

    /// Offset of the trailing pcdata array (4-byte aligned after the header).
    pub fn pcdata_offset(&self) -> usize {
        self.size.next_multiple_of(4)
    }

    /// Offset of the trailing funcdata array.
    pub fn funcdata_offset(&self) -> usize {
        self.pcdata_offset() + N_PCDATA * 4
    }

    /// Full record size: header, pcdata offsets and funcdata offsets.
    pub fn record_size(&self) -> usize {
        self.funcdata_offset() + N_FUNCDATA * 4
    }
}

static LAYOUT: OnceLock<FuncLayout> = OnceLock::new();

/// Resolve the descriptor layout from `host` and install it process-wide.
///
/// The first successful call wins. Later calls succeed only when `host`
/// resolves to the same layout. An error is fatal to the embedder: no code
/// may be registered against a layout this crate does not understand.
pub fn init(host: &dyn HostType) -> Result<&'static FuncLayout, LayoutError> {
    let resolved = FuncLayout::resolve(host)?;
    let installed = LAYOUT.get_or_init(|| resolved.clone());
    if *installed != resolved {
        return Err(LayoutError::Conflict {
            installed: installed.type_name.clone(),
            requested: resolved.type_name,
        });
    }
    Ok(installed)
}

/// The process-wide layout, if [`init`] has succeeded.
pub fn installed() -> Option<&'static FuncLayout> {
    LAYOUT.get()
}
