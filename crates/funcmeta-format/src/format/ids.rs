//! Small descriptor field types.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use super::ARGS_SIZE_UNKNOWN;

/// Category tag used by the host runtime's internal dispatch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct FuncId(u8);

impl FuncId {
    /// An ordinary function with no special runtime treatment.
    pub const NORMAL: Self = Self(0);

    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }
}

/// Descriptor flag bits.
///
/// Must match the host runtime's flag list bit for bit.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct FuncFlag(u8);

impl FuncFlag {
    pub const NONE: Self = Self(0);
    /// Function is the outermost frame of a call stack; unwinding stops here.
    pub const TOPFRAME: Self = Self(1 << 0);
    /// Function writes the stack pointer register directly.
    pub const SPWRITE: Self = Self(1 << 1);
    /// Function is hand-written machine code rather than compiler output.
    pub const ASM: Self = Self(1 << 2);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for FuncFlag {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for FuncFlag {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for FuncFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FuncFlag({self})")
    }
}

impl fmt::Display for FuncFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        let names = [
            (Self::TOPFRAME, "topframe"),
            (Self::SPWRITE, "spwrite"),
            (Self::ASM, "asm"),
        ];
        let mut first = true;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        let unknown = self.0 & !(Self::TOPFRAME | Self::SPWRITE | Self::ASM).0;
        if unknown != 0 {
            if !first {
                f.write_str("|")?;
            }
            write!(f, "{unknown:#04x}")?;
        }
        Ok(())
    }
}

/// Byte size of a function's incoming argument frame.
///
/// Stored raw so that malformed sizes coming from the generator survive until
/// validation reports them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ArgsSize(i32);

impl ArgsSize {
    /// Frame size is unknown or variable.
    pub const UNKNOWN: Self = Self(ARGS_SIZE_UNKNOWN);

    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// A known frame size. Sizes above `i32::MAX` cannot be represented and
    /// are mapped to a negative raw value, which validation rejects.
    pub const fn known(bytes: u32) -> Self {
        Self(bytes as i32)
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    pub const fn is_unknown(self) -> bool {
        self.0 == ARGS_SIZE_UNKNOWN
    }

    /// Non-negative sizes and the unknown sentinel are the only valid values.
    pub const fn is_valid(self) -> bool {
        self.0 >= 0 || self.is_unknown()
    }
}

impl Default for ArgsSize {
    fn default() -> Self {
        Self(0)
    }
}

impl fmt::Display for ArgsSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            f.write_str("?")
        } else {
            write!(f, "{}", self.0)
        }
    }
}
