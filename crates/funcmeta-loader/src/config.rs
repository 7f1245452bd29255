//! Emission configuration.

use funcmeta_format::{MIN_LC, PTR_SIZE};

/// Configuration for one batch emission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Instruction length quantum; PC deltas are stored in these units.
    pub(crate) pc_quantum: u32,
    /// Alignment of descriptor records inside the function table.
    pub(crate) ptr_size: u32,
    /// Decode every emitted structure back and compare before returning.
    pub(crate) verify: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pc_quantum: MIN_LC,
            ptr_size: PTR_SIZE,
            verify: cfg!(debug_assertions),
        }
    }
}

impl Config {
    /// Create a new Config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the PC quantum (minimum instruction length).
    pub fn pc_quantum(mut self, value: u32) -> Self {
        self.pc_quantum = value;
        self
    }

    /// Set the host pointer size used to align descriptor records.
    pub fn ptr_size(mut self, value: u32) -> Self {
        self.ptr_size = value;
        self
    }

    /// Set whether emitted tables are decoded back and cross-checked.
    pub fn verify(mut self, value: bool) -> Self {
        self.verify = value;
        self
    }

    pub fn get_pc_quantum(&self) -> u32 {
        self.pc_quantum
    }

    pub fn get_ptr_size(&self) -> u32 {
        self.ptr_size
    }

    pub fn get_verify(&self) -> bool {
        self.verify
    }

    /// Reject values the encoders cannot work with.
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.pc_quantum == 0 {
            return Err("pc quantum must be non-zero");
        }
        if !self.ptr_size.is_power_of_two() {
            return Err("pointer size must be a power of two");
        }
        Ok(())
    }
}
