//! Function name pool builder.
//!
//! Names are stored in registration order, NUL-terminated, with generic
//! instantiation lists collapsed to a fixed marker. Offset 0 holds a lone
//! NUL, so a zero name offset reads as "no name".

use funcmeta_format::{Pool, func_name_parts};

use crate::error::EmitError;

/// Builds the function name pool.
#[derive(Debug)]
pub struct NameTableBuilder {
    pool: Pool,
    offsets: Vec<usize>,
    invalid: Option<(usize, String)>,
}

impl Default for NameTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NameTableBuilder {
    pub fn new() -> Self {
        Self {
            pool: Pool::with_reserved_zero(),
            offsets: Vec::new(),
            invalid: None,
        }
    }

    /// Encode a whole name list in one go.
    pub fn encode<I, S>(names: I) -> Result<(Vec<u8>, Vec<i32>), EmitError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = Self::new();
        for name in names {
            builder.push(name.as_ref());
        }
        builder.validate()?;
        Ok(builder.emit())
    }

    /// Append a name, returning its pool offset.
    ///
    /// Duplicate names get separate entries; every function owns its offset.
    pub fn push(&mut self, name: &str) -> usize {
        if self.invalid.is_none() && name.contains('\0') {
            self.invalid = Some((self.offsets.len(), name.to_string()));
        }
        let (prefix, marker, suffix) = func_name_parts(name);
        let offset = self.pool.append(prefix.as_bytes());
        self.pool.append(marker.as_bytes());
        self.pool.append(suffix.as_bytes());
        self.pool.push(0);
        self.offsets.push(offset);
        offset
    }

    /// Number of names pushed.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Validate that every name survives NUL termination and every offset
    /// fits the descriptor's signed 32-bit field.
    pub fn validate(&self) -> Result<(), EmitError> {
        if let Some((index, name)) = &self.invalid {
            return Err(EmitError::InvalidName {
                index: *index,
                name: name.clone(),
            });
        }
        if self.pool.len() > i32::MAX as usize {
            return Err(EmitError::PoolOverflow {
                pool: "name",
                len: self.pool.len(),
            });
        }
        Ok(())
    }

    /// Emit the pool and the per-name offsets.
    ///
    /// Call [`validate`](Self::validate) first.
    pub fn emit(self) -> (Vec<u8>, Vec<i32>) {
        let offsets = self.offsets.iter().map(|&off| off as i32).collect();
        (self.pool.into_bytes(), offsets)
    }
}
