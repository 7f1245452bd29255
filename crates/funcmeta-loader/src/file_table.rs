//! Source file table builder.

use indexmap::IndexSet;

use crate::error::{EmitError, pool_offset};

/// Deduplicating table of source paths, indexed in first-seen order.
#[derive(Clone, Debug, Default)]
pub struct FileTableBuilder {
    paths: IndexSet<String>,
}

impl FileTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a path, returning its file index.
    pub fn intern(&mut self, path: &str) -> u32 {
        if let Some(index) = self.paths.get_index_of(path) {
            return index as u32;
        }
        let (index, _) = self.paths.insert_full(path.to_string());
        index as u32
    }

    pub fn get(&self, index: u32) -> Option<&str> {
        self.paths.get_index(index as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Emit the NUL-terminated path pool and each file's offset into it.
    pub fn emit(&self) -> Result<(Vec<u8>, Vec<u32>), EmitError> {
        let mut pool = Vec::new();
        let mut offsets = Vec::with_capacity(self.paths.len());
        for path in &self.paths {
            offsets.push(pool_offset("file", pool.len())?);
            pool.extend_from_slice(path.as_bytes());
            pool.push(0);
        }
        Ok((pool, offsets))
    }
}
