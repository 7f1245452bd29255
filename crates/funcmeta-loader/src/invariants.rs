//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use funcmeta_format::N_FUNCDATA;

use crate::funcdata::FuncdataTable;

impl FuncdataTable {
    pub(crate) fn ensure_func(&self, index: usize) -> [u32; N_FUNCDATA] {
        self.offsets.get(index).copied().unwrap_or_else(|| {
            panic!(
                "funcdata: no offsets for function {index} \
                 (write_funcdata must visit every function of the batch)"
            )
        })
    }
}

pub(crate) fn ensure_name_offset(offsets: &[i32], index: usize) -> i32 {
    offsets.get(index).copied().unwrap_or_else(|| {
        panic!(
            "names: no offset for function {index} \
             (every function name must be pushed exactly once)"
        )
    })
}

pub(crate) fn ensure_aligned(len: usize, align: u32) {
    assert!(
        len % align as usize == 0,
        "functab: record start {len} is not aligned to {align}"
    );
}
