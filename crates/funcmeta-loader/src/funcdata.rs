//! Auxiliary side-table blob writer.
//!
//! Every function writes its eight slots in slot order after a leading pad:
//!
//! ```text
//! start + 0     -> 0x00                 (leading pad)
//! start + 1     -> slot 0 blob, or 0x00 when absent
//! ...
//! ```
//!
//! Absent slots still occupy one zero byte but are recorded as
//! [`INVALID_FUNCDATA_OFFSET`]. A present slot whose blob serializes to zero
//! bytes also consumes one pad byte, so two present slots never share an
//! offset.

use funcmeta_format::{FuncdataSlot, INVALID_FUNCDATA_OFFSET, N_FUNCDATA, Pool};
use tracing::trace;

use crate::error::{EmitError, pool_offset};
use crate::func::Func;

/// Funcdata offsets for one batch, relative to `start`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FuncdataTable {
    pub start: usize,
    pub offsets: Vec<[u32; N_FUNCDATA]>,
}

/// Append every function's side-table blobs to `pool`.
///
/// Any serialization failure abandons the batch; the pool may then hold a
/// partial region and should be discarded.
pub fn write_funcdata(pool: &mut Pool, funcs: &[Func]) -> Result<FuncdataTable, EmitError> {
    let start = pool.push(0);
    let mut offsets = Vec::with_capacity(funcs.len());

    for (index, func) in funcs.iter().enumerate() {
        let mut offs = [INVALID_FUNCDATA_OFFSET; N_FUNCDATA];
        for slot in FuncdataSlot::ALL {
            let Some(data) = func.funcdata.get(slot) else {
                pool.push(0);
                continue;
            };
            let bytes = data.to_bytes().map_err(|source| EmitError::Marshal {
                index,
                name: func.name.clone(),
                slot,
                source,
            })?;
            let at = if bytes.is_empty() {
                pool.push(0)
            } else {
                pool.append(&bytes)
            };
            offs[slot.index()] = pool_offset("funcdata", at - start)?;
            trace!(
                func = %func.name,
                %slot,
                offset = at - start,
                len = bytes.len(),
                "funcdata blob"
            );
        }
        offsets.push(offs);
    }

    Ok(FuncdataTable { start, offsets })
}
