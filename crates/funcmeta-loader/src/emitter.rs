//! Single-pass batch emission.
//!
//! Every function is validated before anything is encoded, then the pools
//! are built in a fixed order: names, files, PC tables, funcdata and finally
//! the descriptor records that point into them.

use funcmeta_format::{
    FuncLayout, FuncdataSlot, INVALID_FUNCDATA_OFFSET, NameTableView, PcTableView, PcdataKind,
    Pool, func_name_parts,
};
use tracing::{debug, warn};

use crate::config::Config;
use crate::descriptor::{DescriptorBuilder, DescriptorRefs};
use crate::error::{EmitError, pool_offset};
use crate::func::{Batch, Func};
use crate::funcdata::write_funcdata;
use crate::invariants::{ensure_aligned, ensure_name_offset};
use crate::module::{FuncTabEntry, ModuleData, Registrar};
use crate::name_table::NameTableBuilder;
use crate::pctab::PcTabBuilder;

/// Encode a batch into module data.
///
/// Either every structure is produced or none is: on error nothing is
/// returned and nothing may be registered.
pub fn emit(batch: &Batch, layout: &FuncLayout, config: &Config) -> Result<ModuleData, EmitError> {
    config.validate().map_err(EmitError::InvalidConfig)?;
    let funcs = batch.funcs();
    if batch.code_size() == 0 {
        return Err(EmitError::EmptyCodeRegion);
    }
    if funcs.len() > i32::MAX as usize {
        return Err(EmitError::TooManyFuncs(funcs.len()));
    }

    let descriptors = DescriptorBuilder::new(layout, batch.code_size());
    validate_funcs(batch, &descriptors)?;

    debug!(
        funcs = funcs.len(),
        files = batch.files().len(),
        code_size = batch.code_size(),
        layout = layout.type_name(),
        "emitting function metadata"
    );

    let mut names = NameTableBuilder::new();
    for func in funcs {
        names.push(&func.name);
    }
    names.validate()?;
    let (funcnametab, name_offsets) = names.emit();

    let (filetab, file_offsets) = batch.files().emit()?;

    let mut pctab = PcTabBuilder::new(config.get_pc_quantum());
    let mut pc_offsets = Vec::with_capacity(funcs.len());
    for (index, func) in funcs.iter().enumerate() {
        pc_offsets.push(emit_pc_tables(&mut pctab, index, func)?);
    }
    let pctab = pctab.finish();

    let mut funcdata_pool = Pool::new();
    let funcdata = write_funcdata(&mut funcdata_pool, funcs)?;

    let align = config.get_ptr_size();
    let mut functab = Vec::new();
    let mut ftab = Vec::with_capacity(funcs.len() + 1);
    let mut records = Vec::with_capacity(funcs.len());
    for (index, func) in funcs.iter().enumerate() {
        let pc: &[u32; PcdataKind::COUNT] = &pc_offsets[index];
        let refs = DescriptorRefs {
            name_off: ensure_name_offset(&name_offsets, index),
            pcsp: pc[PcdataKind::Sp.index()],
            pcfile: pc[PcdataKind::File.index()],
            pcln: pc[PcdataKind::Line.index()],
            pcdata: PcdataKind::TRAILING.map(|kind| pc[kind.index()]),
            funcdata: funcdata.ensure_func(index),
        };
        let record = descriptors.build(index, func, refs)?;

        functab.resize(functab.len().next_multiple_of(align as usize), 0);
        ensure_aligned(functab.len(), align);
        let func_off = pool_offset("functab", functab.len())?;
        functab.extend_from_slice(record.as_bytes());

        ftab.push(FuncTabEntry {
            entry_off: func.entry_off,
            func_off,
        });
        records.push(record);
    }
    if let Some(last) = records.last() {
        ftab.push(FuncTabEntry {
            entry_off: last.end_off(),
            func_off: 0,
        });
    }

    let module = ModuleData {
        code_size: batch.code_size(),
        pc_quantum: config.get_pc_quantum(),
        funcnametab,
        name_offsets,
        filetab,
        file_offsets,
        pctab,
        funcdata: funcdata_pool.into_bytes(),
        funcdata_offsets: funcdata.offsets,
        descriptors: records,
        functab,
        ftab,
    };

    if config.get_verify() {
        verify(&module, batch, layout)?;
    }

    debug!(
        names = module.funcnametab.len(),
        pctab = module.pctab.len(),
        funcdata = module.funcdata.len(),
        functab = module.functab.len(),
        "function metadata ready"
    );
    Ok(module)
}

fn validate_funcs(batch: &Batch, descriptors: &DescriptorBuilder<'_>) -> Result<(), EmitError> {
    let files = batch.files().len();
    let mut prev: Option<&Func> = None;

    for (index, func) in batch.funcs().iter().enumerate() {
        if func.name.contains('\0') {
            return Err(EmitError::InvalidName {
                index,
                name: func.name.clone(),
            });
        }
        descriptors.validate(index, func)?;

        if files > 0 && func.file_index as usize >= files {
            return Err(EmitError::FileIndexOutOfRange {
                index,
                name: func.name.clone(),
                file_index: func.file_index,
                count: files,
            });
        }

        if let Some(prev) = prev {
            if func.entry_off < prev.entry_off {
                return Err(EmitError::Unsorted {
                    index,
                    name: func.name.clone(),
                    entry_off: func.entry_off,
                    prev: prev.entry_off,
                });
            }
            if u64::from(func.entry_off) < prev.end_off() {
                return Err(EmitError::Overlap {
                    index,
                    name: func.name.clone(),
                    entry_off: func.entry_off,
                    prev_end: prev.entry_off + prev.text_size,
                });
            }
        }
        prev = Some(func);
    }
    Ok(())
}

fn emit_pc_tables(
    pctab: &mut PcTabBuilder,
    index: usize,
    func: &Func,
) -> Result<[u32; PcdataKind::COUNT], EmitError> {
    let mut offsets = [0u32; PcdataKind::COUNT];
    for kind in PcdataKind::ALL {
        let samples = func.pcdata.get(kind).map(Vec::as_slice);
        let offset = pctab
            .push(samples, func.text_size)
            .map_err(|source| EmitError::PcTable {
                index,
                name: func.name.clone(),
                kind,
                source,
            })?;
        offsets[kind.index()] = pool_offset("pctab", offset)?;
    }
    Ok(offsets)
}

/// Decode the emitted module and compare it with the batch it came from.
pub(crate) fn verify(
    module: &ModuleData,
    batch: &Batch,
    layout: &FuncLayout,
) -> Result<(), EmitError> {
    for (index, func) in batch.funcs().iter().enumerate() {
        verify_func(module, layout, index, func).map_err(|detail| {
            warn!(index, func = %func.name, %detail, "emitted metadata does not decode back");
            EmitError::VerifyMismatch { index, detail }
        })?;
    }
    Ok(())
}

fn verify_func(
    module: &ModuleData,
    layout: &FuncLayout,
    index: usize,
    func: &Func,
) -> Result<(), String> {
    let record = &module.descriptors[index];
    let view = module
        .descriptor_view(index, layout)
        .map_err(|e| format!("descriptor: {e}"))?;

    if view.entry_off() != func.entry_off {
        return Err(format!("entry offset {:#x} != {:#x}", view.entry_off(), func.entry_off));
    }
    if view.args_size() != func.args_size {
        return Err(format!("args size {} != {}", view.args_size(), func.args_size));
    }
    if view.flags() != func.flags || view.func_id() != func.id {
        return Err("flags or func id differ".to_string());
    }
    if view.defer_return() != func.defer_return
        || view.file_index() != func.file_index
        || view.start_line() != func.start_line
    {
        return Err("defer return, file index or start line differ".to_string());
    }

    let (prefix, marker, suffix) = func_name_parts(&func.name);
    let expected = format!("{prefix}{marker}{suffix}");
    let stored = NameTableView::new(&module.funcnametab)
        .get(view.name_off())
        .map_err(|e| format!("name: {e}"))?;
    if stored != expected {
        return Err(format!("name {stored:?} != {expected:?}"));
    }

    for kind in PcdataKind::ALL {
        let offset = view.pcdata(kind);
        let table = PcTableView::in_pool(&module.pctab, offset, module.pc_quantum)
            .map_err(|e| format!("{kind}: {e}"))?;
        match (func.pcdata.get(kind), table) {
            (None, None) => {}
            (Some(samples), Some(table)) => {
                for sample in samples {
                    let got = table.lookup(sample.pc).map_err(|e| format!("{kind}: {e}"))?;
                    if got != Some(sample.value) {
                        return Err(format!(
                            "{kind} at pc {:#x}: {got:?} != {}",
                            sample.pc, sample.value
                        ));
                    }
                }
            }
            (Some(_), None) => return Err(format!("{kind} table missing")),
            (None, Some(_)) => return Err(format!("unexpected {kind} table")),
        }
    }

    for slot in FuncdataSlot::ALL {
        let offset = view.funcdata(slot);
        if offset != record.refs().funcdata[slot.index()] {
            return Err(format!("{slot} offset {offset} not written back"));
        }
        let present = func.funcdata.get(slot).is_some();
        let valid = offset != INVALID_FUNCDATA_OFFSET;
        if present != valid {
            return Err(format!("{slot} presence does not match offset {offset}"));
        }
        if valid && offset as usize >= module.funcdata.len() {
            return Err(format!("{slot} offset {offset} outside pool"));
        }
    }
    Ok(())
}

/// Error from [`register`].
#[derive(Debug, thiserror::Error)]
pub enum RegisterError<E: std::error::Error + 'static> {
    #[error(transparent)]
    Emit(#[from] EmitError),
    #[error("registration failed: {0}")]
    Install(#[source] E),
}

/// Emit a batch and hand the result to `registrar`.
///
/// Nothing reaches the registrar unless emission succeeds completely.
pub fn register<R>(
    registrar: &mut R,
    batch: &Batch,
    layout: &FuncLayout,
    config: &Config,
) -> Result<R::Handle, RegisterError<R::Error>>
where
    R: Registrar,
    R::Error: 'static,
{
    let module = emit(batch, layout, config)?;
    let funcs = module.len();
    let checksum = module.checksum();
    let handle = registrar.register(module).map_err(RegisterError::Install)?;
    debug!(funcs, checksum, "function metadata registered");
    Ok(handle)
}
