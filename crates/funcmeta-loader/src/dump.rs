//! Human-readable rendering of emitted module data.

use std::fmt::Write as _;

use funcmeta_format::{FuncdataSlot, INVALID_FUNCDATA_OFFSET, PcdataKind};

use crate::module::ModuleData;

/// Render a module's sections and per-function metadata.
///
/// Absent tables and slots are left out. Values that fail to decode are
/// shown inline as `<error: ...>`.
pub fn dump(module: &ModuleData) -> String {
    let mut out = String::new();
    dump_header(&mut out, module);
    for index in 0..module.len() {
        out.push('\n');
        dump_func(&mut out, module, index);
    }
    out
}

fn dump_header(out: &mut String, module: &ModuleData) {
    writeln!(out, "[module]").unwrap();
    writeln!(out, "code_size = {:#x}", module.code_size()).unwrap();
    writeln!(out, "funcs = {}", module.len()).unwrap();
    writeln!(out, "funcnametab = {}", module.funcnametab().len()).unwrap();
    writeln!(out, "filetab = {}", module.filetab().len()).unwrap();
    writeln!(out, "pctab = {}", module.pctab().len()).unwrap();
    writeln!(out, "funcdata = {}", module.funcdata().len()).unwrap();
    writeln!(out, "functab = {}", module.functab().len()).unwrap();
}

fn dump_func(out: &mut String, module: &ModuleData, index: usize) {
    let desc = &module.descriptors()[index];
    let name = match module.name(index) {
        Ok(name) => name.to_string(),
        Err(e) => format!("<error: {e}>"),
    };

    writeln!(out, "[func {index}] {name}").unwrap();
    writeln!(out, "entry = {:#x}..{:#x}", desc.entry_off(), desc.end_off()).unwrap();
    writeln!(
        out,
        "args = {} flags = {} id = {}",
        desc.args_size(),
        desc.flags(),
        desc.id().get()
    )
    .unwrap();
    if desc.defer_return() != 0 {
        writeln!(out, "defer_return = {:#x}", desc.defer_return()).unwrap();
    }
    if !module.file_offsets().is_empty() {
        let file = match module.file(desc.file_index()) {
            Ok(path) => path.to_string(),
            Err(e) => format!("<error: {e}>"),
        };
        writeln!(out, "source = {file}:{}", desc.start_line()).unwrap();
    }

    for kind in PcdataKind::ALL {
        match module.pc_table(index, kind) {
            Ok(None) => {}
            Ok(Some(table)) => {
                let rendered = match table.decode() {
                    Ok(records) => records
                        .iter()
                        .map(|r| format!("{:#x}:{}", r.pc, r.value))
                        .collect::<Vec<_>>()
                        .join(" "),
                    Err(e) => format!("<error: {e}>"),
                };
                writeln!(out, "{kind} = [{rendered}]").unwrap();
            }
            Err(e) => writeln!(out, "{kind} = <error: {e}>").unwrap(),
        }
    }

    let offsets = desc.refs().funcdata;
    for slot in FuncdataSlot::ALL {
        let offset = offsets[slot.index()];
        if offset != INVALID_FUNCDATA_OFFSET {
            writeln!(out, "{slot} = @{offset}").unwrap();
        }
    }
}
