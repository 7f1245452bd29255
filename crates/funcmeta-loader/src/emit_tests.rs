use funcmeta_format::{
    ArgsSize, FuncField, FuncFlag, FuncdataSlot, INVALID_FUNCDATA_OFFSET, N_FUNCDATA,
    NameTableView, PcdataKind, StackMapView,
};
use indoc::indoc;
use proptest::prelude::*;

use crate::test_utils::{
    BrokenBlob, RecordingRegistrar, emit_native, native_layout, pcs, two_func_batch,
};
use crate::emitter::verify;
use crate::{
    Batch, Config, EmitError, Func, FuncTabEntry, Funcdata, PcTableError, RegisterError,
    StackMapBuilder, emit, register,
};

fn emit_err(batch: &Batch) -> EmitError {
    emit(batch, &native_layout(), &Config::new().verify(true)).unwrap_err()
}

#[test]
fn two_function_batch() {
    let module = emit_native(&two_func_batch());

    assert_eq!(module.len(), 2);
    assert_eq!(module.name(0).unwrap(), "decode_value");
    assert_eq!(module.name(1).unwrap(), "skip_space");
    assert_eq!(module.name_offsets(), [1, 14]);
    assert_eq!(module.file(0).unwrap(), "jit/decoder.rs");

    assert_eq!(
        module.ftab(),
        [
            FuncTabEntry { entry_off: 0, func_off: 0 },
            FuncTabEntry { entry_off: 0x40, func_off: 96 },
            FuncTabEntry { entry_off: 0x60, func_off: 0 },
        ]
    );
    assert_eq!(module.functab().len(), 96 + 92);

    let sp = module.pc_table(0, PcdataKind::Sp).unwrap().unwrap();
    assert_eq!(sp.lookup(0).unwrap(), Some(0));
    assert_eq!(sp.lookup(8).unwrap(), Some(16));
    assert_eq!(sp.lookup(0x3f).unwrap(), Some(0));
    assert!(module.pc_table(0, PcdataKind::File).unwrap().is_none());
    assert!(module.pc_table(1, PcdataKind::Sp).unwrap().is_none());

    let layout = native_layout();
    let leaf = module.descriptor_view(1, &layout).unwrap();
    assert_eq!(leaf.entry_off(), 0x40);
    assert!(leaf.args_size().is_unknown());
    assert_eq!(leaf.flags(), FuncFlag::ASM);
    assert_eq!(leaf.start_line(), 40);
}

#[test]
fn pointer_map_blob_is_reachable_from_descriptor() {
    let module = emit_native(&two_func_batch());
    let layout = native_layout();

    let view = module.descriptor_view(0, &layout).unwrap();
    let offset = view.funcdata(FuncdataSlot::ArgsPointerMaps) as usize;
    let maps = StackMapView::new(&module.funcdata()[offset..]).unwrap();

    assert_eq!(maps.len(), 1);
    assert_eq!(maps.nbit(), 3);
    assert!(maps.is_pointer(0, 0));
    assert!(!maps.is_pointer(0, 1));
    assert!(maps.is_pointer(0, 2));
}

#[test]
fn missing_stack_objects_use_sentinel() {
    let mut batch = Batch::new(0x30);
    for (i, with_objects) in [true, false, true].into_iter().enumerate() {
        let mut func = Func::new(format!("f{i}"), i as u32 * 0x10, 0x10);
        if with_objects {
            func = func.with_funcdata(FuncdataSlot::StackObjects, vec![i as u8; 4]);
        }
        batch.push(func);
    }

    let module = emit_native(&batch);
    let slot = FuncdataSlot::StackObjects.index();
    let offsets = module.funcdata_offsets();

    assert_eq!(offsets[1][slot], INVALID_FUNCDATA_OFFSET);
    assert_ne!(offsets[0][slot], INVALID_FUNCDATA_OFFSET);
    assert!(offsets[0][slot] < offsets[2][slot]);
    assert!((offsets[2][slot] as usize) < module.funcdata().len());
}

#[test]
fn function_without_tables_or_blobs() {
    let mut batch = Batch::new(8);
    batch.push(Func::new("bare", 0, 8));

    let module = emit_native(&batch);
    let refs = module.descriptors()[0].refs();

    assert_eq!((refs.pcsp, refs.pcfile, refs.pcln), (0, 0, 0));
    assert_eq!(refs.pcdata, [0; 4]);
    assert_eq!(refs.funcdata, [INVALID_FUNCDATA_OFFSET; N_FUNCDATA]);
    assert_eq!(module.pctab(), [0]);
    assert_eq!(module.funcdata(), [0; 1 + N_FUNCDATA]);
    for kind in PcdataKind::ALL {
        assert!(module.pc_table(0, kind).unwrap().is_none());
    }
}

#[test]
fn empty_batch() {
    let module = emit_native(&Batch::new(16));

    assert!(module.is_empty());
    assert!(module.ftab().is_empty());
    assert!(module.functab().is_empty());
    assert_eq!(module.funcnametab(), [0]);
}

#[test]
fn emission_is_deterministic() {
    let first = emit_native(&two_func_batch());
    let second = emit_native(&two_func_batch());

    assert_eq!(first, second);
    assert_eq!(first.checksum(), second.checksum());
}

#[test]
fn checksum_tracks_content() {
    let base = emit_native(&two_func_batch());

    let mut batch = two_func_batch();
    batch.funcs[1].start_line = 41;
    let changed = emit_native(&batch);

    assert_ne!(base.checksum(), changed.checksum());
}

#[test]
fn records_follow_pointer_size() {
    let config = Config::new().ptr_size(4).verify(true);
    let module = emit(&two_func_batch(), &native_layout(), &config).unwrap();

    assert_eq!(module.ftab()[1].func_off, 92);
    assert_eq!(module.functab().len(), 184);
}

#[test]
fn pc_quantum_applies_to_all_tables() {
    let mut batch = Batch::new(0x20);
    batch.push(Func::new("q", 0, 0x20).with_pcdata(PcdataKind::Sp, pcs(&[(0, 0), (8, 8)])));

    let config = Config::new().pc_quantum(4).verify(true);
    let module = emit(&batch, &native_layout(), &config).unwrap();
    let sp = module.pc_table(0, PcdataKind::Sp).unwrap().unwrap();
    assert_eq!(sp.decode().unwrap(), pcs(&[(0, 0), (8, 8)]));

    let mut batch = Batch::new(0x20);
    batch.push(Func::new("q", 0, 0x20).with_pcdata(PcdataKind::Sp, pcs(&[(0, 0), (6, 8)])));
    let err = emit(&batch, &native_layout(), &config).unwrap_err();
    assert!(matches!(
        err,
        EmitError::PcTable {
            index: 0,
            kind: PcdataKind::Sp,
            source: PcTableError::Misaligned { pc: 6, quantum: 4 },
            ..
        }
    ));
}

#[test]
fn rejects_unsorted_functions() {
    let mut batch = Batch::new(0x40);
    batch.push(Func::new("b", 0x20, 0x10));
    batch.push(Func::new("a", 0, 0x10));

    assert!(matches!(
        emit_err(&batch),
        EmitError::Unsorted { index: 1, entry_off: 0, prev: 0x20, .. }
    ));
}

#[test]
fn rejects_overlapping_functions() {
    let mut batch = Batch::new(0x40);
    batch.push(Func::new("a", 0, 0x18));
    batch.push(Func::new("b", 0x10, 0x10));

    let err = emit_err(&batch);
    assert_eq!(
        err,
        EmitError::Overlap {
            index: 1,
            name: "b".to_string(),
            entry_off: 0x10,
            prev_end: 0x18,
        }
    );
    assert_eq!(
        err.to_string(),
        "function 1 (b) at 0x10 overlaps previous function ending at 0x18"
    );
}

#[test]
fn rejects_unknown_file_index() {
    let mut batch = Batch::new(0x10);
    batch.file("only.rs");
    batch.push(Func::new("f", 0, 0x10).with_source(1, 1));

    assert!(matches!(
        emit_err(&batch),
        EmitError::FileIndexOutOfRange { file_index: 1, count: 1, .. }
    ));
}

#[test]
fn rejects_empty_code_region_and_bad_config() {
    assert_eq!(emit_err(&Batch::new(0)), EmitError::EmptyCodeRegion);

    let err = emit(&Batch::new(8), &native_layout(), &Config::new().ptr_size(3)).unwrap_err();
    assert!(matches!(err, EmitError::InvalidConfig(_)));
}

#[test]
fn pc_table_error_names_the_table() {
    let mut batch = Batch::new(0x20);
    batch.push(Func::new("ok", 0, 0x10));
    batch.push(Func::new("late", 0x10, 0x10).with_pcdata(PcdataKind::Line, pcs(&[(0x10, 3)])));

    let err = emit_err(&batch);
    assert_eq!(
        err.to_string(),
        "function 1 (late): pcln table: pc 0x10 outside function text of 0x10 bytes"
    );
}

#[test]
fn marshal_error_aborts_batch() {
    let mut batch = Batch::new(0x10);
    batch.push(
        Func::new("f", 0, 0x10)
            .with_funcdata(FuncdataSlot::ArgInfo, Funcdata::Marshal(Box::new(BrokenBlob))),
    );

    assert!(matches!(
        emit_err(&batch),
        EmitError::Marshal { index: 0, slot: FuncdataSlot::ArgInfo, .. }
    ));
}

#[test]
fn rejects_name_with_nul_before_encoding() {
    let mut batch = Batch::new(0x20);
    batch.push(Func::new("decode\0Value", 0, 0x10));

    let err = emit(&batch, &native_layout(), &Config::new().verify(false)).unwrap_err();

    assert_eq!(
        err,
        EmitError::InvalidName {
            index: 0,
            name: "decode\0Value".to_string(),
        }
    );
    assert_eq!(err.to_string(), r#"function 0 ("decode\0Value"): name contains a NUL byte"#);
}

#[test]
fn verify_detects_corrupted_args() {
    let batch = two_func_batch();
    let layout = native_layout();
    let mut module = emit(&batch, &layout, &Config::new().verify(false)).unwrap();
    verify(&module, &batch, &layout).unwrap();

    let func_off = module.ftab()[1].func_off as usize;
    module.functab[func_off + layout.offset(FuncField::Args)] ^= 1;

    match verify(&module, &batch, &layout).unwrap_err() {
        EmitError::VerifyMismatch { index, detail } => {
            assert_eq!(index, 1);
            assert!(detail.starts_with("args size"), "{detail}");
        }
        other => panic!("expected a verification mismatch, got {other:?}"),
    }
}

#[test]
fn verify_detects_dropped_funcdata_offset() {
    let batch = two_func_batch();
    let layout = native_layout();
    let mut module = emit(&batch, &layout, &Config::new().verify(false)).unwrap();

    let at = layout.funcdata_offset() + FuncdataSlot::ArgsPointerMaps.index() * 4;
    module.functab[at..at + 4].copy_from_slice(&INVALID_FUNCDATA_OFFSET.to_le_bytes());

    let err = verify(&module, &batch, &layout).unwrap_err();
    assert!(matches!(err, EmitError::VerifyMismatch { index: 0, .. }), "{err:?}");
}

#[test]
fn register_hands_module_to_registrar() {
    let mut registrar = RecordingRegistrar::default();
    let layout = native_layout();

    let handle = register(&mut registrar, &two_func_batch(), &layout, &Config::new()).unwrap();

    assert_eq!(handle, 0);
    assert_eq!(registrar.modules.len(), 1);
    assert_eq!(registrar.modules[0], emit_native(&two_func_batch()));
}

#[test]
fn failed_emission_never_reaches_registrar() {
    let mut registrar = RecordingRegistrar::default();
    let layout = native_layout();
    let mut batch = Batch::new(0x10);
    batch.push(Func::new("bad", 0, 0x10).with_args_size(ArgsSize::from_raw(-4)));

    let err = register(&mut registrar, &batch, &layout, &Config::new()).unwrap_err();

    assert!(matches!(err, RegisterError::Emit(EmitError::InvalidArgsSize { value: -4, .. })));
    assert!(registrar.modules.is_empty());
}

#[test]
fn registrar_rejection_is_reported() {
    let mut registrar = RecordingRegistrar {
        reject: true,
        ..Default::default()
    };

    let err = register(&mut registrar, &two_func_batch(), &native_layout(), &Config::new())
        .unwrap_err();

    assert!(matches!(err, RegisterError::Install(_)));
    assert_eq!(err.to_string(), "registration failed: host rejected module");
}

#[test]
fn error_messages() {
    let mut batch = Batch::new(0x10);
    batch.push(Func::new("big", 0x8, 0x10));

    let err = emit_err(&batch);
    let expected = indoc! {"
        function 0 (big): text 0x8+0x10 exceeds code region of 0x10 bytes
    "};
    assert_eq!(format!("{err}\n"), expected);
}

fn batch_strategy() -> impl Strategy<Value = Vec<(u32, u32, Vec<(u32, i32)>, bool)>> {
    let func = (
        0u32..4,
        1u32..64,
        prop::collection::btree_map(0u32..64, -64i32..64, 0..8),
        any::<bool>(),
    )
        .prop_map(|(gap, size, samples, blob)| {
            let samples = samples.into_iter().filter(|&(pc, _)| pc < size).collect();
            (gap, size, samples, blob)
        });
    prop::collection::vec(func, 0..12)
}

proptest! {
    #[test]
    fn random_batches_emit_and_decode(funcs in batch_strategy()) {
        let mut batch = Batch::new(0x1000);
        let mut entry = 0;
        for (i, (gap, size, samples, blob)) in funcs.iter().enumerate() {
            entry += gap;
            let mut func = Func::new(format!("f{i}[T]"), entry, *size)
                .with_pcdata(PcdataKind::Sp, pcs(samples));
            if *blob {
                let mut map = StackMapBuilder::new();
                map.add_fields(i, true);
                func = func.with_funcdata(FuncdataSlot::LocalsPointerMaps, map.build());
            }
            batch.push(func);
            entry += size;
        }

        let module = emit_native(&batch);
        let names = NameTableView::new(module.funcnametab());

        prop_assert_eq!(module.len(), funcs.len());
        for (i, offsets) in module.funcdata_offsets().iter().enumerate() {
            prop_assert_eq!(names.get(module.name_offsets()[i]).unwrap(), format!("f{i}[...]"));
            for &offset in offsets {
                prop_assert!(
                    offset == INVALID_FUNCDATA_OFFSET || (offset as usize) < module.funcdata().len()
                );
            }
            let sp = module.pc_table(i, PcdataKind::Sp).unwrap().unwrap();
            for &(pc, value) in &funcs[i].2 {
                prop_assert_eq!(sp.lookup(pc).unwrap(), Some(value));
            }
        }
    }
}
