//! Test utilities: layouts, fixture batches and fake collaborators.

use funcmeta_format::{
    ArgsSize, FuncFlag, FuncLayout, FuncdataSlot, NativeFuncType, PcValue, PcdataKind,
};

use crate::{Batch, Config, Func, MarshalBinary, MarshalError, ModuleData, Registrar};

/// Snapshot test for the dump of an emitted batch.
#[macro_export]
macro_rules! shot_dump {
    ($batch:expr, @$snapshot:literal) => {{
        let module = $crate::test_utils::emit_native(&$batch);
        insta::assert_snapshot!($crate::dump(&module), @$snapshot);
    }};
}

pub fn native_layout() -> FuncLayout {
    FuncLayout::resolve(&NativeFuncType).unwrap()
}

/// Emit with the native layout and verification on.
pub fn emit_native(batch: &Batch) -> ModuleData {
    crate::emit(batch, &native_layout(), &Config::new().verify(true)).unwrap()
}

pub fn pcs(samples: &[(u32, i32)]) -> Vec<PcValue> {
    samples.iter().map(|&(pc, v)| PcValue::new(pc, v)).collect()
}

/// Two-function batch: a decoder with a frame and a pointer map, and a
/// frameless leaf behind it.
pub fn two_func_batch() -> Batch {
    let mut batch = Batch::new(0x80);
    let file = batch.file("jit/decoder.rs");
    batch.push(
        Func::new("decode_value", 0, 0x40)
            .with_args_size(ArgsSize::known(24))
            .with_source(file, 10)
            .with_pcdata(PcdataKind::Sp, pcs(&[(0, 0), (4, 16), (0x3c, 0)]))
            .with_pcdata(PcdataKind::Line, pcs(&[(0, 10), (0x10, 12)]))
            .with_funcdata(FuncdataSlot::ArgsPointerMaps, vec![1u8, 0, 0, 0, 3, 0, 0, 0, 0b101]),
    );
    batch.push(
        Func::new("skip_space", 0x40, 0x20)
            .with_flags(FuncFlag::ASM)
            .with_args_size(ArgsSize::UNKNOWN)
            .with_source(file, 40),
    );
    batch
}

/// Blob that serializes to fixed bytes.
#[derive(Debug)]
pub struct FixedBlob(pub Vec<u8>);

impl MarshalBinary for FixedBlob {
    fn marshal_binary(&self) -> Result<Vec<u8>, MarshalError> {
        Ok(self.0.clone())
    }
}

/// Blob whose serialization always fails.
#[derive(Debug)]
pub struct BrokenBlob;

impl MarshalBinary for BrokenBlob {
    fn marshal_binary(&self) -> Result<Vec<u8>, MarshalError> {
        Err(MarshalError::new("blob is not serializable"))
    }
}

/// Registrar that keeps every module it receives.
#[derive(Debug, Default)]
pub struct RecordingRegistrar {
    pub modules: Vec<ModuleData>,
    pub reject: bool,
}

#[derive(Debug, thiserror::Error)]
#[error("host rejected module")]
pub struct Rejected;

impl Registrar for RecordingRegistrar {
    type Handle = usize;
    type Error = Rejected;

    fn register(&mut self, module: ModuleData) -> Result<usize, Rejected> {
        if self.reject {
            return Err(Rejected);
        }
        self.modules.push(module);
        Ok(self.modules.len() - 1)
    }
}
