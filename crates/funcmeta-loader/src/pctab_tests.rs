use funcmeta_format::PcTableView;
use proptest::prelude::*;

use super::pctab::{PcTabBuilder, encode_pcdata};
use crate::PcTableError;
use crate::test_utils::pcs;

#[test]
fn encodes_steps_and_deltas() {
    let bytes = encode_pcdata(&pcs(&[(0, 0), (4, 16), (0x3c, 0)]), 0x40, 1).unwrap();

    assert_eq!(bytes, [1, 0, 4, 32, 56, 31, 0]);
}

#[test]
fn unchanged_values_add_no_record() {
    let bytes = encode_pcdata(&pcs(&[(0, 5), (4, 5), (8, 7)]), 16, 1).unwrap();

    assert_eq!(bytes, [1, 10, 8, 4, 0]);
    let decoded = PcTableView::new(&bytes, 1).decode().unwrap();
    assert_eq!(decoded, pcs(&[(0, 5), (8, 7)]));
}

#[test]
fn first_sample_always_recorded() {
    let bytes = encode_pcdata(&pcs(&[(0, 0)]), 4, 1).unwrap();

    assert_eq!(bytes, [1, 0, 0]);
    assert_eq!(PcTableView::new(&bytes, 1).lookup(0).unwrap(), Some(0));
}

#[test]
fn steps_are_counted_in_quantum_units() {
    let bytes = encode_pcdata(&pcs(&[(0, 1), (8, 2)]), 16, 4).unwrap();

    assert_eq!(bytes, [1, 2, 2, 2, 0]);
    let decoded = PcTableView::new(&bytes, 4).decode().unwrap();
    assert_eq!(decoded, pcs(&[(0, 1), (8, 2)]));
}

#[test]
fn empty_table_is_just_the_terminator() {
    assert_eq!(encode_pcdata(&[], 16, 1).unwrap(), [0]);
}

#[test]
fn rejects_unordered_samples() {
    let err = encode_pcdata(&pcs(&[(4, 0), (4, 1)]), 16, 1).unwrap_err();
    assert_eq!(err, PcTableError::Unordered { prev: 4, pc: 4 });

    let err = encode_pcdata(&pcs(&[(8, 0), (4, 1)]), 16, 1).unwrap_err();
    assert_eq!(err, PcTableError::Unordered { prev: 8, pc: 4 });
}

#[test]
fn rejects_pc_outside_text() {
    let err = encode_pcdata(&pcs(&[(0, 0), (16, 1)]), 16, 1).unwrap_err();

    assert_eq!(err, PcTableError::OutOfRange { pc: 16, limit: 16 });
    assert_eq!(err.to_string(), "pc 0x10 outside function text of 0x10 bytes");
}

#[test]
fn rejects_misaligned_pc() {
    let err = encode_pcdata(&pcs(&[(0, 0), (6, 1)]), 16, 4).unwrap_err();

    assert_eq!(err, PcTableError::Misaligned { pc: 6, quantum: 4 });
}

#[test]
fn builder_reserves_offset_zero() {
    let mut builder = PcTabBuilder::new(1);
    assert!(builder.is_empty());

    assert_eq!(builder.push(None, 16).unwrap(), 0);
    let first = builder.push(Some(&pcs(&[(0, 3)])), 16).unwrap();
    let second = builder.push(Some(&pcs(&[(0, 3)])), 16).unwrap();

    assert_eq!(first, 1);
    assert_eq!(second, 4);
    assert_eq!(builder.finish(), [0, 1, 6, 0, 1, 6, 0]);
}

#[test]
fn failed_table_leaves_pool_untouched() {
    let mut builder = PcTabBuilder::new(1);
    builder.push(Some(&pcs(&[(0, 1)])), 8).unwrap();
    let before = builder.len();

    let err = builder.push(Some(&pcs(&[(0, 1), (8, 2)])), 8).unwrap_err();

    assert!(matches!(err, PcTableError::OutOfRange { pc: 8, .. }));
    assert_eq!(builder.len(), before);
}

#[test]
fn builder_tables_decode_in_pool() {
    let mut builder = PcTabBuilder::new(1);
    let a = builder.push(Some(&pcs(&[(0, -8), (2, 8)])), 4).unwrap() as u32;
    let b = builder.push(Some(&pcs(&[(1, 100)])), 4).unwrap() as u32;
    let pool = builder.finish();

    let ta = PcTableView::in_pool(&pool, a, 1).unwrap().unwrap();
    let tb = PcTableView::in_pool(&pool, b, 1).unwrap().unwrap();
    assert_eq!(ta.decode().unwrap(), pcs(&[(0, -8), (2, 8)]));
    assert_eq!(tb.decode().unwrap(), pcs(&[(1, 100)]));
    assert_eq!(tb.lookup(0).unwrap(), None);
    assert!(PcTableView::in_pool(&pool, 0, 1).unwrap().is_none());
}

fn samples_strategy() -> impl Strategy<Value = Vec<(u32, i32)>> {
    prop::collection::btree_map(0u32..1024, any::<i32>(), 0..48)
        .prop_map(|map| map.into_iter().collect())
}

proptest! {
    #[test]
    fn lookup_returns_last_sample_at_or_before(samples in samples_strategy(), probe in 0u32..1024) {
        let samples = pcs(&samples);
        let bytes = encode_pcdata(&samples, 1024, 1).unwrap();
        let table = PcTableView::new(&bytes, 1);

        for sample in &samples {
            prop_assert_eq!(table.lookup(sample.pc).unwrap(), Some(sample.value));
        }
        let expected = samples.iter().rev().find(|s| s.pc <= probe).map(|s| s.value);
        prop_assert_eq!(table.lookup(probe).unwrap(), expected);
        prop_assert_eq!(table.encoded_len().unwrap(), bytes.len());
    }

    #[test]
    fn quantum_scaling_preserves_values(samples in samples_strategy(), shift in 0u32..3) {
        let quantum = 1u32 << shift;
        let scaled: Vec<_> = samples.iter().map(|&(pc, v)| (pc * quantum, v)).collect();
        let scaled = pcs(&scaled);
        let bytes = encode_pcdata(&scaled, 1024 * quantum, quantum).unwrap();
        let table = PcTableView::new(&bytes, quantum);

        for sample in &scaled {
            prop_assert_eq!(table.lookup(sample.pc).unwrap(), Some(sample.value));
        }
    }
}
