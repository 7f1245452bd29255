use super::{DecodeError, PcTableView, PcValue};

#[test]
fn decode_records() {
    // (pc 0, +5) (pc 8, -8)
    let bytes = [0x01, 0x0a, 0x08, 0x0f, 0x00];
    let table = PcTableView::new(&bytes, 1);

    assert_eq!(
        table.decode().unwrap(),
        vec![PcValue::new(0, 5), PcValue::new(8, -3)]
    );
    assert_eq!(table.encoded_len().unwrap(), 5);
}

#[test]
fn lookup_is_last_value_wins() {
    let bytes = [0x01, 0x0a, 0x08, 0x0f, 0x00];
    let table = PcTableView::new(&bytes, 1);

    assert_eq!(table.lookup(0).unwrap(), Some(5));
    assert_eq!(table.lookup(7).unwrap(), Some(5));
    assert_eq!(table.lookup(8).unwrap(), Some(-3));
    assert_eq!(table.lookup(1000).unwrap(), Some(-3));
}

#[test]
fn pcs_before_first_record_have_no_value() {
    // (pc 4, +2)
    let bytes = [0x05, 0x04, 0x00];
    let table = PcTableView::new(&bytes, 1);

    assert_eq!(table.lookup(3).unwrap(), None);
    assert_eq!(table.lookup(4).unwrap(), Some(2));
}

#[test]
fn empty_table_is_single_terminator() {
    let table = PcTableView::new(&[0x00], 1);

    assert!(table.decode().unwrap().is_empty());
    assert_eq!(table.lookup(0).unwrap(), None);
    assert_eq!(table.encoded_len().unwrap(), 1);
}

#[test]
fn steps_scale_by_quantum() {
    // (unit 0, +1) (unit 2, +1) with 4-byte instructions
    let bytes = [0x01, 0x02, 0x02, 0x02, 0x00];
    let table = PcTableView::new(&bytes, 4);

    assert_eq!(
        table.decode().unwrap(),
        vec![PcValue::new(0, 1), PcValue::new(8, 2)]
    );
    assert_eq!(table.lookup(7).unwrap(), Some(1));
}

#[test]
fn pool_offset_zero_means_absent() {
    let pool = [0x00, 0x01, 0x02, 0x00];

    assert!(PcTableView::in_pool(&pool, 0, 1).unwrap().is_none());

    let table = PcTableView::in_pool(&pool, 1, 1).unwrap().unwrap();
    assert_eq!(table.decode().unwrap(), vec![PcValue::new(0, 1)]);

    assert!(matches!(
        PcTableView::in_pool(&pool, 9, 1),
        Err(DecodeError::OutOfBounds { offset: 9, len: 4 })
    ));
}

#[test]
fn missing_terminator_is_an_error() {
    let table = PcTableView::new(&[0x01, 0x02], 1);
    assert_eq!(table.decode(), Err(DecodeError::Unterminated(2)));
}
