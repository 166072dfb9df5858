use odf_report::common::errors::MergeError;
use odf_report::odf::cell_ref::CellRef;

#[test]
fn parse_sheet_qualified_reference() {
    let cell = CellRef::parse("Sheet1.$B$2").expect("valid reference");
    assert_eq!(cell.sheet, "Sheet1");
    assert_eq!(cell.column, "B");
    assert_eq!(cell.row, 2);
}

#[test]
fn range_spans_the_expanded_rows() {
    let cell = CellRef::parse("Sheet1.$B$2").expect("valid reference");
    assert_eq!(cell.range(3), "[.B2:.B4]");
    assert_eq!(cell.range(1), "[.B2:.B2]");
}

#[test]
fn multi_letter_columns_are_kept_whole() {
    let cell = CellRef::parse("Data.$AA$10").expect("valid reference");
    assert_eq!(cell.column, "AA");
    assert_eq!(cell.range(2), "[.AA10:.AA11]");
}

#[test]
fn malformed_references_are_rejected() {
    for input in ["B2", "Sheet1.$b$2", "Sheet1.$B$0", "Sheet1.$B$", "Sheet1.$$2"] {
        let err = CellRef::parse(input).expect_err("invalid");
        assert!(matches!(err, MergeError::DescriptorFormat(_)), "{input}");
    }
}
