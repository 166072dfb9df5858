use odf_report::odf::descriptor::{is_number, Descriptor, VarKind};

#[test]
fn keys_compare_case_insensitively() {
    let d = Descriptor::parse("type:Enum;ITEMS:\"a,b\";description:hello;ApiHelp:call me");
    assert_eq!(d.kind, VarKind::Enum);
    assert_eq!(d.items, "\"a,b\"");
    assert_eq!(d.description, "hello");
    assert_eq!(d.api_help, "call me");
}

#[test]
fn unknown_type_falls_back_to_string() {
    let d = Descriptor::parse("Type:Whatever");
    assert_eq!(d.kind, VarKind::Str);
}

#[test]
fn image_maps_to_file_kind() {
    let d = Descriptor::parse("Type:Image;Size:3x2");
    assert_eq!(d.kind, VarKind::File);
    assert_eq!(d.frame_size(), ("3cm".to_string(), "2cm".to_string()));
}

#[test]
fn empty_and_malformed_tokens_are_skipped() {
    let d = Descriptor::parse("Type:String;;garbage;Description:x");
    assert_eq!(d.kind, VarKind::Str);
    assert_eq!(d.description, "x");
}

#[test]
fn items_labels_strip_quotes_and_trim() {
    let d = Descriptor::parse("Type:Enum;Items:\"M, F\"");
    assert_eq!(d.items_labels(), vec!["M".to_string(), "F".to_string()]);
}

#[test]
fn frame_size_defaults_to_business_card_ish() {
    let d = Descriptor::parse("Type:Image");
    assert_eq!(d.frame_size(), ("2.5cm".to_string(), "1.5cm".to_string()));
}

#[test]
fn statistic_fields_are_collected() {
    let d = Descriptor::parse("Type:Statistic;groupname:sales;column:Sheet1.$B$2;method:總和;Items:amount");
    assert_eq!(d.kind, VarKind::Statistic);
    assert_eq!(d.group_name, "sales");
    assert_eq!(d.column, "Sheet1.$B$2");
    assert_eq!(d.method, "總和");
    assert_eq!(d.items, "amount");
}

#[test]
fn json_type_mapping() {
    assert_eq!(VarKind::Str.json_type(), "string");
    assert_eq!(VarKind::Date.json_type(), "string");
    assert_eq!(VarKind::Float.json_type(), "number");
    assert_eq!(VarKind::Percentage.json_type(), "number");
    assert_eq!(VarKind::Currency.json_type(), "integer");
    assert_eq!(VarKind::Boolean.json_type(), "boolean");
    assert_eq!(VarKind::File.json_type(), "array");
    assert_eq!(VarKind::Auto.sample_hint(), "string or float");
}

#[test]
fn numeric_detector_accepts_signed_decimals_and_padding() {
    assert!(is_number("12"));
    assert!(is_number(" +3.5 "));
    assert!(is_number("-2"));
    assert!(is_number("2 "));
    assert!(is_number(".5"));
}

#[test]
fn numeric_detector_rejects_everything_else() {
    assert!(!is_number(""));
    assert!(!is_number("   "));
    assert!(!is_number("."));
    assert!(!is_number("1.2.3"));
    assert!(!is_number("12a"));
    assert!(!is_number("a12"));
    assert!(!is_number("+"));
}
