mod common;

use odf_report::odf::session::MergeSession;
use serde_json::json;

fn merge_text(body: &str, data: serde_json::Value) -> String {
    let (_dir, path) = common::text_template(body);
    let session = MergeSession::open(&path, None).expect("open session");
    let output = session.merge(&common::data_object(data)).expect("merge");
    common::read_entry(&output, "content.xml")
}

fn merge_sheet(body: &str, data: serde_json::Value) -> String {
    let (_dir, path) = common::sheet_template(body);
    let session = MergeSession::open(&path, None).expect("open session");
    let output = session.merge(&common::data_object(data)).expect("merge");
    common::read_entry(&output, "content.xml")
}

#[test]
fn text_placeholder_is_replaced_by_its_value() {
    let body = r#"<text:p><text:placeholder text:description="Type:String">«name»</text:placeholder></text:p>"#;
    let content = merge_text(body, json!({ "name": "Ada" }));
    assert!(content.contains("<text:p>Ada</text:p>"));
    assert!(!content.contains("text:placeholder"));
}

#[test]
fn missing_value_drops_the_placeholder() {
    let body = r#"<text:p><text:placeholder text:description="Type:String">«name»</text:placeholder></text:p>"#;
    let content = merge_text(body, json!({}));
    assert!(content.contains("<text:p/>"));
    assert!(!content.contains("text:placeholder"));
}

#[test]
fn null_value_counts_as_missing() {
    let body = r#"<text:p><text:placeholder text:description="Type:String">«name»</text:placeholder></text:p>"#;
    let content = merge_text(body, json!({ "name": null }));
    assert!(!content.contains("text:placeholder"));
    assert!(!content.contains("null"));
}

#[test]
fn sheet_enum_value_is_a_one_based_index() {
    let body = r##"<table:table table:name="S"><table:table-row><table:table-cell office:value-type="string"><text:p><text:a xlink:href="#" office:target-frame-name='Type:Enum;Items:"M,F"'>sex</text:a></text:p></table:table-cell></table:table-row></table:table>"##;
    let content = merge_sheet(body, json!({ "sex": 2 }));
    assert!(content.contains("<text:p>F</text:p>"));
}

#[test]
fn enum_accepts_the_label_itself() {
    let body = r##"<table:table table:name="S"><table:table-row><table:table-cell><text:p><text:a xlink:href="#" office:target-frame-name='Type:Enum;Items:"a,b,c"'>pick</text:a></text:p></table:table-cell></table:table-row></table:table>"##;
    assert!(merge_sheet(body, json!({ "pick": 2 })).contains("<text:p>b</text:p>"));
    let body = r##"<table:table table:name="S"><table:table-row><table:table-cell><text:p><text:a xlink:href="#" office:target-frame-name='Type:Enum;Items:"a,b,c"'>pick</text:a></text:p></table:table-cell></table:table-row></table:table>"##;
    assert!(merge_sheet(body, json!({ "pick": "b" })).contains("<text:p>b</text:p>"));
}

#[test]
fn boolean_maps_truthy_spellings_to_the_first_label() {
    let body = r#"<text:p><text:placeholder text:description='Type:Boolean;Items:"yes,no"'>«b1»</text:placeholder></text:p><text:p><text:placeholder text:description='Type:Boolean;Items:"yes,no"'>«b2»</text:placeholder></text:p><text:p><text:placeholder text:description='Type:Boolean;Items:"yes,no"'>«b3»</text:placeholder></text:p><text:p><text:placeholder text:description='Type:Boolean;Items:"yes,no"'>«b4»</text:placeholder></text:p>"#;
    let content = merge_text(
        body,
        json!({ "b1": true, "b2": "YES", "b3": "1", "b4": false }),
    );
    assert_eq!(content.matches("<text:p>yes</text:p>").count(), 3);
    assert_eq!(content.matches("<text:p>no</text:p>").count(), 1);
}

#[test]
fn typed_sheet_cell_gets_value_attributes() {
    let body = r##"<table:table table:name="S"><table:table-row><table:table-cell office:value-type="string" calcext:value-type="string"><text:p><text:a xlink:href="#" office:target-frame-name="Type:Float;Format:value">amt</text:a></text:p></table:table-cell></table:table-row></table:table>"##;
    let content = merge_sheet(body, json!({ "amt": 12.5 }));
    assert!(content.contains("office:value-type=\"float\""));
    assert!(content.contains("calcext:value-type=\"float\""));
    assert!(content.contains("office:value=\"12.5\""));
    assert!(content.contains("<text:p>12.5</text:p>"));
}

#[test]
fn date_cell_uses_the_format_attribute_suffix() {
    let body = r##"<table:table table:name="S"><table:table-row><table:table-cell><text:p><text:a xlink:href="#" office:target-frame-name="Type:Date;Format:date-value">d</text:a></text:p></table:table-cell></table:table-row></table:table>"##;
    let content = merge_sheet(body, json!({ "d": "2018-07-25" }));
    assert!(content.contains("office:value-type=\"date\""));
    assert!(content.contains("office:date-value=\"2018-07-25\""));
}

#[test]
fn auto_promotes_to_float_when_the_value_is_numeric() {
    let body = r##"<table:table table:name="S"><table:table-row><table:table-cell><text:p><text:a xlink:href="#" office:target-frame-name="Type:Auto">n</text:a></text:p></table:table-cell></table:table-row></table:table>"##;
    let content = merge_sheet(body, json!({ "n": "7" }));
    assert!(content.contains("office:value-type=\"float\""));
    assert!(content.contains("office:value=\"7\""));
}

#[test]
fn auto_stays_text_for_non_numeric_values() {
    let body = r##"<table:table table:name="S"><table:table-row><table:table-cell><text:p><text:a xlink:href="#" office:target-frame-name="Type:Auto">n</text:a></text:p></table:table-cell></table:table-row></table:table>"##;
    let content = merge_sheet(body, json!({ "n": "abc" }));
    assert!(content.contains("<text:p>abc</text:p>"));
    assert!(!content.contains("office:value="));
}

#[test]
fn text_kind_ignores_spreadsheet_cell_typing() {
    let body = r#"<text:p><text:placeholder text:description="Type:Float;Format:value">«amt»</text:placeholder></text:p>"#;
    let content = merge_text(body, json!({ "amt": 3 }));
    assert!(content.contains("<text:p>3</text:p>"));
    assert!(!content.contains("office:value="));
}
