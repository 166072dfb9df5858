mod common;

use odf_report::odf::session::MergeSession;
use serde_json::json;

const GROUP_TABLE: &str = r#"<table:table table:name="T"><table:table-row><table:table-cell><office:annotation><dc:creator>u</dc:creator><text:p>rows</text:p></office:annotation><text:p><text:placeholder text:description="Type:String">«n»</text:placeholder></text:p></table:table-cell><table:table-cell><text:p><text:placeholder text:description="Type:String">«v»</text:placeholder></text:p></table:table-cell></table:table-row></table:table>"#;

fn merge_text(body: &str, data: serde_json::Value) -> String {
    let (_dir, path) = common::text_template(body);
    let session = MergeSession::open(&path, None).expect("open session");
    let output = session.merge(&common::data_object(data)).expect("merge");
    common::read_entry(&output, "content.xml")
}

#[test]
fn group_expands_to_one_row_per_entry() {
    let content = merge_text(
        GROUP_TABLE,
        json!({ "rows": [ { "n": "a", "v": "1" }, { "n": "b", "v": "2" } ] }),
    );
    assert_eq!(content.matches("<table:table-row").count(), 2);
    assert!(!content.contains("grpname"));

    let a = content.find("<text:p>a</text:p>").expect("first name");
    let one = content.find("<text:p>1</text:p>").expect("first value");
    let b = content.find("<text:p>b</text:p>").expect("second name");
    let two = content.find("<text:p>2</text:p>").expect("second value");
    assert!(a < one && one < b && b < two);
}

#[test]
fn missing_group_data_removes_the_anchor_row() {
    let content = merge_text(GROUP_TABLE, json!({}));
    assert_eq!(content.matches("<table:table-row").count(), 0);
    assert!(!content.contains("text:placeholder"));
}

#[test]
fn non_sequence_group_data_removes_the_anchor_row() {
    let content = merge_text(GROUP_TABLE, json!({ "rows": "oops" }));
    assert_eq!(content.matches("<table:table-row").count(), 0);
}

#[test]
fn empty_sequence_leaves_no_rows() {
    let content = merge_text(GROUP_TABLE, json!({ "rows": [] }));
    assert_eq!(content.matches("<table:table-row").count(), 0);
}

#[test]
fn first_row_backfills_missing_names_from_top_level() {
    let content = merge_text(
        GROUP_TABLE,
        json!({ "v": "TOP", "rows": [ { "n": "a" }, { "n": "b", "v": "2" } ] }),
    );
    // Row 0 takes «v» from the top-level object; row 1 brings its own.
    assert_eq!(content.matches("<text:p>TOP</text:p>").count(), 1);
    assert!(content.contains("<text:p>b</text:p>"));
    assert!(content.contains("<text:p>2</text:p>"));
}

#[test]
fn first_row_keeps_its_own_values_over_top_level_ones() {
    let content = merge_text(
        GROUP_TABLE,
        json!({ "v": "TOP", "rows": [ { "n": "a", "v": "own" } ] }),
    );
    assert!(content.contains("<text:p>own</text:p>"));
    assert!(!content.contains("<text:p>TOP</text:p>"));
}

#[test]
fn non_mapping_entries_produce_an_empty_row() {
    let content = merge_text(GROUP_TABLE, json!({ "rows": [ "scalar" ] }));
    assert_eq!(content.matches("<table:table-row").count(), 1);
    assert!(!content.contains("text:placeholder"));
}

#[test]
fn preceding_spanned_cells_cover_the_expanded_rows() {
    let body = r#"<table:table table:name="T"><table:table-row><table:table-cell table:number-rows-spanned="2"><text:p>head</text:p></table:table-cell></table:table-row><table:table-row><table:table-cell><office:annotation><text:p>rows</text:p></office:annotation><text:p><text:placeholder text:description="Type:String">«n»</text:placeholder></text:p></table:table-cell></table:table-row></table:table>"#;
    let content = merge_text(
        body,
        json!({ "rows": [ { "n": "a" }, { "n": "b" }, { "n": "c" } ] }),
    );
    assert!(content.contains("table:number-rows-spanned=\"4\""));
}

#[test]
fn non_variable_cells_are_cleared_after_the_first_row() {
    let body = r#"<table:table table:name="T"><table:table-row><table:table-cell><office:annotation><text:p>rows</text:p></office:annotation><text:p><text:placeholder text:description="Type:String">«n»</text:placeholder></text:p></table:table-cell><table:table-cell><text:p>static label</text:p></table:table-cell></table:table-row></table:table>"#;
    let content = merge_text(body, json!({ "rows": [ { "n": "a" }, { "n": "b" } ] }));
    // The literal cell survives only in the first expanded row.
    assert_eq!(content.matches("static label").count(), 1);
}
