#![allow(dead_code)]

use serde_json::{Map, Value};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const TEXT_TEMPLATE_MIME: &str = "application/vnd.oasis.opendocument.text-template";
pub const SHEET_TEMPLATE_MIME: &str = "application/vnd.oasis.opendocument.spreadsheet-template";

pub fn new_template_path(filename: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let file_path = dir.path().join(filename);
    (dir, file_path)
}

/// Builds a minimal but real template archive: stored mimetype first,
/// then content.xml and META-INF/manifest.xml.
pub fn write_template(path: &Path, mimetype: &str, content_xml: &str) {
    let file = File::create(path).expect("create template");
    let mut zip = ZipWriter::new(file);

    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    zip.start_file("mimetype", stored).expect("mimetype entry");
    zip.write_all(mimetype.as_bytes()).expect("mimetype bytes");

    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file("content.xml", deflated).expect("content entry");
    zip.write_all(content_xml.as_bytes()).expect("content bytes");

    zip.start_file("META-INF/manifest.xml", deflated)
        .expect("manifest entry");
    zip.write_all(manifest_xml(mimetype).as_bytes())
        .expect("manifest bytes");

    zip.finish().expect("finish template zip");
}

pub fn manifest_xml(mimetype: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0" manifest:version="1.2"><manifest:file-entry manifest:full-path="/" manifest:media-type="{mimetype}"/><manifest:file-entry manifest:full-path="content.xml" manifest:media-type="text/xml"/></manifest:manifest>"#
    )
}

pub fn text_content(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" xmlns:draw="urn:oasis:names:tc:opendocument:xmlns:drawing:1.0" xmlns:svg="urn:oasis:names:tc:opendocument:xmlns:svg-compatible:1.0" xmlns:xlink="http://www.w3.org/1999/xlink" xmlns:dc="http://purl.org/dc/elements/1.1/" office:version="1.2"><office:body><office:text>{body}</office:text></office:body></office:document-content>"#
    )
}

pub fn sheet_content(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" xmlns:draw="urn:oasis:names:tc:opendocument:xmlns:drawing:1.0" xmlns:svg="urn:oasis:names:tc:opendocument:xmlns:svg-compatible:1.0" xmlns:xlink="http://www.w3.org/1999/xlink" xmlns:calcext="urn:org:documentfoundation:names:experimental:calc:xmlns:calcext:1.0" office:version="1.2"><office:body><office:spreadsheet>{body}</office:spreadsheet></office:body></office:document-content>"#
    )
}

/// Writes `template.ott` with the given Writer body.
pub fn text_template(body: &str) -> (TempDir, PathBuf) {
    let (dir, path) = new_template_path("template.ott");
    write_template(&path, TEXT_TEMPLATE_MIME, &text_content(body));
    (dir, path)
}

/// Writes `template.ots` with the given Calc body.
pub fn sheet_template(body: &str) -> (TempDir, PathBuf) {
    let (dir, path) = new_template_path("template.ots");
    write_template(&path, SHEET_TEMPLATE_MIME, &sheet_content(body));
    (dir, path)
}

pub fn read_entry(archive: &Path, name: &str) -> String {
    let file = File::open(archive).expect("open archive");
    let mut zip = ZipArchive::new(file).expect("read archive");
    let mut entry = zip.by_name(name).expect("entry present");
    let mut text = String::new();
    entry.read_to_string(&mut text).expect("entry text");
    text
}

pub fn entry_names(archive: &Path) -> Vec<String> {
    let file = File::open(archive).expect("open archive");
    let mut zip = ZipArchive::new(file).expect("read archive");
    (0..zip.len())
        .map(|i| zip.by_index(i).expect("entry").name().to_string())
        .collect()
}

pub fn data_object(value: Value) -> Map<String, Value> {
    value.as_object().expect("object literal").clone()
}
