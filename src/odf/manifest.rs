use crate::common::errors::MergeError;
use crate::odf::xml::XmlDoc;
use std::path::{Path, PathBuf};

const TEXT_TEMPLATE_MIME: &str = "application/vnd.oasis.opendocument.text-template";
const TEXT_MIME: &str = "application/vnd.oasis.opendocument.text";
const SHEET_TEMPLATE_MIME: &str = "application/vnd.oasis.opendocument.spreadsheet-template";
const SHEET_MIME: &str = "application/vnd.oasis.opendocument.spreadsheet";

/// `META-INF/manifest.xml` of an extracted template.
pub struct ManifestFile {
    path: PathBuf,
}

impl ManifestFile {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Rewrites the `/` entry's media type and the top-level `mimetype`
    /// file so the produced archive opens as a document instead of a
    /// template. Running it twice leaves both files unchanged.
    pub fn strip_template_suffix(&self, mimetype_path: &Path) -> Result<(), MergeError> {
        let mut doc = XmlDoc::parse_file(&self.path)?;
        for entry in doc.descendants_named(doc.root(), "manifest:file-entry") {
            if doc.attr(entry, "manifest:full-path") != Some("/") {
                continue;
            }
            if let Some(media) = doc.attr(entry, "manifest:media-type").map(str::to_string) {
                doc.set_attr(entry, "manifest:media-type", &strip_template_mime(&media));
            }
        }
        doc.save(&self.path)?;

        let mime = std::fs::read_to_string(mimetype_path)
            .map_err(|e| MergeError::TemplateIo(format!("{}: {e}", mimetype_path.display())))?;
        let rewritten = strip_template_mime(mime.trim());
        std::fs::write(mimetype_path, rewritten)
            .map_err(|e| MergeError::TemplateIo(e.to_string()))?;
        Ok(())
    }

    /// Declares a new `Pictures/<serial>` part in the manifest.
    pub fn register_picture(&self, serial: u32) -> Result<(), MergeError> {
        let mut doc = XmlDoc::parse_file(&self.path)?;
        let root = if doc.is_named(doc.root(), "manifest:manifest") {
            doc.root()
        } else {
            *doc.descendants_named(doc.root(), "manifest:manifest")
                .first()
                .ok_or_else(|| {
                    MergeError::TemplateFormat("manifest.xml has no manifest:manifest".to_string())
                })?
        };
        let entry = doc.create_element("manifest:file-entry");
        doc.set_attr(entry, "manifest:full-path", &format!("Pictures/{serial}"));
        doc.set_attr(entry, "manifest:media-type", "");
        doc.append_child(root, entry);
        doc.save(&self.path)
    }
}

fn strip_template_mime(mime: &str) -> String {
    mime.replace(TEXT_TEMPLATE_MIME, TEXT_MIME)
        .replace(SHEET_TEMPLATE_MIME, SHEET_MIME)
}
