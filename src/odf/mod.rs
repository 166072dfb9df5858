pub mod binder;
pub mod cell_ref;
pub mod descriptor;
pub mod manifest;
pub mod package;
pub mod scanner;
pub mod session;
pub mod xml;

/// What the template body contains, per `office:body`'s first child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocKind {
    Text,
    Spreadsheet,
    Other,
}

impl DocKind {
    pub fn extension(&self) -> &'static str {
        match self {
            DocKind::Spreadsheet => "ods",
            DocKind::Text | DocKind::Other => "odt",
        }
    }

    // MIME string for the produced document (template suffix already gone).
    pub fn mime_type(&self) -> &'static str {
        match self {
            DocKind::Spreadsheet => "application/vnd.oasis.opendocument.spreadsheet",
            DocKind::Text | DocKind::Other => "application/vnd.oasis.opendocument.text",
        }
    }

    /// Placeholder element tag for this kind of document.
    pub fn placeholder_tag(&self) -> &'static str {
        match self {
            DocKind::Spreadsheet => "text:a",
            DocKind::Text | DocKind::Other => "text:placeholder",
        }
    }

    /// Attribute that carries the placeholder descriptor.
    pub fn descriptor_attr(&self) -> &'static str {
        match self {
            DocKind::Spreadsheet => "office:target-frame-name",
            DocKind::Text | DocKind::Other => "text:description",
        }
    }
}
