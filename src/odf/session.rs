use crate::common::errors::MergeError;
use crate::odf::binder::Binder;
use crate::odf::manifest::ManifestFile;
use crate::odf::package::TemplatePackage;
use crate::odf::scanner;
use crate::odf::xml::XmlDoc;
use crate::odf::DocKind;
use crate::schema::TemplateSchema;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::info;

/// One merge run over one extracted template.
///
/// The session owns its working directory, parsed DOM and picture serial
/// counter; nothing is shared between sessions. The working directory is
/// removed when the session drops, whether or not the merge finished.
#[derive(Debug)]
pub struct MergeSession {
    package: TemplatePackage,
    doc: XmlDoc,
    kind: DocKind,
}

impl MergeSession {
    pub fn open(template: &Path, scratch_dir: Option<&Path>) -> Result<Self, MergeError> {
        let package = TemplatePackage::extract(template, scratch_dir)?;
        let doc = XmlDoc::parse_file(package.content_path())?;
        let kind = scanner::detect_kind(&doc);
        if kind == DocKind::Other {
            return Err(MergeError::TemplateFormat(
                "content.xml has neither office:text nor office:spreadsheet".to_string(),
            ));
        }
        info!(workdir = %package.workdir().display(), ?kind, "merge session opened");
        Ok(Self { package, doc, kind })
    }

    pub fn kind(&self) -> DocKind {
        self.kind
    }

    pub fn workdir(&self) -> &Path {
        self.package.workdir()
    }

    /// Runs the pipeline: scan, bind singles, bind groups, rewrite
    /// metadata, save content.xml, repack. Consumes the session; the
    /// produced archive is the only thing that outlives it.
    pub fn merge(mut self, data: &Map<String, Value>) -> Result<PathBuf, MergeError> {
        let scan = scanner::scan(&mut self.doc, self.kind);
        let manifest = ManifestFile::new(self.package.manifest_path());
        let pictures = {
            let mut binder = Binder::new(
                &mut self.doc,
                self.kind,
                self.package.pictures_dir(),
                &manifest,
            );
            binder.bind_singles(data, &scan.singles)?;
            binder.bind_groups(data, &scan.groups)?;
            binder.pictures_written()
        };

        manifest.strip_template_suffix(self.package.mimetype_path())?;
        self.doc.save(self.package.content_path())?;
        let output = self.package.repack(self.kind)?;
        info!(output = %output.display(), pictures, "merge repacked");
        Ok(output)
    }

    /// Scans for description only. Nothing is written back, so the source
    /// template stays byte-identical.
    pub fn schema(mut self) -> Result<TemplateSchema, MergeError> {
        let scan = scanner::scan(&mut self.doc, self.kind);
        Ok(TemplateSchema::collect(&self.doc, self.kind, &scan))
    }
}
