use crate::common::errors::MergeError;
use crate::common::fs::FsUtil;
use crate::odf::session::MergeSession;
use crate::schema;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::info;

pub use crate::schema::DescribeKind;

/// Engine-wide settings. One record instead of process globals: every
/// session factory call reads from here.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Host name written into emitted API documents.
    pub host: String,
    /// Parent directory for merge working directories; the system temp
    /// directory when unset.
    pub scratch_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            scratch_dir: None,
        }
    }
}

/// Result of a merge. `temp_files` lists everything the caller should
/// delete once the produced file has been delivered.
#[derive(Debug)]
pub struct MergeOutput {
    pub path: PathBuf,
    pub mime_type: String,
    pub temp_files: Vec<PathBuf>,
}

/// Seam to the external document-conversion service.
pub trait DocumentConverter {
    fn convert(&self, document: &Path, target_ext: &str) -> Result<PathBuf, MergeError>;
}

pub struct ReportEngine {
    config: EngineConfig,
}

impl ReportEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    /// Fills `template` with `data` and returns the produced document.
    pub fn merge(&self, template: &Path, data: &Map<String, Value>) -> Result<MergeOutput, MergeError> {
        let template = FsUtil::resolve_template_path(&template.to_string_lossy())?;
        let session = MergeSession::open(&template, self.config.scratch_dir.as_deref())?;
        let kind = session.kind();
        let path = session.merge(data)?;
        info!(template = %template.display(), output = %path.display(), "merge finished");
        Ok(MergeOutput {
            path: path.clone(),
            mime_type: kind.mime_type().to_string(),
            temp_files: vec![path],
        })
    }

    /// Merge, then hand the produced document to the conversion service.
    pub fn merge_pdf(
        &self,
        template: &Path,
        data: &Map<String, Value>,
        converter: &dyn DocumentConverter,
    ) -> Result<MergeOutput, MergeError> {
        let merged = self.merge(template, data)?;
        let pdf = converter.convert(&merged.path, "pdf")?;
        let mut temp_files = merged.temp_files;
        temp_files.push(pdf.clone());
        Ok(MergeOutput {
            path: pdf,
            mime_type: "application/pdf".to_string(),
            temp_files,
        })
    }

    /// Emits the chosen description of the template's implied API. Reads
    /// only; the template file is left byte-identical.
    pub fn describe(&self, template: &Path, kind: DescribeKind) -> Result<String, MergeError> {
        let template = FsUtil::resolve_template_path(&template.to_string_lossy())?;
        let endpoint = FsUtil::endpoint_name(&template);
        let session = MergeSession::open(&template, self.config.scratch_dir.as_deref())?;
        let template_schema = session.schema()?;
        Ok(schema::describe(
            &template_schema,
            kind,
            &endpoint,
            &self.config.host,
        ))
    }
}

/// `outputPDF` query semantics: present and anything other than the exact
/// string `false` (empty string and `0` included) enables conversion.
pub fn wants_pdf(param: Option<&str>) -> bool {
    matches!(param, Some(value) if value != "false")
}
