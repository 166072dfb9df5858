use crate::common::errors::MergeError;
use std::path::{Path, PathBuf};

pub struct FsUtil;

impl FsUtil {
    // Normalizes relative paths and enforces the ODF template extension contract.
    pub fn resolve_template_path(path: &str) -> Result<PathBuf, MergeError> {
        if path.trim().is_empty() {
            return Err(MergeError::InvalidPath("path is empty".to_string()));
        }
        let input = Path::new(path);
        let abs = if input.is_absolute() {
            input.to_path_buf()
        } else {
            std::env::current_dir()?.join(input)
        };
        let ext = abs
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if ext != "ott" && ext != "ots" {
            return Err(MergeError::InvalidPath(format!(
                "expected .ott or .ots extension: {}",
                abs.display()
            )));
        }
        Ok(abs)
    }

    // Endpoint name for a template: the file stem, the same name the registry
    // stores the file under.
    pub fn endpoint_name(path: &Path) -> String {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string()
    }
}
