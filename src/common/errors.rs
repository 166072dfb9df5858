use thiserror::Error;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("template io error: {0}")]
    TemplateIo(String),
    #[error("template format error: {0}")]
    TemplateFormat(String),
    #[error("descriptor format error: {0}")]
    DescriptorFormat(String),
    #[error("data shape error: {0}")]
    DataShape(String),
    #[error("encoding error: {0}")]
    Encoding(String),
    #[error("repack error: {0}")]
    Repack(String),
    #[error("registry error: {0}")]
    Registry(String),
}

impl MergeError {
    // Fatal kinds abort the whole session; the rest are per-placeholder
    // diagnostics (the binder logs them and keeps going).
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            MergeError::DescriptorFormat(_) | MergeError::DataShape(_) | MergeError::Encoding(_)
        )
    }
}

impl From<std::io::Error> for MergeError {
    fn from(value: std::io::Error) -> Self {
        Self::TemplateIo(value.to_string())
    }
}

impl From<zip::result::ZipError> for MergeError {
    fn from(value: zip::result::ZipError) -> Self {
        Self::TemplateFormat(value.to_string())
    }
}
