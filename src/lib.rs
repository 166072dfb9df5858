pub mod common;
pub mod engine;
pub mod odf;
pub mod registry;
pub mod schema;

pub use common::errors::MergeError;
pub use engine::{DescribeKind, DocumentConverter, EngineConfig, MergeOutput, ReportEngine};
