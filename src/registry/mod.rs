use crate::common::errors::MergeError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One registered template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRecord {
    pub endpoint: String,
    pub category: String,
    pub doc_name: String,
    pub ext_name: String,
    pub uploaded_at: String,
    #[serde(default)]
    pub access_times: u64,
}

/// One line of the merge audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeLogEntry {
    pub success: bool,
    pub to_pdf: bool,
    pub source: String,
    pub file_name: String,
    pub file_ext: String,
    pub timestamp: String,
}

impl MergeLogEntry {
    pub fn new(success: bool, to_pdf: bool, source: &str, record: &TemplateRecord) -> Self {
        Self {
            success,
            to_pdf,
            source: source.to_string(),
            file_name: record.doc_name.clone(),
            file_ext: record.ext_name.clone(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Storage interface for template metadata and files. Merges only ever
/// read template files; all writes go through this interface.
pub trait TemplateRegistry {
    fn list(&self) -> Result<Vec<TemplateRecord>, MergeError>;
    fn get(&self, endpoint: &str) -> Result<Option<TemplateRecord>, MergeError>;
    fn add(&self, record: TemplateRecord, source_file: &Path) -> Result<(), MergeError>;
    fn update(&self, record: TemplateRecord, source_file: &Path) -> Result<(), MergeError>;
    fn remove(&self, endpoint: &str) -> Result<(), MergeError>;
    /// Bumps and returns the template's access counter.
    fn record_access(&self, endpoint: &str) -> Result<u64, MergeError>;
    fn template_path(&self, record: &TemplateRecord) -> PathBuf;
}

/// File-backed registry: `records.json` plus the stored template files in
/// one root directory, and a JSONL merge audit log.
pub struct FileRegistry {
    root: PathBuf,
}

impl FileRegistry {
    pub fn open(root: &Path) -> Result<Self, MergeError> {
        std::fs::create_dir_all(root).map_err(|e| MergeError::Registry(e.to_string()))?;
        let registry = Self {
            root: root.to_path_buf(),
        };
        registry.prune_old_log_entries()?;
        Ok(registry)
    }

    fn records_path(&self) -> PathBuf {
        self.root.join("records.json")
    }

    fn log_path(&self) -> PathBuf {
        self.root.join("merge-log.jsonl")
    }

    fn load(&self) -> Result<Vec<TemplateRecord>, MergeError> {
        let path = self.records_path();
        if !path.is_file() {
            return Ok(Vec::new());
        }
        let text =
            std::fs::read_to_string(&path).map_err(|e| MergeError::Registry(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| MergeError::Registry(e.to_string()))
    }

    // Temp-file rename keeps concurrent readers on a consistent snapshot.
    fn store(&self, records: &[TemplateRecord]) -> Result<(), MergeError> {
        let text = serde_json::to_string_pretty(records)
            .map_err(|e| MergeError::Registry(e.to_string()))?;
        let tmp = self.root.join("records.json.tmp");
        std::fs::write(&tmp, text).map_err(|e| MergeError::Registry(e.to_string()))?;
        std::fs::rename(&tmp, self.records_path())
            .map_err(|e| MergeError::Registry(e.to_string()))
    }

    pub fn append_merge_log(&self, entry: &MergeLogEntry) -> Result<(), MergeError> {
        let line =
            serde_json::to_string(entry).map_err(|e| MergeError::Registry(e.to_string()))?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path())
            .map_err(|e| MergeError::Registry(e.to_string()))?;
        writeln!(file, "{line}").map_err(|e| MergeError::Registry(e.to_string()))
    }

    pub fn merge_log(&self) -> Result<Vec<MergeLogEntry>, MergeError> {
        let path = self.log_path();
        if !path.is_file() {
            return Ok(Vec::new());
        }
        let text =
            std::fs::read_to_string(&path).map_err(|e| MergeError::Registry(e.to_string()))?;
        let mut entries = Vec::new();
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<MergeLogEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(err) => warn!(%err, "skipping malformed merge-log line"),
            }
        }
        Ok(entries)
    }

    // Entries older than a year are dropped when the registry opens.
    fn prune_old_log_entries(&self) -> Result<(), MergeError> {
        let entries = self.merge_log()?;
        if entries.is_empty() {
            return Ok(());
        }
        let cutoff = Utc::now() - Duration::days(365);
        let kept: Vec<&MergeLogEntry> = entries
            .iter()
            .filter(|entry| {
                DateTime::parse_from_rfc3339(&entry.timestamp)
                    .map(|ts| ts.with_timezone(&Utc) >= cutoff)
                    .unwrap_or(true)
            })
            .collect();
        if kept.len() == entries.len() {
            return Ok(());
        }
        let mut text = String::new();
        for entry in &kept {
            let line = serde_json::to_string(entry)
                .map_err(|e| MergeError::Registry(e.to_string()))?;
            text.push_str(&line);
            text.push('\n');
        }
        std::fs::write(self.log_path(), text).map_err(|e| MergeError::Registry(e.to_string()))
    }
}

impl TemplateRegistry for FileRegistry {
    fn list(&self) -> Result<Vec<TemplateRecord>, MergeError> {
        self.load()
    }

    fn get(&self, endpoint: &str) -> Result<Option<TemplateRecord>, MergeError> {
        Ok(self.load()?.into_iter().find(|r| r.endpoint == endpoint))
    }

    fn add(&self, record: TemplateRecord, source_file: &Path) -> Result<(), MergeError> {
        let mut records = self.load()?;
        if records.iter().any(|r| r.endpoint == record.endpoint) {
            return Err(MergeError::Registry(format!(
                "endpoint already registered: {}",
                record.endpoint
            )));
        }
        std::fs::copy(source_file, self.template_path(&record))
            .map_err(|e| MergeError::Registry(e.to_string()))?;
        info!(endpoint = %record.endpoint, "template registered");
        records.push(record);
        self.store(&records)
    }

    fn update(&self, record: TemplateRecord, source_file: &Path) -> Result<(), MergeError> {
        let mut records = self.load()?;
        let Some(existing) = records.iter_mut().find(|r| r.endpoint == record.endpoint) else {
            return Err(MergeError::Registry(format!(
                "no such endpoint: {}",
                record.endpoint
            )));
        };
        // A changed extension leaves a stale file behind otherwise.
        let old_path = self.root.join(format!(
            "{}.{}",
            existing.endpoint, existing.ext_name
        ));
        if existing.ext_name != record.ext_name && old_path.is_file() {
            std::fs::remove_file(&old_path).map_err(|e| MergeError::Registry(e.to_string()))?;
        }
        let access_times = existing.access_times;
        *existing = TemplateRecord {
            access_times,
            ..record.clone()
        };
        std::fs::copy(source_file, self.template_path(&record))
            .map_err(|e| MergeError::Registry(e.to_string()))?;
        info!(endpoint = %record.endpoint, "template updated");
        self.store(&records)
    }

    fn remove(&self, endpoint: &str) -> Result<(), MergeError> {
        let mut records = self.load()?;
        let Some(pos) = records.iter().position(|r| r.endpoint == endpoint) else {
            return Err(MergeError::Registry(format!("no such endpoint: {endpoint}")));
        };
        let record = records.remove(pos);
        let path = self.template_path(&record);
        if path.is_file() {
            std::fs::remove_file(&path).map_err(|e| MergeError::Registry(e.to_string()))?;
        }
        info!(endpoint, "template removed");
        self.store(&records)
    }

    fn record_access(&self, endpoint: &str) -> Result<u64, MergeError> {
        let mut records = self.load()?;
        let Some(record) = records.iter_mut().find(|r| r.endpoint == endpoint) else {
            return Err(MergeError::Registry(format!("no such endpoint: {endpoint}")));
        };
        record.access_times += 1;
        let count = record.access_times;
        self.store(&records)?;
        Ok(count)
    }

    fn template_path(&self, record: &TemplateRecord) -> PathBuf {
        self.root
            .join(format!("{}.{}", record.endpoint, record.ext_name))
    }
}
