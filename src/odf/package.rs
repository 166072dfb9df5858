use crate::common::errors::MergeError;
use crate::odf::DocKind;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// An extracted template archive.
///
/// Owns the working directory: dropping the package removes the directory
/// and everything the merge wrote into it. The repacked output file is
/// created next to the working directory and survives the drop.
#[derive(Debug)]
pub struct TemplatePackage {
    workdir: TempDir,
    content_path: PathBuf,
    manifest_path: PathBuf,
    mimetype_path: PathBuf,
}

impl TemplatePackage {
    pub fn extract(template: &Path, scratch_dir: Option<&Path>) -> Result<Self, MergeError> {
        let file = File::open(template)
            .map_err(|e| MergeError::TemplateIo(format!("{}: {e}", template.display())))?;
        let mut zip = ZipArchive::new(file)?;

        let builder_result = {
            let mut builder = tempfile::Builder::new();
            builder.prefix("odf-report-");
            match scratch_dir {
                Some(dir) => builder.tempdir_in(dir),
                None => builder.tempdir(),
            }
        };
        let workdir =
            builder_result.map_err(|e| MergeError::TemplateIo(format!("working dir: {e}")))?;

        for i in 0..zip.len() {
            let mut entry = zip.by_index(i)?;
            if entry.name().ends_with('/') {
                continue;
            }
            let Some(relative) = entry.enclosed_name() else {
                continue;
            };
            let out_path = workdir.path().join(relative);
            if let Some(parent) = out_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes)?;
            std::fs::write(&out_path, &bytes)?;
        }

        let content_path = workdir.path().join("content.xml");
        let manifest_path = workdir.path().join("META-INF/manifest.xml");
        let mimetype_path = workdir.path().join("mimetype");
        if !content_path.is_file() {
            return Err(MergeError::TemplateFormat(
                "template has no content.xml".to_string(),
            ));
        }
        if !manifest_path.is_file() {
            return Err(MergeError::TemplateFormat(
                "template has no META-INF/manifest.xml".to_string(),
            ));
        }

        Ok(Self {
            workdir,
            content_path,
            manifest_path,
            mimetype_path,
        })
    }

    pub fn workdir(&self) -> &Path {
        self.workdir.path()
    }

    pub fn content_path(&self) -> &Path {
        &self.content_path
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    pub fn mimetype_path(&self) -> &Path {
        &self.mimetype_path
    }

    pub fn pictures_dir(&self) -> PathBuf {
        self.workdir.path().join("Pictures")
    }

    /// Re-archives the working directory as `<working_dir>.odt` / `.ods`.
    pub fn repack(&self, kind: DocKind) -> Result<PathBuf, MergeError> {
        let output = PathBuf::from(format!(
            "{}.{}",
            self.workdir.path().display(),
            kind.extension()
        ));
        let out = File::create(&output).map_err(|e| MergeError::Repack(e.to_string()))?;
        let mut writer = ZipWriter::new(out);

        // ODF requires "mimetype" to be the first entry and stored (not compressed).
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        writer
            .start_file("mimetype", stored)
            .map_err(|e| MergeError::Repack(e.to_string()))?;
        let mimetype = std::fs::read(&self.mimetype_path).unwrap_or_default();
        writer
            .write_all(&mimetype)
            .map_err(|e| MergeError::Repack(e.to_string()))?;

        let mut names = Vec::new();
        Self::collect_files(self.workdir.path(), self.workdir.path(), &mut names)
            .map_err(|e| MergeError::Repack(e.to_string()))?;
        names.retain(|n| n != "mimetype");
        names.sort();

        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for name in names {
            let bytes = std::fs::read(self.workdir.path().join(&name))
                .map_err(|e| MergeError::Repack(e.to_string()))?;
            // File entries only; directory entries are redundant in a zip.
            writer
                .start_file(name, deflated)
                .map_err(|e| MergeError::Repack(e.to_string()))?;
            writer
                .write_all(&bytes)
                .map_err(|e| MergeError::Repack(e.to_string()))?;
        }

        writer
            .finish()
            .map_err(|e| MergeError::Repack(e.to_string()))?;
        Ok(output)
    }

    fn collect_files(base: &Path, dir: &Path, out: &mut Vec<String>) -> std::io::Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                Self::collect_files(base, &path, out)?;
            } else if let Ok(relative) = path.strip_prefix(base) {
                out.push(relative.to_string_lossy().replace('\\', "/"));
            }
        }
        Ok(())
    }
}
