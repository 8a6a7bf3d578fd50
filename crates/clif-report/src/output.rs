//! All-or-nothing output of rendered files.
//!
//! Every file is first written to a staging path next to its destination.
//! Only when all staged files are written and synced are they renamed into
//! place. Staged files, and the directories staging created, are removed when
//! anything fails. Directories that hold files already renamed into place are
//! left alone.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use clif_model::{CoverageReport, MappingTable};
use tracing::{debug, info, warn};

use crate::error::{ReportError, Result};
use crate::render::{render_coverage, render_table};

const STAGING_SUFFIX: &str = ".tmp";

/// A rendered file waiting to be committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

/// A set of files written together.
#[derive(Debug, Default)]
pub struct OutputBatch {
    files: Vec<OutputFile>,
}

impl OutputBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<PathBuf>, contents: Vec<u8>) {
        self.files.push(OutputFile {
            path: path.into(),
            contents,
        });
    }

    /// Render a mapping table to its conventional path under `output_dir`.
    pub fn add_table(&mut self, output_dir: &Path, table: &MappingTable) -> Result<()> {
        let contents = render_table(table)?;
        self.add(output_dir.join(table.domain.table_path()), contents);
        Ok(())
    }

    pub fn add_coverage(&mut self, path: &Path, report: &CoverageReport) -> Result<()> {
        let contents = render_coverage(report)?;
        self.add(path, contents);
        Ok(())
    }

    pub fn files(&self) -> &[OutputFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Write every file, returning the destination paths in batch order.
    pub fn commit(self) -> Result<Vec<PathBuf>> {
        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(self.files.len());
        let mut created_dirs: Vec<PathBuf> = Vec::new();
        for file in &self.files {
            match stage(file, &mut created_dirs) {
                Ok(temp_path) => staged.push((temp_path, file.path.clone())),
                Err(err) => {
                    discard(staged.iter().map(|(temp, _)| temp.as_path()));
                    remove_empty_dirs(created_dirs);
                    return Err(err);
                }
            }
        }

        for (idx, (temp_path, target_path)) in staged.iter().enumerate() {
            if let Err(source) = fs::rename(temp_path, target_path) {
                discard(staged[idx..].iter().map(|(temp, _)| temp.as_path()));
                remove_empty_dirs(created_dirs);
                return Err(ReportError::AtomicWriteFailed {
                    temp_path: temp_path.clone(),
                    target_path: target_path.clone(),
                    source,
                });
            }
            debug!(path = %target_path.display(), "committed output file");
        }

        info!(files = staged.len(), "wrote output files");
        Ok(staged.into_iter().map(|(_, target)| target).collect())
    }
}

/// Render and write every table under `output_dir`.
pub fn write_tables(output_dir: &Path, tables: &[MappingTable]) -> Result<Vec<PathBuf>> {
    let mut batch = OutputBatch::new();
    for table in tables {
        batch.add_table(output_dir, table)?;
    }
    batch.commit()
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(STAGING_SUFFIX);
    path.with_file_name(name)
}

/// Ancestors of `dir` that do not exist yet, deepest first.
fn missing_ancestors(dir: &Path) -> Vec<PathBuf> {
    dir.ancestors()
        .take_while(|p| !p.as_os_str().is_empty() && !p.exists())
        .map(Path::to_path_buf)
        .collect()
}

fn stage(file: &OutputFile, created_dirs: &mut Vec<PathBuf>) -> Result<PathBuf> {
    if let Some(parent) = file.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        created_dirs.extend(missing_ancestors(parent));
        fs::create_dir_all(parent)
            .map_err(|e| ReportError::io("create directory", parent, e))?;
    }

    let temp_path = staging_path(&file.path);
    let written = File::create(&temp_path)
        .map_err(|e| ReportError::io("create", &temp_path, e))
        .and_then(|mut handle| {
            handle
                .write_all(&file.contents)
                .map_err(|e| ReportError::io("write", &temp_path, e))?;
            handle
                .sync_all()
                .map_err(|e| ReportError::io("sync", &temp_path, e))
        });
    if let Err(err) = written {
        discard([temp_path.as_path()]);
        return Err(err);
    }
    Ok(temp_path)
}

fn discard<'a>(paths: impl IntoIterator<Item = &'a Path>) {
    for path in paths {
        if let Err(err) = fs::remove_file(path)
            && err.kind() != std::io::ErrorKind::NotFound
        {
            warn!(path = %path.display(), error = %err, "failed to remove staged file");
        }
    }
}

/// Remove directories created while staging, deepest first. Directories
/// that are not empty stay.
fn remove_empty_dirs(mut dirs: Vec<PathBuf>) {
    dirs.sort_by_key(|dir| std::cmp::Reverse(dir.components().count()));
    for dir in dirs {
        if let Err(err) = fs::remove_dir(&dir) {
            debug!(path = %dir.display(), error = %err, "kept output directory");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staging_path_keeps_directory() {
        let path = Path::new("mappings/labs/clif_lab_categories.csv");
        assert_eq!(
            staging_path(path),
            PathBuf::from("mappings/labs/clif_lab_categories.csv.tmp")
        );
    }

    #[test]
    fn missing_ancestors_stop_at_existing_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let nested = dir.path().join("mappings/labs");
        assert_eq!(
            missing_ancestors(&nested),
            vec![nested.clone(), dir.path().join("mappings")]
        );
    }
}
