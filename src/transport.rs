//! Input discovery and line reading for raw text sources.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::errors::PipelineError;

/// Expand a source argument into concrete input files.
///
/// A file path is used as-is; a directory is walked recursively and
/// contributes its `.txt` files in sorted order so runs are stable
/// across filesystems.
pub fn collect_input_files(root: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    if !root.is_dir() {
        return Err(PipelineError::SourceUnreadable {
            path: root.display().to_string(),
            reason: "not a file or directory".into(),
        });
    }
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().to_path_buf())
        .filter(|path| is_text_file(path))
        .collect();
    files.sort();
    Ok(files)
}

/// True if the path has a `.txt` extension (case-insensitive).
pub fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("txt"))
        .unwrap_or(false)
}

/// Read a source file into lines, mapping failures to a fatal source error.
pub fn read_lines(path: &Path) -> Result<Vec<String>, PipelineError> {
    let raw = fs::read_to_string(path).map_err(|err| PipelineError::SourceUnreadable {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;
    Ok(raw.lines().map(str::to_string).collect())
}
