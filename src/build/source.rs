//! Topic discovery and loading.

use std::path::{Path, PathBuf};

use crate::transform::{ParseError, Topic, parse_topic};

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("topic path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("topic path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read directory entry in {path}: {source}")]
    ReadEntry {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read topic {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse topic {path}: {source}")]
    Parse { path: PathBuf, source: ParseError },
}

// =============================================================================
// Discovery
// =============================================================================

/// Find all `*.xml` topic files below `dir`, sorted by path.
pub fn discover_topics(dir: &Path) -> Result<Vec<PathBuf>, SourceError> {
    if !dir.exists() {
        return Err(SourceError::PathNotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(SourceError::NotADirectory(dir.to_path_buf()));
    }

    let mut topics = Vec::new();
    walk_directory(dir, &mut topics)?;
    topics.sort();
    Ok(topics)
}

/// Recursively walk a directory and collect topic files.
fn walk_directory(dir: &Path, topics: &mut Vec<PathBuf>) -> Result<(), SourceError> {
    let entries = std::fs::read_dir(dir).map_err(|e| SourceError::ReadDir {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| SourceError::ReadEntry {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();
        let file_name = entry.file_name();

        // Skip hidden files and directories
        if file_name.to_string_lossy().starts_with('.') {
            continue;
        }

        if path.is_dir() {
            walk_directory(&path, topics)?;
        } else if path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
        {
            topics.push(path);
        }
    }

    Ok(())
}

/// Read and parse one topic file. The file stem is the fallback topic id.
pub fn load_topic(path: &Path) -> Result<Topic, SourceError> {
    let xml = std::fs::read_to_string(path).map_err(|source| SourceError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let fallback_id = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_topic(&xml, &fallback_id).map_err(|source| SourceError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
