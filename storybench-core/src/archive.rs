//! Archive Validation
//!
//! Remote stories replay from recorded archives. The archive data file is a
//! JSON document mapping archive files to the stories they contain:
//!
//! ```json
//! { "archives": { "data_001.wpr": ["http://www.testurl.com"] } }
//! ```
//!
//! Archive paths are relative to the data file. Validation only warns; a
//! failed check never stops a run.

use crate::story::Story;
use fxhash::FxHashMap;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors loading archive metadata
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The data file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Archive data file
        path: PathBuf,
        /// Read error
        #[source]
        source: std::io::Error,
    },

    /// The data file is not valid archive JSON
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// Archive data file
        path: PathBuf,
        /// JSON error
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct ArchiveDataFile {
    #[serde(default)]
    archives: BTreeMap<String, Vec<String>>,
}

/// Archive metadata: which archive file holds each story
#[derive(Debug, Clone)]
pub struct ArchiveInfo {
    base_dir: PathBuf,
    archive_for_story: FxHashMap<String, String>,
}

impl ArchiveInfo {
    /// Load archive metadata from a JSON data file
    pub fn from_file(path: &Path) -> Result<Self, ArchiveError> {
        let content = std::fs::read_to_string(path).map_err(|source| ArchiveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::from_json(&content, base_dir).map_err(|source| ArchiveError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse archive metadata; archive paths resolve against `base_dir`
    pub fn from_json(json: &str, base_dir: impl Into<PathBuf>) -> Result<Self, serde_json::Error> {
        let data: ArchiveDataFile = serde_json::from_str(json)?;
        let mut archive_for_story = FxHashMap::default();
        for (archive, stories) in data.archives {
            for story in stories {
                archive_for_story.insert(story, archive.clone());
            }
        }
        Ok(Self {
            base_dir: base_dir.into(),
            archive_for_story,
        })
    }

    /// Path of the archive recording `story`, if one is listed
    pub fn archive_path_for(&self, story: &Story) -> Option<PathBuf> {
        self.archive_for_story
            .get(story.archive_key())
            .map(|archive| self.base_dir.join(archive))
    }
}

/// Check that every remote story has an archive on disk.
///
/// Returns false, after logging a warning, when the data file is not set,
/// the archive info could not be loaded, a remote story is missing from the
/// archive info, or a listed archive file does not exist. Local stories are
/// ignored.
pub fn check_archives(
    archive_data_file: Option<&Path>,
    archive_info: Option<&ArchiveInfo>,
    stories: &[Story],
) -> bool {
    let Some(data_file) = archive_data_file else {
        tracing::warn!("Story set does not specify an archive data file; archives will not be used");
        return false;
    };

    let Some(info) = archive_info else {
        tracing::warn!(
            "Archive data file {} is missing or unreadable",
            data_file.display()
        );
        return false;
    };

    let remote: Vec<&Story> = stories.iter().filter(|s| !s.is_local()).collect();

    let missing_entries: Vec<&str> = remote
        .iter()
        .filter(|s| info.archive_path_for(s).is_none())
        .map(|s| s.archive_key())
        .collect();
    if !missing_entries.is_empty() {
        tracing::warn!(
            "Stories without an archive in {}: {}",
            data_file.display(),
            missing_entries.join(", ")
        );
        return false;
    }

    let missing_files: Vec<String> = remote
        .iter()
        .filter_map(|s| info.archive_path_for(s))
        .filter(|path| !path.exists())
        .map(|path| path.display().to_string())
        .collect();
    if !missing_files.is_empty() {
        tracing::warn!("Archive files not found: {}", missing_files.join(", "));
        return false;
    }

    true
}
