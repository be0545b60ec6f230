use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use iso_engine::storage::{read_text_if_exists, write_text_atomic};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub(crate) const SCORES_FILE_NAME: &str = "scores.json";
const MAX_ENTRIES_PER_LEVEL: usize = 30;

/// One high-score row. Field names are kept short on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ScoreEntry {
    #[serde(rename = "n")]
    pub(crate) name: String,
    #[serde(rename = "s")]
    pub(crate) score: u32,
}

/// Level id to entries, best first.
type ScoreTable = BTreeMap<String, Vec<ScoreEntry>>;

#[derive(Debug, Error)]
enum ScoreFileError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path} at {at}: {source}")]
    Parse {
        path: PathBuf,
        at: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode score table: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// High scores per level in a single JSON file. The file is read in full for every query
/// and rewritten in full for every insert. A missing, unreadable or corrupt file reads as
/// an empty table.
#[derive(Debug, Clone)]
pub(crate) struct ScoreBoard {
    path: PathBuf,
}

impl ScoreBoard {
    pub(crate) fn in_dir(saves_dir: &Path) -> Self {
        Self {
            path: saves_dir.join(SCORES_FILE_NAME),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Inserts a score and keeps the best entries for the level. Equal scores keep their
    /// insertion order. Write failures are logged and otherwise ignored.
    pub(crate) fn add_score(&self, level: &str, name: &str, score: u32) {
        let mut table = self.load();
        let entries = table.entry(level.to_string()).or_default();
        entries.push(ScoreEntry {
            name: name.to_string(),
            score,
        });
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_ENTRIES_PER_LEVEL);

        match self.store(&table) {
            Ok(()) => info!(level, name, score, "score_saved"),
            Err(error) => warn!(error = %error, level, score, "score_save_failed"),
        }
    }

    /// Up to `n` entries for the level, best first.
    pub(crate) fn top(&self, level: &str, n: usize) -> Vec<ScoreEntry> {
        let mut table = self.load();
        let mut entries = table.remove(level).unwrap_or_default();
        entries.truncate(n);
        entries
    }

    fn load(&self) -> ScoreTable {
        match self.read_table() {
            Ok(table) => table,
            Err(error) => {
                warn!(error = %error, "score_file_unreadable");
                ScoreTable::new()
            }
        }
    }

    fn read_table(&self) -> Result<ScoreTable, ScoreFileError> {
        let raw = read_text_if_exists(&self.path).map_err(|source| ScoreFileError::Read {
            path: self.path.clone(),
            source,
        })?;
        let Some(raw) = raw else {
            return Ok(ScoreTable::new());
        };
        let mut deserializer = serde_json::Deserializer::from_str(&raw);
        serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            let at = error.path().to_string();
            ScoreFileError::Parse {
                path: self.path.clone(),
                at,
                source: error.into_inner(),
            }
        })
    }

    fn store(&self, table: &ScoreTable) -> Result<(), ScoreFileError> {
        let json = serde_json::to_string_pretty(table)?;
        write_text_atomic(&self.path, &json).map_err(|source| ScoreFileError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
