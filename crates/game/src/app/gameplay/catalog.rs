use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use super::tilemap::{TileMap, TileMapError};

const LEVEL_FILE_PREFIX: &str = "level";
const LEVEL_FILE_EXTENSION: &str = "txt";

#[derive(Debug, Error)]
pub(crate) enum CatalogError {
    #[error("failed to list level directory {path}: {source}")]
    ListDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no level*.txt files in {path}")]
    NoLevels { path: PathBuf },
    #[error("failed to read level file {path}: {source}")]
    ReadLevel {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("level {id} is malformed: {source}")]
    BadMap {
        id: String,
        #[source]
        source: TileMapError,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct LevelEntry {
    pub(crate) id: String,
    pub(crate) map: TileMap,
}

/// Every playable level, parsed up front and ordered by file name.
#[derive(Debug, Clone)]
pub(crate) struct LevelCatalog {
    entries: Vec<LevelEntry>,
}

impl LevelCatalog {
    pub(crate) fn load_from_dir(dir: &Path) -> Result<Self, CatalogError> {
        let listing = fs::read_dir(dir).map_err(|source| CatalogError::ListDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut files: Vec<(String, PathBuf)> = listing
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_level_file(path))
            .filter_map(|path| {
                let name = path.file_name()?.to_str()?.to_string();
                Some((name, path))
            })
            .collect();
        files.sort_by(|a, b| a.0.cmp(&b.0));

        let mut sources = Vec::with_capacity(files.len());
        for (_, path) in files {
            let text = fs::read_to_string(&path).map_err(|source| CatalogError::ReadLevel {
                path: path.clone(),
                source,
            })?;
            sources.push((level_id_for(&path), text));
        }

        if sources.is_empty() {
            return Err(CatalogError::NoLevels {
                path: dir.to_path_buf(),
            });
        }
        let catalog = Self::from_sources(sources)?;
        info!(
            dir = %dir.display(),
            level_count = catalog.len(),
            "levels_discovered"
        );
        Ok(catalog)
    }

    pub(crate) fn from_sources(
        sources: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, CatalogError> {
        let mut entries = Vec::new();
        for (id, text) in sources {
            let map = TileMap::parse(&text).map_err(|source| CatalogError::BadMap {
                id: id.clone(),
                source,
            })?;
            entries.push(LevelEntry { id, map });
        }
        if entries.is_empty() {
            return Err(CatalogError::NoLevels {
                path: PathBuf::new(),
            });
        }
        Ok(Self { entries })
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&LevelEntry> {
        self.entries.get(index)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &LevelEntry> {
        self.entries.iter()
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.id.as_str())
    }
}

fn is_level_file(path: &Path) -> bool {
    let has_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == LEVEL_FILE_EXTENSION);
    let has_prefix = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(LEVEL_FILE_PREFIX));
    has_extension && has_prefix
}

fn level_id_for(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_string()
}
