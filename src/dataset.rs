//! Persisted dataset and chord reference table.
//!
//! The dataset is a single pretty-printed JSON document that names its own
//! schema and field list, so a display layer can load it with nothing but a
//! JSON parser. Writes go to a temporary file in the destination directory
//! and are then renamed over the target: a reader never sees half a file,
//! and a crash mid-write leaves the previous checkpoint intact.

use crate::error::ScrapeError;
use crate::model::SongRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Schema name written to every dataset file.
pub const SCHEMA_NAME: &str = "songsheet-dataset";

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Field names of [`SongRecord`], in serialisation order.
pub const RECORD_FIELDS: [&str; 8] = [
    "title",
    "artist",
    "difficulty",
    "book",
    "page",
    "url",
    "chords",
    "body",
];

/// A collection of song records plus its self-description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub schema: String,
    pub version: u32,
    pub fields: Vec<String>,
    pub songs: Vec<SongRecord>,
}

impl Default for Dataset {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Accepts both the current document layout and a bare array of records.
#[derive(Deserialize)]
#[serde(untagged)]
enum DatasetFile {
    Document(Dataset),
    Records(Vec<SongRecord>),
}

impl Dataset {
    pub fn new(songs: Vec<SongRecord>) -> Self {
        Self {
            schema: SCHEMA_NAME.to_string(),
            version: SCHEMA_VERSION,
            fields: RECORD_FIELDS.iter().map(|f| f.to_string()).collect(),
            songs,
        }
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Parse a dataset from JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(match serde_json::from_str(json)? {
            DatasetFile::Document(d) => d,
            DatasetFile::Records(songs) => Self::new(songs),
        })
    }

    /// Load a dataset file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ScrapeError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ScrapeError::DatasetRead {
                path: path.to_path_buf(),
                source: e,
            })?;
        let dataset = Self::from_json(&text).map_err(|e| ScrapeError::DatasetFormat {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!("Loaded {} records from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    /// Load a dataset file, or return an empty dataset if it does not exist.
    pub async fn load_or_empty(path: impl AsRef<Path>) -> Result<Self, ScrapeError> {
        let path = path.as_ref();
        match tokio::fs::try_exists(path).await {
            Ok(true) => Self::load(path).await,
            Ok(false) => Ok(Self::default()),
            Err(e) => Err(ScrapeError::DatasetRead {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    /// Write the dataset atomically (temp file + rename).
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), ScrapeError> {
        let path = path.as_ref().to_path_buf();
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| ScrapeError::Internal(format!("dataset serialisation: {e}")))?;

        let target = path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&target, &json))
            .await
            .map_err(|e| ScrapeError::Internal(format!("dataset write task panicked: {e}")))?
            .map_err(|e| ScrapeError::DatasetWrite {
                path: path.clone(),
                source: e,
            })?;

        info!("Wrote {} records to {}", self.len(), path.display());
        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ── Chord reference table ────────────────────────────────────────────────

/// A chord name and the diagram image that shows how to play it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordDefinition {
    pub name: String,
    pub path: PathBuf,
}

/// Chord diagrams keyed by name, matched case-insensitively.
///
/// Names produced by [`crate::pipeline::chords::find_chords`] join against
/// this table by exact case-insensitive comparison. The table is loaded by
/// the caller and handed to whoever needs it; reloading means building a
/// new one.
#[derive(Debug, Clone, Default)]
pub struct ChordLibrary {
    definitions: Vec<ChordDefinition>,
    index: HashMap<String, usize>,
}

impl ChordLibrary {
    /// Build a library; later duplicates of a name are ignored.
    pub fn new(definitions: Vec<ChordDefinition>) -> Self {
        let mut index = HashMap::with_capacity(definitions.len());
        for (i, def) in definitions.iter().enumerate() {
            index.entry(def.name.trim().to_lowercase()).or_insert(i);
        }
        Self { definitions, index }
    }

    /// Parse a JSON array of `{"name": ..., "path": ...}` objects.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let defs: Vec<ChordDefinition> = serde_json::from_str(json)?;
        Ok(Self::new(defs))
    }

    /// Load a chord library file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ScrapeError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ScrapeError::DatasetRead {
                path: path.to_path_buf(),
                source: e,
            })?;
        Self::from_json(&text).map_err(|e| ScrapeError::DatasetFormat {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Exact, case-insensitive lookup.
    pub fn lookup(&self, name: &str) -> Option<&ChordDefinition> {
        self.index
            .get(&name.trim().to_lowercase())
            .map(|&i| &self.definitions[i])
    }

    /// Diagrams for the chords of one song, in the song's order. Chords
    /// without a diagram are skipped.
    pub fn diagrams_for<'a>(&'a self, chords: &[String]) -> Vec<&'a ChordDefinition> {
        chords.iter().filter_map(|c| self.lookup(c)).collect()
    }
}
