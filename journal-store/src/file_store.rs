//! JSON file store: one document per position.
//!
//! Layout: `<data_dir>/positions/<id>.json`. Writes go to a sibling temp file
//! and are renamed into place, so a crash never leaves a half-written document.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use journal_core::{Position, PositionId, PositionStore, StoreError};

/// Current schema version for persisted position documents.
pub const SCHEMA_VERSION: u32 = 1;

const POSITIONS_DIR: &str = "positions";
const EXTENSION: &str = "json";

/// On-disk envelope around a position.
#[derive(Debug, Serialize, Deserialize)]
struct StoredPosition {
    schema_version: u32,
    position: Position,
}

/// File-backed [`PositionStore`].
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open (creating if needed) a store rooted at `data_dir`.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = data_dir.as_ref().join(POSITIONS_DIR);
        fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), "file store opened");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn contains(&self, id: &PositionId) -> bool {
        self.position_path(id).is_ok_and(|path| path.exists())
    }

    /// Path of the document for `id`. IDs must be plain file stems.
    fn position_path(&self, id: &PositionId) -> Result<PathBuf, StoreError> {
        let stem = id.as_str();
        let valid = !stem.is_empty()
            && stem
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidId(id.clone()));
        }
        Ok(self.dir.join(format!("{stem}.{EXTENSION}")))
    }
}

impl PositionStore for JsonFileStore {
    fn load(&self, id: &PositionId) -> Result<Position, StoreError> {
        let path = self.position_path(id)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.clone()))
            }
            Err(e) => return Err(e.into()),
        };
        let stored: StoredPosition =
            serde_json::from_str(&content).map_err(|source| StoreError::Serialization {
                id: id.to_string(),
                source,
            })?;
        if stored.schema_version != SCHEMA_VERSION {
            warn!(
                position = %id,
                found = stored.schema_version,
                expected = SCHEMA_VERSION,
                "position document has a different schema version"
            );
        }
        Ok(stored.position)
    }

    fn save(&mut self, position: &Position) -> Result<(), StoreError> {
        let id = position.id();
        let stored = StoredPosition {
            schema_version: SCHEMA_VERSION,
            position: position.clone(),
        };
        let json =
            serde_json::to_string_pretty(&stored).map_err(|source| StoreError::Serialization {
                id: id.to_string(),
                source,
            })?;

        let path = self.position_path(id)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        info!(position = %id, status = %position.status(), "position saved");
        Ok(())
    }

    fn delete(&mut self, id: &PositionId) -> Result<(), StoreError> {
        let path = self.position_path(id)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(position = %id, "position deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> Result<Vec<PositionId>, StoreError> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(PositionId::new(stem));
            }
        }
        ids.sort();
        Ok(ids)
    }
}
