use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::RagError;
use crate::index::VectorIndex;

/// Bumped whenever the persisted layout changes; a mismatch on load is
/// treated as a corrupt artifact rather than silently trusted.
const SCHEMA_VERSION: u32 = 1;

const INDEX_FILE: &str = "index.json";

/// On-disk envelope around a serialized index. The embedding model id is
/// recorded so an index built with one model is never queried with another.
#[derive(Serialize, Deserialize)]
struct PersistedIndex {
    schema_version: u32,
    embedding_model: String,
    index: VectorIndex,
}

/// Durable storage for vector indexes, one subdirectory per content id.
pub struct IndexStore {
    root: PathBuf,
    embedding_model: String,
}

impl IndexStore {
    pub fn new<P: AsRef<Path>>(root: P, embedding_model: &str) -> Self {
        IndexStore {
            root: root.as_ref().to_path_buf(),
            embedding_model: embedding_model.to_string(),
        }
    }

    fn index_path(&self, content_id: &str) -> PathBuf {
        self.root.join(content_id).join(INDEX_FILE)
    }

    /// Whether an index has already been persisted for this content id.
    pub fn exists(&self, content_id: &str) -> bool {
        self.index_path(content_id).exists()
    }

    /// Load a previously persisted index.
    pub fn load(&self, content_id: &str) -> Result<VectorIndex, RagError> {
        let path = self.index_path(content_id);
        debug!("Loading index from {}", path.display());

        let corrupt = |reason: String| RagError::CorruptIndex {
            content_id: content_id.to_string(),
            reason,
        };

        let file = File::open(&path).map_err(|e| corrupt(e.to_string()))?;
        let persisted: PersistedIndex =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| corrupt(e.to_string()))?;

        if persisted.schema_version != SCHEMA_VERSION {
            return Err(corrupt(format!(
                "schema version {} does not match expected {}",
                persisted.schema_version, SCHEMA_VERSION
            )));
        }
        if persisted.embedding_model != self.embedding_model {
            return Err(corrupt(format!(
                "index was built with embedding model {}, expected {}",
                persisted.embedding_model, self.embedding_model
            )));
        }

        info!("Loaded cached index with {} chunks", persisted.index.len());
        Ok(persisted.index)
    }

    /// Persist an index under its content id.
    ///
    /// The artifact is written to a temporary file and renamed into place, so
    /// readers never observe a half-written index.
    pub fn save(&self, content_id: &str, index: &VectorIndex) -> Result<(), RagError> {
        let dir = self.root.join(content_id);
        fs::create_dir_all(&dir)?;

        let persisted = PersistedIndex {
            schema_version: SCHEMA_VERSION,
            embedding_model: self.embedding_model.clone(),
            index: index.clone(),
        };

        let tmp_path = dir.join(format!("{}.tmp", INDEX_FILE));
        let mut writer = BufWriter::new(File::create(&tmp_path)?);
        serde_json::to_writer(&mut writer, &persisted)
            .map_err(|e| RagError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
        writer.flush()?;
        fs::rename(&tmp_path, self.index_path(content_id))?;

        info!(
            "Persisted index with {} chunks under {}",
            index.len(),
            dir.display()
        );
        Ok(())
    }
}
