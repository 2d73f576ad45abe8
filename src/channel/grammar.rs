//! Per-channel grammar registry.
//!
//! Maps content-ids to persisted grammar artifacts on disk. Mutated only
//! by DEFINE-GRAMMAR requests on the worker thread; grammar persistence is
//! local file I/O and treated as bounded.

use crate::error::Result;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug)]
pub struct GrammarRegistry {
    dir: PathBuf,
    channel_id: String,
    entries: HashMap<String, PathBuf>,
}

impl GrammarRegistry {
    /// Creates an empty registry rooted at `dir`. The directory itself is
    /// prepared by the worker at channel open.
    pub fn new(dir: impl Into<PathBuf>, channel_id: &str) -> Self {
        Self {
            dir: dir.into(),
            channel_id: channel_id.to_string(),
            entries: HashMap::new(),
        }
    }

    /// Ensures the artifact directory exists. Called once by the worker
    /// before it acknowledges channel open.
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Persists a grammar body for `content_id`, replacing any prior
    /// artifact under the same id, and returns the artifact path.
    pub fn store(&mut self, content_id: &str, grammar: &str) -> Result<PathBuf> {
        let path = self.artifact_path(content_id);
        info!(
            channel = %self.channel_id,
            path = %path.display(),
            "create grammar file"
        );
        fs::write(&path, grammar)?;
        self.entries.insert(content_id.to_string(), path.clone());
        Ok(path)
    }

    /// Removes the artifact and mapping for `content_id`. No-op if the id
    /// is unknown; a failing file removal is logged, not surfaced — the
    /// mapping is gone either way.
    pub fn remove(&mut self, content_id: &str) {
        if let Some(path) = self.entries.remove(content_id) {
            info!(
                channel = %self.channel_id,
                path = %path.display(),
                "remove grammar file"
            );
            if let Err(err) = fs::remove_file(&path) {
                warn!(
                    channel = %self.channel_id,
                    path = %path.display(),
                    error = %err,
                    "failed to remove grammar file"
                );
            }
        }
    }

    /// Removes every mapping and its backing artifact. Idempotent; called
    /// once at channel shutdown.
    pub fn clear(&mut self) {
        for (_, path) in self.entries.drain() {
            info!(
                channel = %self.channel_id,
                path = %path.display(),
                "remove grammar file"
            );
            if let Err(err) = fs::remove_file(&path) {
                warn!(
                    channel = %self.channel_id,
                    path = %path.display(),
                    error = %err,
                    "failed to remove grammar file"
                );
            }
        }
    }

    /// Path of the persisted artifact for `content_id`, if defined.
    pub fn path(&self, content_id: &str) -> Option<&Path> {
        self.entries.get(content_id).map(PathBuf::as_path)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn artifact_path(&self, content_id: &str) -> PathBuf {
        self.dir
            .join(format!("{}-{}.gram", self.channel_id, content_id))
    }
}
