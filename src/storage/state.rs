//! Persisted sync state (`{"last_sync": "..."}`)

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tempfile::NamedTempFile;

use crate::error::Result;

const LAST_SYNC_KEY: &str = "last_sync";

/// Reads and writes the last-successful-sync timestamp.
///
/// The state file is a small JSON object; keys other than `last_sync` are
/// preserved on write.
#[derive(Debug, Clone)]
pub struct StateTracker {
    path: PathBuf,
}

impl StateTracker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last recorded sync timestamp; `None` if missing, unreadable or empty
    pub fn read_last_sync(&self) -> Option<String> {
        let mut state = self.read_state()?;
        match state.remove(LAST_SYNC_KEY) {
            Some(Value::String(ts)) if !ts.trim().is_empty() => Some(ts),
            _ => None,
        }
    }

    /// Record a sync timestamp, replacing the file atomically
    pub fn write_last_sync(&self, timestamp: &str) -> Result<()> {
        let mut state = self.read_state().unwrap_or_default();
        state.insert(
            LAST_SYNC_KEY.to_string(),
            Value::String(timestamp.to_string()),
        );

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, &state)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        tracing::debug!("Recorded last sync {} in {}", timestamp, self.path.display());
        Ok(())
    }

    fn read_state(&self) -> Option<Map<String, Value>> {
        let content = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Some(map),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Ignoring unparsable state file {}: {}", self.path.display(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let state = StateTracker::new(dir.path().join(".last-sync"));
        assert_eq!(state.read_last_sync(), None);
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let state = StateTracker::new(dir.path().join("nested/dir/.last-sync"));

        state.write_last_sync("2024-01-15T10:30:00Z").unwrap();
        assert_eq!(
            state.read_last_sync().as_deref(),
            Some("2024-01-15T10:30:00Z")
        );

        state.write_last_sync("2024-02-01T00:00:00Z").unwrap();
        assert_eq!(
            state.read_last_sync().as_deref(),
            Some("2024-02-01T00:00:00Z")
        );
    }

    #[test]
    fn test_preserves_other_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, r#"{"last_sync": "old", "images": {"count": 3}}"#).unwrap();

        let state = StateTracker::new(&path);
        state.write_last_sync("2024-01-15T10:30:00Z").unwrap();

        let value: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["last_sync"], "2024-01-15T10:30:00Z");
        assert_eq!(value["images"]["count"], 3);
    }

    #[test]
    fn test_unparsable_or_empty_is_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        let state = StateTracker::new(&path);

        for content in ["", "not json", "[1, 2]", r#"{"last_sync": ""}"#, r#"{"last_sync": 5}"#] {
            fs::write(&path, content).unwrap();
            assert_eq!(state.read_last_sync(), None, "{content:?}");
        }
    }

    #[test]
    fn test_write_over_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{{{").unwrap();

        let state = StateTracker::new(&path);
        state.write_last_sync("2024-01-15T10:30:00Z").unwrap();
        assert_eq!(
            state.read_last_sync().as_deref(),
            Some("2024-01-15T10:30:00Z")
        );
    }
}
