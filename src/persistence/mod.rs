//! Save/load persistence on disk
//!
//! Features:
//! - Versioned JSON envelope (`{ "version": 1, "payload": ... }`)
//! - Atomic writes (tmp file, then rename)
//! - Missing files are not errors; they load as `None`

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current on-disk format version
pub const FORMAT_VERSION: u32 = 1;

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "HIGHWAY_ESCAPE_DATA";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported format version {found} (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },
}

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    payload: T,
}

/// Directory of JSON documents, one file per key
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `$HIGHWAY_ESCAPE_DATA`, or `.highway-escape` in the working directory
    pub fn default_dir() -> PathBuf {
        std::env::var_os(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".highway-escape"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Load a document; `Ok(None)` when nothing has been saved under `key`
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PersistError> {
        let path = self.path_for(key);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let envelope: Envelope<serde_json::Value> = serde_json::from_str(&json)?;
        if envelope.version != FORMAT_VERSION {
            return Err(PersistError::VersionMismatch {
                found: envelope.version,
                expected: FORMAT_VERSION,
            });
        }
        Ok(Some(serde_json::from_value(envelope.payload)?))
    }

    /// Write a document, replacing any previous one atomically
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), PersistError> {
        fs::create_dir_all(&self.dir)?;
        let envelope = Envelope {
            version: FORMAT_VERSION,
            payload: value,
        };
        let json = serde_json::to_string_pretty(&envelope)?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::temp_store;
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        name: String,
        value: u32,
    }

    #[test]
    fn test_missing_document_loads_none() {
        let store = temp_store("missing");
        let loaded: Option<Doc> = store.load("nothing").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_save_then_load() {
        let store = temp_store("save");
        let doc = Doc {
            name: "lane".into(),
            value: 3,
        };
        store.save("doc", &doc).unwrap();
        assert_eq!(store.load::<Doc>("doc").unwrap(), Some(doc));
        assert!(!store.path_for("doc").with_extension("json.tmp").exists());
    }

    #[test]
    fn test_envelope_is_versioned() {
        let store = temp_store("envelope");
        store.save("doc", &Doc { name: "x".into(), value: 1 }).unwrap();
        let raw = std::fs::read_to_string(store.path_for("doc")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], FORMAT_VERSION);
        assert_eq!(value["payload"]["value"], 1);
    }

    #[test]
    fn test_future_version_rejected() {
        let store = temp_store("version");
        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(
            store.path_for("doc"),
            r#"{"version": 99, "payload": {"name": "x", "value": 1}}"#,
        )
        .unwrap();
        let err = store.load::<Doc>("doc").unwrap_err();
        assert!(matches!(
            err,
            PersistError::VersionMismatch { found: 99, expected: FORMAT_VERSION }
        ));
    }

    #[test]
    fn test_corrupt_file_is_json_error() {
        let store = temp_store("corrupt");
        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(store.path_for("doc"), "{not json").unwrap();
        assert!(matches!(store.load::<Doc>("doc"), Err(PersistError::Json(_))));
    }
}
