//! Installed records.
//!
//! One small YAML file per library proving that its build succeeded at a
//! given version. Only the reconciler creates these, and only after the
//! build has exited successfully.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::common::{remove_if_exists, write_file_atomic};
use crate::error::{Error, Result};
use crate::registry::LibraryEntry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct InstalledRecord {
    pub id: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    pub lang: String,
}

impl InstalledRecord {
    /// Record describing `lib` as declared right now.
    pub fn from_library(lib: &LibraryEntry) -> Self {
        Self {
            id: lib.id.clone(),
            name: lib.name.clone(),
            version: lib.version.clone(),
            source: lib.source_url().map(str::to_string),
            homepage: lib.homepage.clone(),
            lang: lib.lang.clone(),
        }
    }

    /// Read a record. `Ok(None)` when no record exists.
    pub fn read(path: &Path) -> Result<Option<Self>> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::io(path, e)),
        };
        serde_yaml_ng::from_str(&content)
            .map(Some)
            .map_err(|e| Error::yaml(path, e))
    }

    /// Write the record atomically, replacing any previous one.
    pub fn write(&self, path: &Path) -> Result<()> {
        let content = serde_yaml_ng::to_string(self).map_err(|e| Error::yaml(path, e))?;
        write_file_atomic(path, content)
    }

    /// Delete the record at `path` if present.
    pub fn remove(path: &Path) -> Result<bool> {
        remove_if_exists(path)
    }
}

/// Parse a multi-document YAML stream of records, as produced by
/// concatenating record files inside a runtime image.
pub fn parse_record_stream(content: &str) -> std::result::Result<Vec<InstalledRecord>, serde_yaml_ng::Error> {
    let mut records = Vec::new();
    for document in serde_yaml_ng::Deserializer::from_str(content) {
        let value = serde_yaml_ng::Value::deserialize(document)?;
        if value.is_null() {
            continue;
        }
        records.push(serde_yaml_ng::from_value(value)?);
    }
    Ok(records)
}
