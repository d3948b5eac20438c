//! Library and runtime registry.
//!
//! Loaded once from `libraries.yaml` and validated eagerly, so an
//! inconsistent entry fails the invocation before anything is fetched or
//! built.

use serde::Deserialize;
use serde_yaml_ng::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use url::Url;

use crate::config::WILDCARD_RUNTIME;
use crate::error::{Error, Result};

/// Upstream source archive of a library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub url: String,
    /// Final path segment of the URL; the local file name.
    pub filename: String,
}

impl Source {
    fn parse(id: &str, url: &str) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|e| {
            Error::Config(format!("library '{}': invalid source URL '{}': {}", id, url, e))
        })?;
        let segment = parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .ok_or_else(|| {
                Error::Config(format!(
                    "library '{}': source URL '{}' has no file name",
                    id, url
                ))
            })?;
        // The downloader saves under the decoded name.
        let filename = urlencoding::decode(segment)
            .map_err(|e| {
                Error::Config(format!(
                    "library '{}': source URL '{}' has an undecodable file name: {}",
                    id, url, e
                ))
            })?
            .into_owned();
        Ok(Self {
            url: url.to_string(),
            filename,
        })
    }
}

/// One declared third-party library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    pub id: String,
    pub lang: String,
    pub name: String,
    pub version: String,
    pub runtime: String,
    pub source: Option<Source>,
    pub build_script: Option<String>,
    pub build_image: Option<String>,
    pub homepage: Option<String>,
}

impl LibraryEntry {
    /// Build environment for this library; defaults to its runtime.
    pub fn build_image(&self) -> &str {
        self.build_image.as_deref().unwrap_or(&self.runtime)
    }

    pub fn source_url(&self) -> Option<&str> {
        self.source.as_ref().map(|s| s.url.as_str())
    }
}

/// A named base environment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuntimeEntry {
    pub runtime: String,
}

impl RuntimeEntry {
    pub fn is_wildcard(&self) -> bool {
        self.runtime == WILDCARD_RUNTIME
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawLibrary {
    lang: Option<Value>,
    name: Option<Value>,
    version: Option<Value>,
    runtime: Option<Value>,
    source: Option<String>,
    build_script: Option<String>,
    build_image: Option<String>,
    homepage: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    libraries: BTreeMap<String, RawLibrary>,
    #[serde(default)]
    runtimes: Vec<RuntimeEntry>,
}

/// Render a scalar as a string. Versions such as `2.0` or `20240101`
/// arrive as YAML numbers when unquoted.
fn scalar(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn required(id: &str, field: &'static str, value: Option<Value>) -> Result<String> {
    value
        .and_then(scalar)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::MissingField {
            id: id.to_string(),
            field,
        })
}

/// The library/runtime catalog.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    libraries: BTreeMap<String, LibraryEntry>,
    runtimes: Vec<RuntimeEntry>,
}

impl Registry {
    /// Load and validate the registry file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Config(format!(
                "registry file not found: {}",
                path.display()
            )));
        }
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let file: RegistryFile =
            serde_yaml_ng::from_str(&content).map_err(|e| Error::yaml(path, e))?;
        let registry = Self::from_file(file)?;
        tracing::debug!(
            libraries = registry.libraries.len(),
            runtimes = registry.runtimes.len(),
            "loaded registry from {}",
            path.display()
        );
        Ok(registry)
    }

    /// Parse a registry from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file: RegistryFile = serde_yaml_ng::from_str(content)
            .map_err(|e| Error::Config(format!("malformed registry: {}", e)))?;
        Self::from_file(file)
    }

    fn from_file(file: RegistryFile) -> Result<Self> {
        let mut declared = BTreeSet::new();
        for rt in &file.runtimes {
            if !declared.insert(rt.runtime.as_str()) {
                return Err(Error::Config(format!(
                    "runtime '{}' declared more than once",
                    rt.runtime
                )));
            }
        }

        let mut libraries = BTreeMap::new();
        for (id, raw) in file.libraries {
            let lang = required(&id, "lang", raw.lang)?;
            let name = required(&id, "name", raw.name)?;
            let version = required(&id, "version", raw.version)?;
            let runtime = required(&id, "runtime", raw.runtime)?;

            if !declared.contains(runtime.as_str()) {
                return Err(Error::Config(format!(
                    "library '{}' references undeclared runtime '{}'",
                    id, runtime
                )));
            }
            if raw.build_script.is_some() && raw.source.is_none() {
                return Err(Error::Config(format!(
                    "library '{}' has a build-script but no source",
                    id
                )));
            }
            let source = raw
                .source
                .as_deref()
                .map(|url| Source::parse(&id, url))
                .transpose()?;

            let entry = LibraryEntry {
                id: id.clone(),
                lang,
                name,
                version,
                runtime,
                source,
                build_script: raw.build_script,
                build_image: raw.build_image,
                homepage: raw.homepage,
            };
            libraries.insert(id, entry);
        }

        Ok(Self {
            libraries,
            runtimes: file.runtimes,
        })
    }

    /// Look up a library by id.
    pub fn lookup(&self, id: &str) -> Result<&LibraryEntry> {
        self.libraries
            .get(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// All libraries, sorted by id.
    pub fn libraries(&self) -> impl Iterator<Item = &LibraryEntry> {
        self.libraries.values()
    }

    /// Declared runtimes, in file order.
    pub fn runtimes(&self) -> &[RuntimeEntry] {
        &self.runtimes
    }

    /// Libraries scoped to a runtime; every library for the wildcard.
    pub fn libraries_for_runtime<'a>(
        &'a self,
        runtime: &'a RuntimeEntry,
    ) -> impl Iterator<Item = &'a LibraryEntry> + 'a {
        self.libraries
            .values()
            .filter(move |lib| runtime.is_wildcard() || lib.runtime == runtime.runtime)
    }
}
