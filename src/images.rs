//! Runtime image inventory.
//!
//! For each declared runtime, finds its image, reads the installed records
//! baked into it and compares them against the registry.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::cache::ImageCache;
use crate::config::{Config, IMAGE_RECORDS_DIR};
use crate::process::Cmd;
use crate::record::{parse_record_stream, InstalledRecord};
use crate::registry::{LibraryEntry, Registry, RuntimeEntry};
use crate::table::Table;

/// One line of `docker image ls --format '{{json .}}'`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageMeta {
    pub repository: String,
    pub tag: String,
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub size: String,
}

/// Container engine queries used by the inventory.
pub trait ContainerEngine {
    /// Newest image with this repository name, if any.
    fn find_image(&self, name: &str) -> Result<Option<ImageMeta>>;

    /// Concatenated installed records inside the image, as a
    /// multi-document YAML stream.
    fn introspect(&self, image_id: &str) -> Result<String>;
}

/// Docker CLI.
#[derive(Debug, Clone)]
pub struct DockerEngine {
    program: String,
}

impl DockerEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

/// Shell run inside the image (not on the host) to dump its records.
fn introspect_script() -> String {
    format!(
        "for f in {}/*.yaml; do [ -f \"$f\" ] || continue; echo ---; cat \"$f\"; done",
        IMAGE_RECORDS_DIR
    )
}

impl ContainerEngine for DockerEngine {
    fn find_image(&self, name: &str) -> Result<Option<ImageMeta>> {
        let result = Cmd::new(&self.program)
            .args(["image", "ls", "--format", "{{json .}}", name])
            .error_msg(format!("listing images for {} failed", name))
            .run()?;
        parse_image_list(&result.stdout)
    }

    fn introspect(&self, image_id: &str) -> Result<String> {
        let result = Cmd::new(&self.program)
            .args(["run", "--rm", image_id, "/bin/sh", "-c"])
            .arg(introspect_script())
            .error_msg(format!("introspecting image {} failed", image_id))
            .run()?;
        Ok(result.stdout)
    }
}

/// First image in `docker image ls` JSON-lines output.
pub fn parse_image_list(output: &str) -> Result<Option<ImageMeta>> {
    match output.lines().map(str::trim).find(|l| !l.is_empty()) {
        Some(line) => {
            let meta = serde_json::from_str(line)
                .with_context(|| format!("unexpected image listing: {}", line))?;
            Ok(Some(meta))
        }
        None => Ok(None),
    }
}

/// A runtime image and the libraries installed in it.
#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub meta: ImageMeta,
    pub installed: BTreeMap<String, InstalledRecord>,
}

/// Installed-vs-declared state of one library in an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryStatus {
    Ok,
    Outdated(String),
    Missing,
}

impl LibraryStatus {
    pub fn of(lib: &LibraryEntry, installed: Option<&InstalledRecord>) -> Self {
        match installed {
            Some(record) if record.version == lib.version => LibraryStatus::Ok,
            Some(record) => LibraryStatus::Outdated(record.version.clone()),
            None => LibraryStatus::Missing,
        }
    }

    pub fn label(&self) -> String {
        match self {
            LibraryStatus::Ok => "OK".to_string(),
            LibraryStatus::Outdated(v) => format!("OUTDATED ({})", v),
            LibraryStatus::Missing => "MISSING".to_string(),
        }
    }
}

pub struct Inventory<'a, E: ContainerEngine> {
    registry: &'a Registry,
    config: &'a Config,
    cache: ImageCache<'a>,
    engine: E,
}

impl<'a, E: ContainerEngine> Inventory<'a, E> {
    pub fn new(registry: &'a Registry, config: &'a Config, engine: E) -> Self {
        Self {
            registry,
            config,
            cache: ImageCache::new(config),
            engine,
        }
    }

    /// Look up and introspect a runtime's image. `None` if not built.
    pub fn image_info(&self, runtime: &RuntimeEntry) -> Result<Option<ImageInfo>> {
        let name = self.config.runtime_image(&runtime.runtime);
        let Some(meta) = self.engine.find_image(&name)? else {
            return Ok(None);
        };

        let stream = match self.cache.get(&meta.id) {
            Some(cached) => cached,
            None => {
                let output = self.engine.introspect(&meta.id)?;
                if let Err(e) = self.cache.put(&meta.id, &output) {
                    tracing::warn!("failed to cache introspection of {}: {}", meta.id, e);
                }
                output
            }
        };

        let records = parse_record_stream(&stream)
            .with_context(|| format!("bad installed records in image {}", meta.id))?;
        let installed = records.into_iter().map(|r| (r.id.clone(), r)).collect();
        Ok(Some(ImageInfo { meta, installed }))
    }

    /// Render the whole inventory report.
    pub fn render(&self) -> Result<String> {
        let mut out = String::new();
        for runtime in self.registry.runtimes() {
            let name = self.config.runtime_image(&runtime.runtime);
            match self.image_info(runtime)? {
                None => {
                    out.push_str(&format!("{}  (image not built)\n\n", name));
                }
                Some(info) => {
                    out.push_str(&format!(
                        "{}:{}  id={}  created={}  size={}\n",
                        info.meta.repository,
                        info.meta.tag,
                        info.meta.id,
                        info.meta.created_at,
                        info.meta.size
                    ));
                    let mut table =
                        Table::new(["ID", "Name", "Declared", "Installed", "Status"]);
                    for lib in self.registry.libraries_for_runtime(runtime) {
                        let record = info.installed.get(&lib.id);
                        table.push([
                            lib.id.clone(),
                            lib.name.clone(),
                            lib.version.clone(),
                            record.map(|r| r.version.clone()).unwrap_or_else(|| "-".into()),
                            LibraryStatus::of(lib, record).label(),
                        ]);
                    }
                    out.push_str(&table.render_fixed("  "));
                    out.push('\n');
                }
            }
        }
        Ok(out)
    }
}
