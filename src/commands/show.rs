//! Report commands - list libraries, update the README, list images.

use anyhow::{bail, Context, Result};
use std::fs;

use crate::common::write_file_atomic;
use crate::config::Config;
use crate::images::{ContainerEngine, DockerEngine, Inventory};
use crate::registry::Registry;
use crate::table::{self, README_BEGIN, README_END};

/// Print every declared library as a fixed-width table.
pub fn cmd_list(registry: &Registry) -> Result<()> {
    print!("{}", table::library_table(registry).render_fixed(""));
    Ok(())
}

/// Regenerate the library table inside the README.
///
/// Returns whether the file changed.
pub fn cmd_update_readme(config: &Config, registry: &Registry) -> Result<bool> {
    let path = &config.readme_path;
    let document = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let generated = table::library_table_markdown(registry);
    let Some(updated) = table::replace_region(&document, &generated) else {
        bail!(
            "{} must contain '{}' followed by '{}'",
            path.display(),
            README_BEGIN,
            README_END
        );
    };

    if updated == document {
        println!("{} is up to date", path.display());
        return Ok(false);
    }
    write_file_atomic(path, updated)?;
    println!("Updated {}", path.display());
    Ok(true)
}

/// Print image metadata and installed-vs-declared status per runtime.
pub fn cmd_list_images(config: &Config, registry: &Registry) -> Result<()> {
    list_images_with(config, registry, DockerEngine::new(&config.engine))
}

/// [`cmd_list_images`] with an explicit container engine.
pub fn list_images_with<E: ContainerEngine>(
    config: &Config,
    registry: &Registry,
    engine: E,
) -> Result<()> {
    let inventory = Inventory::new(registry, config, engine);
    print!("{}", inventory.render()?);
    Ok(())
}
