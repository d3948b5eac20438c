//! Image introspection cache.
//!
//! Introspecting a runtime image means starting a container, so the output
//! is kept on disk keyed by image id. An image id names immutable content,
//! and entries are never invalidated: a rebuilt image gets a new id.

use std::fs;

use crate::common::write_file_atomic;
use crate::config::Config;
use crate::error::Result;

pub struct ImageCache<'a> {
    config: &'a Config,
}

impl<'a> ImageCache<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Cached introspection output for an image, if any.
    pub fn get(&self, image_id: &str) -> Option<String> {
        let path = self.config.image_cache_path(image_id);
        match fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(
                    "failed to read image cache {}: {} (will introspect again)",
                    path.display(),
                    e
                );
                None
            }
        }
    }

    /// Store introspection output verbatim.
    pub fn put(&self, image_id: &str, content: &str) -> Result<()> {
        write_file_atomic(&self.config.image_cache_path(image_id), content)
    }
}
