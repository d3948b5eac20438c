//! CLI command handlers.
//!
//! Each submodule handles one group of commands:
//! - `show` - `list`, `update-readme`, `list-images`
//! - `build` - reconcile a library
//! - `download` - fetch source archives

pub mod build;
pub mod download;
pub mod show;

pub use build::cmd_build;
pub use download::cmd_fetch_sources;
pub use show::{cmd_list, cmd_list_images, cmd_update_readme};
