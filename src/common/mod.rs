//! Shared utilities across libstack modules.

pub mod files;

pub use files::{ensure_parent_exists, remove_if_exists, write_file_atomic};
