//! libstack library exports.
//!
//! The binary is a thin CLI over these modules; integration tests drive
//! them directly with fake downloaders, build runners and engines.

pub mod builder;
pub mod cache;
pub mod commands;
pub mod common;
pub mod config;
pub mod download;
pub mod error;
pub mod images;
pub mod process;
pub mod reconcile;
pub mod record;
pub mod registry;
pub mod table;
pub mod timing;

pub use error::{Error, Result};
