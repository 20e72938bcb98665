//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`cache`] - Cache management (stats, clear)
//! - [`config`] - Configuration management (path, init, show)
//! - [`fetch`] - Single tile fetch through the cache
//! - [`preload`] - Region preload

pub mod cache;
pub mod common;
pub mod config;
pub mod fetch;
pub mod preload;
