//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`cities`] - List built-in city presets
//! - [`config`] - Configuration management (get, set, list, path, init)
//! - [`estimate`] - Grid size and duration estimate without network access
//! - [`key`] - API key verification
//! - [`scan`] - Main command (scan an area for panoramas)

pub mod cities;
pub mod common;
pub mod config;
pub mod estimate;
pub mod key;
pub mod scan;
