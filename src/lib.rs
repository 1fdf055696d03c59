//! latz library
//!
//! Image search CLI core: a plugin registry of search backends, a layered
//! configuration system whose schema is composed from the plugins, and a
//! concurrent orchestrator that queries every selected backend.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod format;
pub mod image;
pub mod logging;
pub mod orchestrator;
pub mod plugins;
