//! Batch-pipeline ETA CLI library.
//!
//! This crate provides the CLI interface for the scheduling engine.

mod cli;
pub mod commands;
mod config;
pub mod scenario;

pub use cli::{Cli, Commands};
pub use config::Config;
