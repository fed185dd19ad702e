//! CLI module for forge-shell
//!
//! This module contains all CLI command definitions and handlers using clap.

pub mod ai;
pub mod commands;
pub mod config;
pub mod shell;

pub use commands::{Cli, Commands};
