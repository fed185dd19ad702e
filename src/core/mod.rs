//! Core functionality for forge-shell
//!
//! This module contains shared plumbing:
//! - Application configuration
//! - API key storage
//! - The persistent key-value store
//! - The simulated formatter
//! - TrackCodex exports

pub mod config;
pub mod credentials;
pub mod formatter;
pub mod store;
pub mod track;

pub use config::Config;
pub use credentials::CredentialStore;
pub use store::{FileStore, KeyValueStore, MemoryStore, SharedStore};
pub use track::TrackPayload;
