//! Configuration module for Meterbook
//!
//! This module provides configuration management including:
//! - Data directory resolution
//! - User settings persistence
//! - Remote list store connection details

pub mod paths;
pub mod settings;

pub use paths::MeterbookPaths;
pub use settings::{RemoteSettings, Settings};
