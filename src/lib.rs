//! Meterbook - building utility ledger
//!
//! Tracks a building's electricity use floor by floor: meter readings with
//! their ordering rules, consumption rollups, monthly electricity bills and
//! maintenance service requests. Floors and bills are cached locally as JSON;
//! floors, readings and requests can also live in a remote list store.
//!
//! # Architecture
//!
//! - `config`: Data directory and settings
//! - `error`: Custom error types
//! - `models`: Floors, readings, bills and service requests
//! - `storage`: JSON file cache
//! - `remote`: Remote list store client and an in-memory stand-in
//! - `services`: Business logic layer
//! - `reports`: Consumption aggregation and dashboard figures
//! - `audit`: Audit logging system
//! - `export`: CSV, JSON and YAML export
//!
//! # Example
//!
//! ```rust,ignore
//! use meterbook::config::{paths::MeterbookPaths, settings::Settings};
//!
//! let paths = MeterbookPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod remote;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{MeterbookError, MeterbookResult};
