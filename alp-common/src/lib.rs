//! # ALP Common Library
//!
//! Shared code for the ALP content service:
//! - Error and result types
//! - Configuration loading (TOML, environment, command line)
//! - Bearer token verification
//! - Database schema initialization

pub mod api;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;

pub use error::{Error, Result};
