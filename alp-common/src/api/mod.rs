//! API module for shared HTTP API functionality
//!
//! # Design Principle
//!
//! This module contains ONLY:
//! - Pure functions (no HTTP framework dependencies)
//! - Shared types
//!
//! The service wraps these with framework-specific middleware (Axum).

pub mod auth;
pub mod types;

pub use auth::{issue_token, parse_bearer, verify_authorization, verify_token, ApiAuthError, TokenClaims};
pub use types::{ErrorDetail, ErrorResponse};
