//! Domain layer for observability configuration
//!
//! This module contains the configuration models and their error types.

pub mod error;
pub mod models;

pub use error::{ConfigError, TemplateError};
