//! Infrastructure layer module
//!
//! This module contains the adapters between the domain and the outside world:
//! - Settings management
//! - ConfigMap manifest loading
//! - Logging infrastructure

pub mod config;
pub mod configmap;
pub mod logging;
