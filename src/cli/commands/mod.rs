//! CLI command implementations.

pub mod check_template;
pub mod checksum;
pub mod defaults;
pub mod parse;
pub mod verify;
