pub mod config_parser;
pub mod template;

pub use config_parser::ConfigParser;
