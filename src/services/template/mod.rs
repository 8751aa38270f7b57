//! Go `text/template` syntax checking
//!
//! Request log templates are written in Go template syntax and executed by
//! the serving data plane. Here they are only checked, never executed:
//! - Lexing of text, actions, comments and trim markers
//! - Control structure nesting (`if`/`range`/`with`/`define`/`block`)
//! - Function and variable resolution

mod lexer;
mod parser;

pub use crate::domain::error::TemplateError;

/// Functions predefined for every Go template
pub const BUILTIN_FUNCTIONS: &[&str] = &[
    "and", "call", "html", "index", "slice", "js", "len", "not", "or", "print", "printf",
    "println", "urlquery", "eq", "ge", "gt", "le", "lt", "ne",
];

/// Check that `source` parses as a Go template named `name`.
pub fn parse(name: &str, source: &str) -> Result<(), TemplateError> {
    parser::Parser::new(name, source).parse()
}
