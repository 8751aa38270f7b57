use thiserror::Error;

use super::models::observability::ObservabilityKey;

/// Syntax error reported while checking a Go `text/template` source.
///
/// Renders the way the Go template package does:
/// `template: <name>:<line>: <message>`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("template: {name}:{line}: {message}")]
pub struct TemplateError {
    /// Name the template was parsed under
    pub name: String,
    /// 1-based line of the offending token
    pub line: usize,
    /// Description of the problem
    pub message: String,
}

impl TemplateError {
    pub fn new(name: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            line,
            message: message.into(),
        }
    }
}

/// Errors parsing an observability ConfigMap
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to parse \"{key}\": invalid boolean value {value:?}")]
    InvalidBooleanValue {
        key: ObservabilityKey,
        value: String,
    },

    #[error("invalid \"{key}\": {source}")]
    InvalidTemplateSyntax {
        key: ObservabilityKey,
        #[source]
        source: TemplateError,
    },
}

impl ConfigError {
    /// The ConfigMap key that failed
    pub const fn key(&self) -> ObservabilityKey {
        match self {
            Self::InvalidBooleanValue { key, .. } | Self::InvalidTemplateSyntax { key, .. } => *key,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_template_error_display() {
        let err = TemplateError::new("requestLog", 2, "unclosed action");
        assert_eq!(err.to_string(), "template: requestLog:2: unclosed action");
    }

    #[test]
    fn test_template_error_is_source() {
        let err = ConfigError::InvalidTemplateSyntax {
            key: ObservabilityKey::RequestLogTemplate,
            source: TemplateError::new("requestLog", 1, "unexpected EOF"),
        };
        assert_eq!(
            err.source().map(ToString::to_string).as_deref(),
            Some("template: requestLog:1: unexpected EOF")
        );
        assert_eq!(err.key(), ObservabilityKey::RequestLogTemplate);
    }
}
