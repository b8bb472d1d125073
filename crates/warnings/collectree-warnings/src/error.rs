use thiserror::Error;

use crate::warning::WarningRecord;

/// Errors produced while filling in an [`crate::UnformattedWarning`] template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("missing template argument '{field}' for \"{template}\"")]
    MissingField { field: String, template: String },
    #[error("unclosed '{{' in template \"{template}\"")]
    Unclosed { template: String },
    #[error("single '}}' encountered in template \"{template}\"")]
    UnmatchedBrace { template: String },
}

/// Errors produced while parsing a `-W` style filter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("invalid action: '{0}'")]
    UnknownAction(String),
    #[error("unknown warning category: '{0}'")]
    UnknownCategory(String),
    #[error("too many fields (max 3): '{0}'")]
    TooManyFields(String),
}

/// A warning that a filter escalated to an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WarningError {
    #[error("{0}")]
    Raised(WarningRecord),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("failed to write warning: {0}")]
    Write(String),
}

/// Errors produced while loading a [`crate::WarningsConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("warnings config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Filter(#[from] FilterError),
}
