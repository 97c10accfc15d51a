use thiserror::Error;

/// Failure reported by a validator or remainder validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for ValidationError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for ValidationError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Errors raised while declaring options. These abort the declaration call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclareError {
    #[error("invalid option '{name}': {reason}")]
    InvalidOption { name: String, reason: String },

    #[error("duplicate option: '{0}' is already registered")]
    DuplicateOption(String),
}

impl DeclareError {
    pub(crate) fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// A per-option validator failure collected during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionFailure {
    /// Short name of the failing option.
    pub name: String,
    pub error: ValidationError,
}

/// Errors raised by [`OptionRegistry::parse`](crate::OptionRegistry::parse).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed option '{0}': short options take exactly one character")]
    MalformedOption(String),

    #[error("unknown option '{0}'")]
    UnknownOption(String),

    /// Short names of every required option without a value.
    #[error("missing required options: {}", flag_list(.0))]
    MissingRequiredOptions(Vec<String>),

    #[error("validation failed for {}", failure_list(.0))]
    ValidationFailed(Vec<OptionFailure>),

    #[error("remainder validation failed: {0}")]
    RemainderValidationFailed(#[source] ValidationError),
}

fn flag_list(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("-{n}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn failure_list(failures: &[OptionFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("-{} ({})", f.name, f.error))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregated_messages_name_every_option() {
        let err = ParseError::MissingRequiredOptions(vec!["f".to_string(), "n".to_string()]);
        assert_eq!(err.to_string(), "missing required options: -f, -n");

        let err = ParseError::ValidationFailed(vec![OptionFailure {
            name: "n".to_string(),
            error: ValidationError::new("expected an integer"),
        }]);
        assert_eq!(
            err.to_string(),
            "validation failed for -n (expected an integer)"
        );
    }
}
