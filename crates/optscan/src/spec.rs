use std::fmt;
use std::sync::Arc;

use crate::error::ValidationError;
use crate::value::Value;

/// Converts a raw token into a resolved value, or rejects it.
pub type Validator = Arc<dyn Fn(&str) -> Result<Value, ValidationError> + Send + Sync>;

/// Receives the full remainder after a scan and returns its replacement.
pub type RemainderValidator =
    Arc<dyn Fn(&[String]) -> Result<Vec<String>, ValidationError> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    Required,
    Optional,
    Flag,
}

impl OptionKind {
    /// Heading used by the usage renderer.
    pub fn heading(self) -> &'static str {
        match self {
            Self::Required => "Required",
            Self::Optional => "Optional",
            Self::Flag => "Flags",
        }
    }
}

/// Per-declaration settings.
#[derive(Clone, Default)]
pub struct OptionOpts {
    pub(crate) default: Option<Value>,
    pub(crate) description: Option<String>,
    pub(crate) validator: Option<Validator>,
}

impl OptionOpts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default value. Rejected for required options.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn validate<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<Value, ValidationError> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(f));
        self
    }

    /// Use an already shared validator, e.g. one from [`crate::validators`].
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }
}

impl fmt::Debug for OptionOpts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionOpts")
            .field("default", &self.default)
            .field("description", &self.description)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

/// One declared option.
pub struct OptionSpec {
    pub(crate) short: char,
    pub(crate) long: Option<String>,
    pub(crate) kind: OptionKind,
    pub(crate) default: Option<Value>,
    pub(crate) description: Option<String>,
    pub(crate) validator: Option<Validator>,
    /// Set when the last validator invocation failed; reset on every parse.
    pub(crate) last_error: Option<ValidationError>,
}

impl OptionSpec {
    pub fn short(&self) -> char {
        self.short
    }

    pub fn long(&self) -> Option<&str> {
        self.long.as_deref()
    }

    pub fn kind(&self) -> OptionKind {
        self.kind
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    pub fn last_error(&self) -> Option<&ValidationError> {
        self.last_error.as_ref()
    }

    /// `-s` or `-s, --long`.
    pub fn display_name(&self) -> String {
        match &self.long {
            Some(long) => format!("-{}, --{long}", self.short),
            None => format!("-{}", self.short),
        }
    }

    pub(crate) fn short_key(&self) -> String {
        self.short.to_string()
    }
}

impl fmt::Debug for OptionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionSpec")
            .field("short", &self.short)
            .field("long", &self.long)
            .field("kind", &self.kind)
            .field("default", &self.default)
            .field("description", &self.description)
            .field("validator", &self.validator.is_some())
            .field("last_error", &self.last_error)
            .finish()
    }
}
