use crate::error::{OptionFailure, ParseError, ValidationError};
use crate::registry::OptionRegistry;
use crate::spec::OptionKind;
use crate::value::{Parameters, Value};

/// Successful outcome of a scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult {
    pub parameters: Parameters,
    pub remainder: Vec<String>,
}

/// Problems collected by the last scan, kept for usage rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    missing: Vec<String>,
    invalid: Vec<OptionFailure>,
    remainder_error: Option<ValidationError>,
}

impl ScanReport {
    /// Short names of required options that received no value.
    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    pub fn validation_errors(&self) -> &[OptionFailure] {
        &self.invalid
    }

    pub fn remainder_error(&self) -> Option<&ValidationError> {
        self.remainder_error.as_ref()
    }

    pub fn has_errors(&self) -> bool {
        !self.missing.is_empty() || !self.invalid.is_empty() || self.remainder_error.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Idle,
    /// The option at this index is waiting for its value token.
    ExpectingValue(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'t> {
    Terminator,
    Short(&'t str),
    Long(&'t str),
    Malformed,
    Bare,
}

fn classify(token: &str) -> Token<'_> {
    if token == "--" {
        return Token::Terminator;
    }
    if let Some(name) = token.strip_prefix("--") {
        return Token::Long(name);
    }
    if let Some(rest) = token.strip_prefix('-') {
        let mut chars = rest.chars();
        return match (chars.next(), chars.next()) {
            // A lone `-` is an ordinary positional (commonly stdin).
            (None, _) => Token::Bare,
            (Some(_), None) => Token::Short(rest),
            (Some(_), Some(_)) => Token::Malformed,
        };
    }
    Token::Bare
}

/// Token-consuming state machine over an [`OptionRegistry`].
pub struct ArgumentScanner<'r> {
    registry: &'r mut OptionRegistry,
    state: ScanState,
    /// Set once `--` is consumed or the remainder starts filling up.
    latched: bool,
}

impl<'r> ArgumentScanner<'r> {
    pub fn new(registry: &'r mut OptionRegistry) -> Self {
        Self {
            registry,
            state: ScanState::Idle,
            latched: false,
        }
    }

    /// Reset the registry's parse state, consume `tokens`, then run the
    /// end-of-input checks.
    pub fn scan<I, S>(mut self, tokens: I) -> Result<ParseResult, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.registry.reset_scan();
        for token in tokens {
            self.step(token.as_ref())?;
        }
        self.finish()
    }

    fn step(&mut self, token: &str) -> Result<(), ParseError> {
        if self.latched {
            self.registry.push_remainder(token.to_string());
            return Ok(());
        }

        // A pending value wins over every other interpretation, `--` included.
        if let ScanState::ExpectingValue(idx) = self.state {
            tracing::trace!("value {token:?} for spec #{idx}");
            self.registry.assign(idx, Value::from(token));
            self.state = ScanState::Idle;
            return Ok(());
        }

        match classify(token) {
            Token::Malformed => Err(ParseError::MalformedOption(token.to_string())),
            Token::Short(name) | Token::Long(name) => {
                let idx = self
                    .registry
                    .index_of(name)
                    .ok_or_else(|| ParseError::UnknownOption(token.to_string()))?;
                if self.registry.specs()[idx].kind() == OptionKind::Flag {
                    tracing::trace!("flag {token}");
                    self.registry.assign(idx, Value::Bool(true));
                } else {
                    tracing::trace!("option {token} expects a value");
                    self.state = ScanState::ExpectingValue(idx);
                }
                Ok(())
            }
            Token::Terminator => {
                tracing::trace!("terminator reached");
                self.latched = true;
                Ok(())
            }
            Token::Bare => {
                self.registry.push_remainder(token.to_string());
                self.latched = true;
                Ok(())
            }
        }
    }

    fn finish(self) -> Result<ParseResult, ParseError> {
        let registry = self.registry;

        if let ScanState::ExpectingValue(idx) = self.state {
            tracing::debug!(
                "input ended before a value for {}",
                registry.specs()[idx].display_name()
            );
        }

        let missing: Vec<String> = registry
            .specs()
            .iter()
            .filter(|spec| spec.kind() == OptionKind::Required)
            .map(|spec| spec.short().to_string())
            .filter(|key| !registry.parameters().contains(key))
            .collect();
        let invalid: Vec<OptionFailure> = registry
            .specs()
            .iter()
            .filter_map(|spec| {
                spec.last_error().map(|error| OptionFailure {
                    name: spec.short().to_string(),
                    error: error.clone(),
                })
            })
            .collect();

        let report = registry.report_mut();
        report.missing = missing.clone();
        report.invalid = invalid.clone();

        if !missing.is_empty() {
            return Err(ParseError::MissingRequiredOptions(missing));
        }
        if !invalid.is_empty() {
            return Err(ParseError::ValidationFailed(invalid));
        }

        if let Some(validate) = registry.remainder_validator() {
            match validate(registry.remainder()) {
                Ok(remainder) => registry.replace_remainder(remainder),
                Err(err) => {
                    tracing::debug!("remainder rejected: {err}");
                    registry.report_mut().remainder_error = Some(err.clone());
                    return Err(ParseError::RemainderValidationFailed(err));
                }
            }
        }

        Ok(ParseResult {
            parameters: registry.parameters().clone(),
            remainder: registry.remainder().to_vec(),
        })
    }
}
