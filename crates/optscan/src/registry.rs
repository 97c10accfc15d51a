use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{DeclareError, ParseError, ValidationError};
use crate::scanner::{ArgumentScanner, ParseResult, ScanReport};
use crate::spec::{OptionKind, OptionOpts, OptionSpec, RemainderValidator};
use crate::usage::{UsageConfig, UsagePresenter};
use crate::value::{Parameters, Value};

/// Declared options plus the state of the most recent scan.
///
/// Specs are stored once, in declaration order. Short and long names share a
/// single lookup namespace that maps to the index of the owning spec.
#[derive(Default)]
pub struct OptionRegistry {
    specs: Vec<OptionSpec>,
    index: HashMap<String, usize>,
    remainder_validator: Option<RemainderValidator>,
    parameters: Parameters,
    remainder: Vec<String>,
    report: Option<ScanReport>,
}

impl OptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an option that must receive a value.
    pub fn declare_required(
        &mut self,
        short: &str,
        long: Option<&str>,
        opts: OptionOpts,
    ) -> Result<(), DeclareError> {
        if opts.default.is_some() {
            return Err(DeclareError::invalid(
                short,
                "required options cannot have a default value",
            ));
        }
        self.add_option(short, long, OptionKind::Required, opts)
    }

    /// Declare an option that takes a value but may be omitted.
    ///
    /// A default is resolved immediately, through the validator if one is set.
    pub fn declare_optional(
        &mut self,
        short: &str,
        long: Option<&str>,
        opts: OptionOpts,
    ) -> Result<(), DeclareError> {
        self.add_option(short, long, OptionKind::Optional, opts)
    }

    /// Declare a boolean flag. The default is `true` only if the supplied
    /// default is truthy.
    pub fn declare_flag(
        &mut self,
        short: &str,
        long: Option<&str>,
        mut opts: OptionOpts,
    ) -> Result<(), DeclareError> {
        let truthy = opts.default.as_ref().is_some_and(Value::is_truthy);
        opts.default = Some(Value::Bool(truthy));
        self.add_option(short, long, OptionKind::Flag, opts)
    }

    /// Install the hook run once over the remainder after every scan.
    /// Its output replaces the remainder.
    pub fn set_remainder_validator<F>(&mut self, f: F)
    where
        F: Fn(&[String]) -> Result<Vec<String>, ValidationError> + Send + Sync + 'static,
    {
        self.remainder_validator = Some(Arc::new(f));
    }

    /// Scan `tokens` against the declared options.
    ///
    /// Parse state is reset on every call, so repeated calls with the same
    /// tokens produce the same result.
    pub fn parse<I, S>(&mut self, tokens: I) -> Result<ParseResult, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ArgumentScanner::new(self).scan(tokens)
    }

    /// Find a spec by short or long name (without leading dashes).
    pub fn lookup(&self, name: &str) -> Option<&OptionSpec> {
        self.index.get(name).map(|&idx| &self.specs[idx])
    }

    /// All specs in declaration order.
    pub fn specs(&self) -> &[OptionSpec] {
        &self.specs
    }

    /// Materialized defaults before the first parse, the last scan's values after.
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn remainder(&self) -> &[String] {
        &self.remainder
    }

    /// Error state of the last scan; `None` if `parse` was never called.
    pub fn last_scan(&self) -> Option<&ScanReport> {
        self.report.as_ref()
    }

    pub fn usage(&self) -> String {
        self.usage_with(UsageConfig::default())
    }

    pub fn usage_with(&self, config: UsageConfig) -> String {
        UsagePresenter::new(self, config).to_string()
    }

    fn add_option(
        &mut self,
        short: &str,
        long: Option<&str>,
        kind: OptionKind,
        opts: OptionOpts,
    ) -> Result<(), DeclareError> {
        let short_char = parse_short(short)?;
        let short_key = short_char.to_string();
        if self.index.contains_key(&short_key) {
            return Err(DeclareError::DuplicateOption(short_key));
        }

        let long = match long {
            Some(raw) => {
                check_long(raw)?;
                if raw == short_key || self.index.contains_key(raw) {
                    return Err(DeclareError::DuplicateOption(raw.to_string()));
                }
                Some(raw.to_string())
            }
            None => None,
        };

        let idx = self.specs.len();
        self.index.insert(short_key, idx);
        if let Some(long) = &long {
            self.index.insert(long.clone(), idx);
        }

        let default = opts.default;
        self.specs.push(OptionSpec {
            short: short_char,
            long,
            kind,
            default: default.clone(),
            description: opts.description,
            validator: opts.validator,
            last_error: None,
        });
        tracing::debug!("declared {:?} option {}", kind, self.specs[idx].display_name());

        if let Some(value) = default {
            self.assign(idx, value);
        }
        Ok(())
    }

    /// Resolve `raw` for the option at `idx` and store it under each of its keys.
    ///
    /// A failing validator is recorded on the option and the stored value becomes
    /// `Null`; the failure is surfaced later by the end-of-scan checks.
    pub(crate) fn assign(&mut self, idx: usize, raw: Value) {
        let spec = &mut self.specs[idx];
        let resolved = match &spec.validator {
            Some(validate) => match validate(&raw.as_input()) {
                Ok(value) => {
                    spec.last_error = None;
                    if spec.kind == OptionKind::Flag {
                        Value::Bool(value.is_truthy())
                    } else {
                        value
                    }
                }
                Err(err) => {
                    tracing::debug!("validator for -{} rejected {:?}: {err}", spec.short, raw);
                    spec.last_error = Some(err);
                    Value::Null
                }
            },
            None => raw,
        };

        let long = spec.long.clone();
        self.parameters.insert(spec.short_key(), resolved.clone());
        if let Some(long) = long {
            self.parameters.insert(long, resolved);
        }
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Drop all transient parse state and re-resolve defaults.
    pub(crate) fn reset_scan(&mut self) {
        for spec in &mut self.specs {
            spec.last_error = None;
        }
        self.parameters = Parameters::default();
        self.remainder.clear();
        self.report = Some(ScanReport::default());

        let defaults: Vec<(usize, Value)> = self
            .specs
            .iter()
            .enumerate()
            .filter_map(|(idx, spec)| spec.default.clone().map(|v| (idx, v)))
            .collect();
        for (idx, value) in defaults {
            self.assign(idx, value);
        }
    }

    pub(crate) fn push_remainder(&mut self, token: String) {
        self.remainder.push(token);
    }

    pub(crate) fn remainder_validator(&self) -> Option<RemainderValidator> {
        self.remainder_validator.clone()
    }

    pub(crate) fn replace_remainder(&mut self, remainder: Vec<String>) {
        self.remainder = remainder;
    }

    pub(crate) fn report_mut(&mut self) -> &mut ScanReport {
        self.report.get_or_insert_with(ScanReport::default)
    }
}

impl fmt::Debug for OptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionRegistry")
            .field("specs", &self.specs)
            .field("remainder_validator", &self.remainder_validator.is_some())
            .field("parameters", &self.parameters)
            .field("remainder", &self.remainder)
            .field("report", &self.report)
            .finish()
    }
}

fn parse_short(raw: &str) -> Result<char, DeclareError> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Err(DeclareError::invalid(raw, "short name must not be empty")),
        (Some(_), Some(_)) => Err(DeclareError::invalid(
            raw,
            "short name must be exactly one character",
        )),
        (Some('-'), None) => Err(DeclareError::invalid(raw, "'-' cannot be a short name")),
        (Some(c), None) if c.is_whitespace() => Err(DeclareError::invalid(
            raw,
            "short name must not be whitespace",
        )),
        (Some(c), None) => Ok(c),
    }
}

fn check_long(raw: &str) -> Result<(), DeclareError> {
    if raw.is_empty() {
        return Err(DeclareError::invalid(raw, "long name must not be empty"));
    }
    if raw.starts_with('-') {
        return Err(DeclareError::invalid(
            raw,
            "long name must be given without leading dashes",
        ));
    }
    if raw.chars().any(|c| c.is_whitespace() || c == '=') {
        return Err(DeclareError::invalid(
            raw,
            "long name must not contain whitespace or '='",
        ));
    }
    Ok(())
}
