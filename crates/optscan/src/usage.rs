use std::borrow::Cow;
use std::fmt;

use crate::registry::OptionRegistry;
use crate::spec::{OptionKind, OptionSpec};

pub const DEFAULT_MAX_COLUMN_WIDTH: usize = 30;

const TRUNCATION_MARKER: &str = "...";
const GROUPS: [OptionKind; 3] = [OptionKind::Required, OptionKind::Optional, OptionKind::Flag];

#[derive(Debug, Clone)]
pub struct UsageConfig {
    /// Upper bound for the long-name and default columns.
    pub max_column_width: usize,
    /// When set, a `Usage:` line is printed first.
    pub program: Option<String>,
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            max_column_width: DEFAULT_MAX_COLUMN_WIDTH,
            program: None,
        }
    }
}

impl UsageConfig {
    pub fn width(mut self, width: usize) -> Self {
        self.max_column_width = width;
        self
    }

    pub fn program(mut self, name: impl Into<String>) -> Self {
        self.program = Some(name.into());
        self
    }
}

/// Renders the declared options and, after a parse, the problems it found.
pub struct UsagePresenter<'r> {
    registry: &'r OptionRegistry,
    config: UsageConfig,
}

impl<'r> UsagePresenter<'r> {
    pub fn new(registry: &'r OptionRegistry, config: UsageConfig) -> Self {
        Self { registry, config }
    }

    fn long_cell(spec: &OptionSpec) -> String {
        spec.long()
            .map(|l| format!(", --{l}"))
            .unwrap_or_default()
    }

    fn default_cell(&self, spec: &OptionSpec) -> String {
        spec.default_value()
            .and_then(|v| v.display_default())
            .map(|text| truncate(text, self.config.max_column_width).into_owned())
            .unwrap_or_default()
    }

    fn write_errors(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Nothing to report until a scan has run.
        let Some(report) = self.registry.last_scan() else {
            return Ok(());
        };

        if !report.missing().is_empty() {
            writeln!(f, "Missing required options:")?;
            for name in report.missing() {
                writeln!(f, "  {}", self.display_name(name))?;
            }
            writeln!(f)?;
        }

        if !report.validation_errors().is_empty() {
            writeln!(f, "Validation errors:")?;
            for failure in report.validation_errors() {
                writeln!(
                    f,
                    "  {}: {}",
                    self.display_name(&failure.name),
                    failure.error
                )?;
            }
            writeln!(f)?;
        }

        if let Some(err) = report.remainder_error() {
            writeln!(f, "Remainder error:")?;
            writeln!(f, "  {err}")?;
            writeln!(f)?;
        }

        Ok(())
    }

    fn display_name(&self, short: &str) -> String {
        self.registry
            .lookup(short)
            .map(OptionSpec::display_name)
            .unwrap_or_else(|| format!("-{short}"))
    }
}

impl fmt::Display for UsagePresenter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(program) = &self.config.program {
            writeln!(f, "Usage: {program} [options] [--] [args...]")?;
            writeln!(f)?;
        }

        self.write_errors(f)?;

        let cap = self.config.max_column_width;
        let specs = self.registry.specs();
        let long_width = specs
            .iter()
            .map(|s| Self::long_cell(s).chars().count())
            .max()
            .unwrap_or(0)
            .min(cap);
        let default_width = specs
            .iter()
            .map(|s| self.default_cell(s).chars().count())
            .max()
            .unwrap_or(0)
            .min(cap);

        let mut first = true;
        for kind in GROUPS {
            let group: Vec<&OptionSpec> = specs.iter().filter(|s| s.kind() == kind).collect();
            if group.is_empty() {
                continue;
            }
            if !first {
                writeln!(f)?;
            }
            first = false;

            writeln!(f, "{}:", kind.heading())?;
            for spec in group {
                let mut line = format!(
                    "  -{}{:<long_width$}",
                    spec.short(),
                    Self::long_cell(spec)
                );
                if default_width > 0 {
                    line.push_str(&format!("  {:<default_width$}", self.default_cell(spec)));
                }
                if let Some(desc) = spec.description().map(str::trim).filter(|d| !d.is_empty()) {
                    line.push_str("  ");
                    line.push_str(desc);
                }
                writeln!(f, "{}", line.trim_end())?;
            }
        }

        Ok(())
    }
}

fn truncate(text: &str, cap: usize) -> Cow<'_, str> {
    if text.chars().count() <= cap {
        return Cow::Borrowed(text);
    }
    let keep = cap.saturating_sub(TRUNCATION_MARKER.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(TRUNCATION_MARKER);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::spec::OptionOpts;
    use crate::value::Value;

    fn sample() -> OptionRegistry {
        let mut reg = OptionRegistry::new();
        reg.declare_flag("v", Some("verbose"), OptionOpts::new().description("Verbose output"))
            .unwrap();
        reg.declare_required("f", Some("file"), OptionOpts::new().description("Input file"))
            .unwrap();
        reg.declare_optional(
            "o",
            Some("output"),
            OptionOpts::new()
                .default_value("out.txt")
                .description("Output file"),
        )
        .unwrap();
        reg.declare_optional("n", None, OptionOpts::new().description("Count"))
            .unwrap();
        reg
    }

    #[test]
    fn groups_by_kind_in_declaration_order() {
        let text = sample().usage();
        let expected = "\
Required:
  -f, --file              Input file

Optional:
  -o, --output   out.txt  Output file
  -n                      Count

Flags:
  -v, --verbose           Verbose output
";
        assert_eq!(text, expected);
    }

    #[test]
    fn no_error_sections_before_parse() {
        let text = sample().usage();
        assert!(!text.contains("Missing required options"));
        assert!(!text.contains("Validation errors"));
        assert!(!text.contains("Remainder error"));
    }

    #[test]
    fn long_defaults_are_truncated() {
        let mut reg = OptionRegistry::new();
        reg.declare_optional(
            "p",
            Some("path"),
            OptionOpts::new().default_value("a".repeat(40)),
        )
        .unwrap();

        let text = reg.usage_with(UsageConfig::default().width(10));
        assert!(text.contains("  -p, --path  aaaaaaa..."), "{text}");
        assert!(!text.contains(&"a".repeat(11)));
    }

    #[test]
    fn non_string_defaults_are_not_printed() {
        let mut reg = OptionRegistry::new();
        reg.declare_optional("n", None, OptionOpts::new().default_value(Value::Int(5)))
            .unwrap();
        reg.declare_flag("q", None, OptionOpts::new().default_value(true))
            .unwrap();
        assert_eq!(reg.usage(), "Optional:\n  -n\n\nFlags:\n  -q\n");
    }

    #[test]
    fn failed_parse_lists_missing_and_invalid_options() {
        let mut reg = sample();
        reg.declare_optional(
            "c",
            Some("count"),
            OptionOpts::new().validate(|_| Err(ValidationError::new("expected an integer"))),
        )
        .unwrap();

        assert!(reg.parse(["-c", "abc"]).is_err());
        let text = reg.usage_with(UsageConfig::default().program("demo"));
        assert!(text.starts_with("Usage: demo [options] [--] [args...]\n\n"));
        assert!(text.contains("Missing required options:\n  -f, --file\n"));
        assert!(text.contains("Validation errors:\n  -c, --count: expected an integer\n"));
        assert!(!text.contains("Remainder error"));
    }

    #[test]
    fn remainder_error_section() {
        let mut reg = OptionRegistry::new();
        reg.set_remainder_validator(|_| Err(ValidationError::new("too many arguments")));
        assert!(reg.parse(["a"]).is_err());
        assert_eq!(reg.usage(), "Remainder error:\n  too many arguments\n\n");
    }

    #[test]
    fn successful_parse_has_no_error_sections() {
        let mut reg = sample();
        reg.parse(["-f", "in.txt"]).unwrap();
        assert!(reg.usage().starts_with("Required:\n"));
    }
}
