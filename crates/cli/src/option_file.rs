use anyhow::{Context, Result, bail};
use optscan::{OptionOpts, OptionRegistry, Value, validators};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_OPTION_FILE: &str = "optscan.json";
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionFile {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Program name shown on the `Usage:` line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionDecl>,

    /// Bounds on the number of trailing tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remainder: Option<RemainderRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionDecl {
    pub short: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,

    pub kind: DeclKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Name of a built-in validator (`int`, `uint`, `float`, `bool`, `non-empty`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Required,
    Optional,
    Flag,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemainderRule {
    #[serde(default)]
    pub min: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

pub fn load_option_file(path: &Path) -> Result<OptionFile> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read option file: {}", path.display()))?;
    let file: OptionFile = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse option file JSON: {}", path.display()))?;
    if file.schema_version != SCHEMA_VERSION {
        bail!(
            "unsupported option file schemaVersion {} (expected {})",
            file.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(file)
}

impl OptionFile {
    /// Declare every option of the file, in file order.
    pub fn build_registry(&self) -> Result<OptionRegistry> {
        let mut reg = OptionRegistry::new();
        for decl in &self.options {
            let mut opts = OptionOpts::new();
            if let Some(default) = &decl.default {
                opts = opts.default_value(default.clone());
            }
            if let Some(description) = &decl.description {
                opts = opts.description(description.clone());
            }

            let declared = match &decl.validate {
                Some(name) => validators::resolve(&decl.short, name)
                    .map(|v| opts.validator(v)),
                None => Ok(opts),
            }
            .and_then(|opts| {
                let long = decl.long.as_deref();
                match decl.kind {
                    DeclKind::Required => reg.declare_required(&decl.short, long, opts),
                    DeclKind::Optional => reg.declare_optional(&decl.short, long, opts),
                    DeclKind::Flag => reg.declare_flag(&decl.short, long, opts),
                }
            });
            declared.with_context(|| format!("failed to declare option '-{}'", decl.short))?;
        }

        if let Some(rule) = &self.remainder {
            reg.set_remainder_validator(validators::arity(rule.min, rule.max));
        }
        tracing::debug!("declared {} option(s)", reg.specs().len());
        Ok(reg)
    }

    pub fn sample(program: &str) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            program: Some(program.to_string()),
            options: vec![
                OptionDecl {
                    short: "f".to_string(),
                    long: Some("file".to_string()),
                    kind: DeclKind::Required,
                    default: None,
                    description: Some("Input file".to_string()),
                    validate: Some("non-empty".to_string()),
                },
                OptionDecl {
                    short: "n".to_string(),
                    long: Some("count".to_string()),
                    kind: DeclKind::Optional,
                    default: Some(Value::from("1")),
                    description: Some("Number of repetitions".to_string()),
                    validate: Some("uint".to_string()),
                },
                OptionDecl {
                    short: "v".to_string(),
                    long: Some("verbose".to_string()),
                    kind: DeclKind::Flag,
                    default: None,
                    description: Some("Verbose output".to_string()),
                    validate: None,
                },
            ],
            remainder: None,
        }
    }
}

/// Write a sample option file into `dir`. Refuses to overwrite an existing one.
pub fn write_sample(dir: &Path) -> Result<PathBuf> {
    let dest = dir.join(DEFAULT_OPTION_FILE);
    if dest.exists() {
        bail!("{DEFAULT_OPTION_FILE} already exists in {}", dir.display());
    }

    let program = dir
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "my-cli".to_string());

    let bytes = serde_json::to_vec_pretty(&OptionFile::sample(&program))
        .context("failed to serialize option file")?;
    let mut out = String::from_utf8(bytes).context("option file is not valid UTF-8")?;
    out.push('\n');

    fs::write(&dest, out.as_bytes())
        .with_context(|| format!("failed to write {}", dest.display()))?;
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn make_temp_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let pid = std::process::id();
        let dir = std::env::temp_dir().join(format!("optscan-{prefix}-{pid}-{nanos}"));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn option_file_deserializes_camel_case() {
        let json = r#"{
  "schemaVersion": 1,
  "program": "demo",
  "options": [
    { "short": "f", "long": "file", "kind": "required", "validate": "non-empty" },
    { "short": "n", "kind": "optional", "default": 3 },
    { "short": "v", "long": "verbose", "kind": "flag", "default": true }
  ],
  "remainder": { "max": 2 }
}"#;
        let file: OptionFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.program.as_deref(), Some("demo"));
        assert_eq!(file.options.len(), 3);
        assert_eq!(file.options[0].kind, DeclKind::Required);
        assert_eq!(file.options[1].default, Some(Value::Int(3)));
        let rule = file.remainder.as_ref().unwrap();
        assert_eq!((rule.min, rule.max), (0, Some(2)));

        let reg = file.build_registry().unwrap();
        assert_eq!(reg.parameters().get_int("n"), Some(3));
        assert_eq!(reg.parameters().get_bool("verbose"), Some(true));
    }

    #[test]
    fn unknown_validator_is_a_declaration_error() {
        let json = r#"{ "options": [ { "short": "n", "kind": "optional", "validate": "hex" } ] }"#;
        let file: OptionFile = serde_json::from_str(json).unwrap();
        let err = file.build_registry().unwrap_err();
        let declare = err.downcast_ref::<optscan::DeclareError>().unwrap();
        assert!(matches!(declare, optscan::DeclareError::InvalidOption { .. }));
    }

    #[test]
    fn sample_round_trips_through_disk() {
        let dir = make_temp_dir("sample");
        let dest = write_sample(&dir).unwrap();
        let file = load_option_file(&dest).unwrap();
        assert_eq!(file.schema_version, SCHEMA_VERSION);
        assert_eq!(file.options.len(), 3);
        file.build_registry().unwrap();

        assert!(write_sample(&dir).is_err());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn rejects_unknown_schema_version() {
        let dir = make_temp_dir("schema");
        let path = dir.join(DEFAULT_OPTION_FILE);
        fs::write(&path, r#"{ "schemaVersion": 2 }"#).unwrap();
        assert!(load_option_file(&path).is_err());
        let _ = fs::remove_dir_all(&dir);
    }
}
