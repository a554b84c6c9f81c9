use anyhow::{Context, Result, bail};
use clarg_argparse::{ArgumentDef, OptionDef, Parser, Value};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_MANIFEST_NAME: &str = "clarg.json";

/// A command declared in `clarg.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub allow_unknown: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<ArgumentEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentEntry {
    /// e.g. `<path>`, `[files...]`, `[level:1]`
    pub spec: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionEntry {
    /// e.g. `-o, --output <path>`, `-n --no-color`
    pub spec: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterKind>,
}

/// Named value filters available from JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Int,
    Float,
    Bool,
    Lower,
    Upper,
    Trim,
}

impl FilterKind {
    /// Values that fail to convert are kept as strings.
    pub fn apply(self, raw: &str) -> Value {
        match self {
            Self::Int => raw
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .unwrap_or_else(|_| Value::from(raw)),
            Self::Float => raw
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .unwrap_or_else(|_| Value::from(raw)),
            Self::Bool => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Value::Bool(true),
                "false" | "0" | "no" | "off" => Value::Bool(false),
                _ => Value::from(raw),
            },
            Self::Lower => Value::from(raw.to_lowercase()),
            Self::Upper => Value::from(raw.to_uppercase()),
            Self::Trim => Value::from(raw.trim()),
        }
    }
}

impl Manifest {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;
        let manifest: Manifest = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse manifest JSON: {}", path.display()))?;
        if manifest.name.trim().is_empty() {
            bail!("manifest has an empty `name`: {}", path.display());
        }
        Ok(manifest)
    }

    /// Register every declaration on a fresh parser.
    pub fn build_parser(&self) -> Result<Parser> {
        let mut parser = Parser::new(&self.name)
            .with_description(&self.description)
            .allow_unknown(self.allow_unknown);
        if let Some(version) = &self.version {
            parser = parser.with_version(version);
        }

        let mut arguments = Vec::with_capacity(self.arguments.len());
        for entry in &self.arguments {
            let mut def = ArgumentDef::new(&entry.spec).with_description(&entry.description);
            if let Some(default) = &entry.default {
                let default = json_to_value(default)
                    .with_context(|| format!("invalid default for argument `{}`", entry.spec))?;
                def = def.with_default(default);
            }
            arguments.push(def);
        }
        parser
            .register_arguments(arguments)
            .context("invalid arguments")?;

        for entry in &self.options {
            let mut def = OptionDef::new(&entry.spec).with_description(&entry.description);
            if let Some(default) = &entry.default {
                let default = json_to_value(default)
                    .with_context(|| format!("invalid default for option `{}`", entry.spec))?;
                def = def.with_default(default);
            }
            if let Some(filter) = entry.filter {
                def = def.with_filter(move |raw| filter.apply(raw));
            }
            parser
                .register_option(def)
                .with_context(|| format!("invalid option `{}`", entry.spec))?;
        }

        tracing::debug!(
            command = %self.name,
            arguments = self.arguments.len(),
            options = self.options.len(),
            "manifest registered"
        );
        Ok(parser)
    }
}

fn json_to_value(json: &serde_json::Value) -> Result<Value> {
    Ok(match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().context("number out of range")?),
        },
        serde_json::Value::String(s) => Value::from(s.as_str()),
        serde_json::Value::Array(items) => {
            Value::List(items.iter().map(json_to_value).collect::<Result<_>>()?)
        }
        serde_json::Value::Object(_) => bail!("objects are not supported as defaults"),
    })
}

/// Write a starter manifest into `project_dir`. Never overwrites.
pub fn write_default_manifest(project_dir: &Path, name: Option<&str>) -> Result<PathBuf> {
    let dest = project_dir.join(DEFAULT_MANIFEST_NAME);
    if dest.exists() {
        bail!("{} already exists in {}", DEFAULT_MANIFEST_NAME, project_dir.display());
    }

    let name = match name {
        Some(name) => name.to_string(),
        None => guess_project_name(project_dir).unwrap_or_else(|| "my-cli".to_string()),
    };

    let manifest = Manifest {
        name,
        version: Some("0.1.0".to_string()),
        description: "Describe your command here.".to_string(),
        allow_unknown: false,
        arguments: vec![ArgumentEntry {
            spec: "<input>".to_string(),
            description: "Input file".to_string(),
            default: None,
        }],
        options: vec![
            OptionEntry {
                spec: "-o, --output [path]".to_string(),
                description: "Output file".to_string(),
                default: Some(serde_json::Value::from("out.txt")),
                filter: None,
            },
            OptionEntry {
                spec: "-n, --count [n]".to_string(),
                description: "How many times".to_string(),
                default: Some(serde_json::Value::from(1)),
                filter: Some(FilterKind::Int),
            },
        ],
    };

    let bytes = serde_json::to_vec_pretty(&manifest).context("failed to serialize manifest")?;
    let mut out = String::from_utf8(bytes).context("manifest is not valid UTF-8")?;
    out.push('\n');

    let tmp = dest.with_extension("tmp");
    fs::write(&tmp, out.as_bytes())
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, &dest)
        .with_context(|| format!("failed to move {} into place", dest.display()))?;
    Ok(dest)
}

/// Command name taken from the last component of the resolved directory.
fn guess_project_name(project_dir: &Path) -> Option<String> {
    let resolved = match project_dir.canonicalize() {
        Ok(path) => path,
        Err(_) => std::env::current_dir().ok()?.join(project_dir),
    };
    resolved
        .components()
        .next_back()
        .and_then(|c| match c {
            Component::Normal(name) => name.to_str(),
            _ => None,
        })
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clarg_argparse::Outcome;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn make_temp_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let pid = std::process::id();
        let dir = std::env::temp_dir().join(format!("clarg-{prefix}-{pid}-{nanos}"));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn manifest_deserializes_camel_case() {
        let json = r#"{
  "name": "deploy",
  "version": "2.0.0",
  "allowUnknown": true,
  "arguments": [
    { "spec": "<target>", "description": "Where to deploy" },
    { "spec": "[hosts...]", "default": ["a", "b"] }
  ],
  "options": [
    { "spec": "-r --retries [n]", "default": 3, "filter": "int" },
    { "spec": "-n --no-color" }
  ]
}"#;
        let m: Manifest = serde_json::from_str(json).unwrap();
        assert_eq!(m.name, "deploy");
        assert_eq!(m.version.as_deref(), Some("2.0.0"));
        assert!(m.allow_unknown);
        assert_eq!(m.arguments.len(), 2);
        assert_eq!(m.arguments[0].description, "Where to deploy");
        assert_eq!(m.options[0].filter, Some(FilterKind::Int));
        assert_eq!(m.options[1].filter, None);
    }

    #[test]
    fn build_parser_applies_defaults_and_filters() {
        let m: Manifest = serde_json::from_str(
            r#"{
  "name": "deploy",
  "arguments": [{ "spec": "<target>" }, { "spec": "[hosts...]", "default": ["a", "b"] }],
  "options": [{ "spec": "-r --retries [n]", "default": 3, "filter": "int" }]
}"#,
        )
        .unwrap();

        let mut parser = m.build_parser().unwrap();
        assert_eq!(parser.parse(&["deploy", "prod"]).unwrap(), Outcome::Parsed);
        assert_eq!(parser.get("target"), Some(&Value::from("prod")));
        assert_eq!(parser.get("hosts"), Some(&Value::from(vec!["a", "b"])));
        assert_eq!(parser.get("retries"), Some(&Value::Int(3)));

        let mut parser = m.build_parser().unwrap();
        parser.parse(&["deploy", "prod", "-r", "5"]).unwrap();
        assert_eq!(parser.get("retries"), Some(&Value::Int(5)));
    }

    #[test]
    fn build_parser_reports_registration_errors() {
        let m: Manifest = serde_json::from_str(
            r#"{
  "name": "x",
  "arguments": [{ "spec": "<a...>" }, { "spec": "<b...>" }, { "spec": "<c>" }]
}"#,
        )
        .unwrap();
        let Err(err) = m.build_parser() else {
            panic!("expected a registration error");
        };
        assert!(format!("{err:#}").contains("Only the last argument can be variadic"));
    }

    #[test]
    fn object_defaults_are_rejected() {
        let m: Manifest = serde_json::from_str(
            r#"{ "name": "x", "options": [{ "spec": "--cfg", "default": { "a": 1 } }] }"#,
        )
        .unwrap();
        assert!(m.build_parser().is_err());
    }

    #[test]
    fn filters_keep_unconvertible_values() {
        assert_eq!(FilterKind::Int.apply("12"), Value::Int(12));
        assert_eq!(FilterKind::Int.apply("twelve"), Value::from("twelve"));
        assert_eq!(FilterKind::Float.apply("0.5"), Value::Float(0.5));
        assert_eq!(FilterKind::Bool.apply("Yes"), Value::Bool(true));
        assert_eq!(FilterKind::Upper.apply("ab"), Value::from("AB"));
        assert_eq!(FilterKind::Trim.apply("  a "), Value::from("a"));
    }

    #[test]
    fn write_default_manifest_writes_loadable_starter() {
        let dir = make_temp_dir("manifest-defaults");
        let dest = write_default_manifest(&dir, None).unwrap();
        let m = Manifest::from_file(&dest).unwrap();

        let project_name = dir.file_name().unwrap().to_string_lossy();
        assert_eq!(m.name, project_name);
        assert_eq!(m.version.as_deref(), Some("0.1.0"));
        assert!(m.build_parser().is_ok());

        assert!(write_default_manifest(&dir, Some("other")).is_err());
        assert_eq!(
            guess_project_name(&dir.join(".")).as_deref(),
            Some(&*project_name)
        );

        let _ = fs::remove_dir_all(&dir);
    }
}
