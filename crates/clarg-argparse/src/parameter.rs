//! Declared parameters: positional [`ArgumentDef`]s and flagged [`OptionDef`]s.
//!
//! Both are built once from a raw spec string and never change afterwards.
//!
//! Argument specs: `<path>` (required), `[path]` (optional), `<files...>`
//! (variadic), `[config:my+file]` (default `my file`, `+` stands for a space).
//!
//! Option specs: `-f|--force`, `-c, --config <path>`, `-n --no-more`
//! (boolean, default `true`), `--with-cache` (boolean, default `false`).

use crate::case::camel_case;
use crate::value::Value;
use std::fmt;

/// Converts a raw argv string into a value. Never applied to defaults.
pub type Filter = Box<dyn Fn(&str) -> Value>;

/// Shared view over arguments and options.
pub trait Parameter {
    fn raw_spec(&self) -> &str;

    /// Name with decorations removed, e.g. `dry-run`.
    fn name(&self) -> &str;

    /// camelCase key used in the values map, e.g. `dryRun`.
    fn attribute_name(&self) -> &str;

    fn description(&self) -> &str;

    fn required(&self) -> bool;

    fn optional(&self) -> bool;

    fn variadic(&self) -> bool;

    fn default_value(&self) -> Value;

    fn filter(&self, raw: &str) -> Value;

    /// `Option` or `Argument`, used in messages.
    fn label(&self) -> &'static str;

    /// How the parameter is named to users in messages.
    fn display_name(&self) -> &str;

    /// Negatable flag (`--no-x`, `--with-x`) that ignores explicit values.
    fn is_bool(&self) -> bool {
        false
    }
}

/// A positional argument.
pub struct ArgumentDef {
    raw: String,
    name: String,
    attribute: String,
    description: String,
    required: bool,
    optional: bool,
    variadic: bool,
    spec_default: Option<String>,
    default: Option<Value>,
    filter: Option<Filter>,
}

impl ArgumentDef {
    pub fn new(spec: &str) -> Self {
        let raw = spec.trim().to_string();
        let required = raw.starts_with('<');
        let optional = raw.starts_with('[');
        let variadic = raw.contains("...");

        let stripped: String = raw
            .chars()
            .filter(|c| !matches!(c, '<' | '>' | '[' | ']'))
            .collect::<String>()
            .replace("...", "");
        // Dots in a default (`out.txt`) survive, dots in the name do not.
        let (name, spec_default) = match stripped.split_once(':') {
            Some((name, default)) => (name.replace('.', ""), Some(default.replace('+', " "))),
            None => (stripped.replace('.', ""), None),
        };

        Self {
            attribute: camel_case(&name),
            raw,
            name,
            description: String::new(),
            required,
            optional,
            variadic,
            spec_default,
            default: None,
            filter: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Overrides any `name:default` segment of the spec.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_filter(mut self, filter: impl Fn(&str) -> Value + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }
}

impl Parameter for ArgumentDef {
    fn raw_spec(&self) -> &str {
        &self.raw
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn attribute_name(&self) -> &str {
        &self.attribute
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn required(&self) -> bool {
        self.required
    }

    fn optional(&self) -> bool {
        self.optional
    }

    fn variadic(&self) -> bool {
        self.variadic
    }

    fn default_value(&self) -> Value {
        if let Some(default) = &self.default {
            return default.clone();
        }
        match (&self.spec_default, self.variadic) {
            (Some(d), true) => Value::List(d.split(',').map(Value::from).collect()),
            (None, true) => Value::List(Vec::new()),
            (Some(d), false) => Value::from(d.as_str()),
            (None, false) => Value::Null,
        }
    }

    fn filter(&self, raw: &str) -> Value {
        match &self.filter {
            Some(f) => f(raw),
            None => Value::from(raw),
        }
    }

    fn label(&self) -> &'static str {
        "Argument"
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for ArgumentDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentDef")
            .field("raw", &self.raw)
            .field("name", &self.name)
            .field("required", &self.required)
            .field("variadic", &self.variadic)
            .field("default", &self.default_value())
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

/// A flagged option.
pub struct OptionDef {
    raw: String,
    short: String,
    long: String,
    value_hint: Option<String>,
    name: String,
    attribute: String,
    description: String,
    required: bool,
    optional: bool,
    variadic: bool,
    default: Option<Value>,
    filter: Option<Filter>,
}

impl OptionDef {
    pub fn new(spec: &str) -> Self {
        let raw = spec.trim().to_string();
        let mut parts = raw
            .split(|c: char| c.is_whitespace() || c == ',' || c == '|')
            .filter(|p| !p.is_empty());

        let short = parts.next().unwrap_or_default().to_string();
        let mut long = short.clone();
        let mut hints: Vec<&str> = Vec::new();
        for part in parts {
            if part.starts_with('-') && long == short {
                long = part.to_string();
            } else {
                hints.push(part);
            }
        }

        let bare = long.trim_start_matches('-');
        let name = bare
            .strip_prefix("no-")
            .or_else(|| bare.strip_prefix("with-"))
            .unwrap_or(bare)
            .to_string();

        Self {
            required: raw.contains('<'),
            optional: raw.contains('['),
            variadic: raw.contains("..."),
            value_hint: (!hints.is_empty()).then(|| hints.join(" ")),
            attribute: camel_case(&name),
            raw,
            short,
            long,
            name,
            description: String::new(),
            default: None,
            filter: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Ignored for boolean options, whose default comes from the spec.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_filter(mut self, filter: impl Fn(&str) -> Value + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn short(&self) -> &str {
        &self.short
    }

    pub fn long(&self) -> &str {
        &self.long
    }

    /// Value placeholder from the spec, e.g. `<path>`.
    pub fn value_hint(&self) -> Option<&str> {
        self.value_hint.as_deref()
    }

    /// Exact match against the short or the long form.
    pub fn is(&self, text: &str) -> bool {
        self.short == text || self.long == text
    }
}

impl Parameter for OptionDef {
    fn raw_spec(&self) -> &str {
        &self.raw
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn attribute_name(&self) -> &str {
        &self.attribute
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn required(&self) -> bool {
        self.required
    }

    fn optional(&self) -> bool {
        self.optional
    }

    fn variadic(&self) -> bool {
        self.variadic
    }

    fn default_value(&self) -> Value {
        if self.raw.contains("-with-") {
            return Value::Bool(false);
        }
        if self.raw.contains("-no-") {
            return Value::Bool(true);
        }
        match &self.default {
            Some(default) => default.clone(),
            None if self.variadic => Value::List(Vec::new()),
            None => Value::Null,
        }
    }

    fn filter(&self, raw: &str) -> Value {
        match &self.filter {
            Some(f) => f(raw),
            None => Value::from(raw),
        }
    }

    fn label(&self) -> &'static str {
        "Option"
    }

    fn display_name(&self) -> &str {
        &self.long
    }

    fn is_bool(&self) -> bool {
        self.long.contains("-no-") || self.long.contains("-with-")
    }
}

impl fmt::Debug for OptionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionDef")
            .field("raw", &self.raw)
            .field("short", &self.short)
            .field("long", &self.long)
            .field("required", &self.required)
            .field("variadic", &self.variadic)
            .field("bool", &self.is_bool())
            .field("default", &self.default_value())
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_required_and_variadic() {
        let arg = ArgumentDef::new("<files...>");
        assert!(arg.required());
        assert!(arg.variadic());
        assert_eq!(arg.name(), "files");
        assert_eq!(arg.default_value(), Value::List(vec![]));
    }

    #[test]
    fn argument_default_with_plus_escape() {
        let arg = ArgumentDef::new("[config:some+value]");
        assert!(!arg.required());
        assert!(arg.optional());
        assert_eq!(arg.name(), "config");
        assert_eq!(arg.default_value(), Value::from("some value"));
    }

    #[test]
    fn variadic_argument_default_splits_on_comma() {
        let arg = ArgumentDef::new("[paths:a,b+c...]");
        assert_eq!(arg.default_value(), Value::from(vec!["a", "b c"]));
    }

    #[test]
    fn argument_default_keeps_dots() {
        let arg = ArgumentDef::new("[out:build.log]");
        assert_eq!(arg.name(), "out");
        assert_eq!(arg.default_value(), Value::from("build.log"));
    }

    #[test]
    fn explicit_argument_default_wins() {
        let arg = ArgumentDef::new("[level:1]").with_default(3i64);
        assert_eq!(arg.default_value(), Value::Int(3));
    }

    #[test]
    fn argument_attribute_name_is_camel_case() {
        assert_eq!(ArgumentDef::new("<dry-run>").attribute_name(), "dryRun");
    }

    #[test]
    fn option_forms() {
        let opt = OptionDef::new("-c, --config <path>");
        assert_eq!(opt.short(), "-c");
        assert_eq!(opt.long(), "--config");
        assert_eq!(opt.value_hint(), Some("<path>"));
        assert_eq!(opt.name(), "config");
        assert!(opt.required());
        assert!(opt.is("-c"));
        assert!(opt.is("--config"));
        assert!(!opt.is("--conf"));
    }

    #[test]
    fn option_with_only_one_form() {
        let opt = OptionDef::new("--dry-run");
        assert_eq!(opt.short(), "--dry-run");
        assert_eq!(opt.long(), "--dry-run");
        assert_eq!(opt.attribute_name(), "dryRun");
    }

    #[test]
    fn negatable_options() {
        let no = OptionDef::new("-n --no-more");
        assert!(no.is_bool());
        assert_eq!(no.name(), "more");
        assert_eq!(no.default_value(), Value::Bool(true));
        assert_eq!(no.default_value(), Value::Bool(true));

        let with = OptionDef::new("--with-cache").with_default("ignored");
        assert!(with.is_bool());
        assert_eq!(with.attribute_name(), "cache");
        assert_eq!(with.default_value(), Value::Bool(false));
    }

    #[test]
    fn name_only_strips_leading_markers() {
        let opt = OptionDef::new("--know-how");
        assert_eq!(opt.name(), "know-how");
        assert!(!opt.is_bool());
    }

    #[test]
    fn filter_applies_callback() {
        let opt = OptionDef::new("-n --num").with_filter(|s| {
            s.parse::<i64>().map(Value::Int).unwrap_or(Value::Null)
        });
        assert_eq!(opt.filter("42"), Value::Int(42));
        assert_eq!(OptionDef::new("-x").filter("raw"), Value::from("raw"));
    }
}
