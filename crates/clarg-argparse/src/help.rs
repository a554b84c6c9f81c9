//! Help text for the built-in `--help` option and the unknown-option fallback.

use crate::parameter::{ArgumentDef, OptionDef, Parameter};
use crate::value::Value;

/// Everything a renderer needs to describe a command.
#[derive(Debug)]
pub struct HelpContext<'a> {
    pub name: &'a str,
    pub version: Option<&'a str>,
    pub description: &'a str,
    pub arguments: &'a [ArgumentDef],
    pub options: Vec<&'a OptionDef>,
}

pub trait HelpRenderer {
    fn render(&self, ctx: &HelpContext<'_>) -> String;
}

impl<F> HelpRenderer for F
where
    F: Fn(&HelpContext<'_>) -> String,
{
    fn render(&self, ctx: &HelpContext<'_>) -> String {
        self(ctx)
    }
}

/// Plain two-column layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHelp;

impl HelpRenderer for DefaultHelp {
    fn render(&self, ctx: &HelpContext<'_>) -> String {
        let mut out = String::new();
        match ctx.version.filter(|v| !v.trim().is_empty()) {
            Some(version) => out.push_str(&format!("{} {}\n", ctx.name, version.trim())),
            None => {
                out.push_str(ctx.name);
                out.push('\n');
            }
        }

        if !ctx.description.trim().is_empty() {
            out.push('\n');
            out.push_str(ctx.description.trim_end());
            out.push('\n');
        }

        out.push_str(&format!("\nUsage: {}\n", usage(ctx)));

        if !ctx.arguments.is_empty() {
            out.push_str("\nArguments:\n");
            let rows: Vec<(String, String)> = ctx
                .arguments
                .iter()
                .map(|a| (a.raw_spec().to_string(), format_help(a)))
                .collect();
            push_rows(&mut out, rows);
        }

        if !ctx.options.is_empty() {
            out.push_str("\nOptions:\n");
            let rows: Vec<(String, String)> = ctx
                .options
                .iter()
                .map(|o| (format_option_left(o), format_help(*o)))
                .collect();
            push_rows(&mut out, rows);
        }

        out
    }
}

fn usage(ctx: &HelpContext<'_>) -> String {
    let mut parts = vec![ctx.name.to_string()];
    if !ctx.options.is_empty() {
        parts.push("[OPTIONS]".to_string());
    }
    parts.extend(ctx.arguments.iter().map(|a| a.raw_spec().to_string()));
    parts.join(" ")
}

fn format_option_left(opt: &OptionDef) -> String {
    let mut out = if opt.short() == opt.long() {
        opt.long().to_string()
    } else {
        format!("{}, {}", opt.short(), opt.long())
    };
    if let Some(hint) = opt.value_hint() {
        out.push(' ');
        out.push_str(hint);
    }
    out
}

fn format_help(param: &dyn Parameter) -> String {
    let mut out = param.description().trim().to_string();
    if param.required() {
        if out.is_empty() {
            out.push_str("required");
        } else {
            out.push_str(" (required)");
        }
    }
    let default = param.default_value();
    if !default.is_empty() && !param.is_bool() {
        let default = match default {
            Value::Str(s) => s,
            other => other.to_string(),
        };
        if out.is_empty() {
            out.push_str(&format!("[default: {default}]"));
        } else {
            out.push_str(&format!(" [default: {default}]"));
        }
    }
    out
}

fn push_rows(out: &mut String, rows: Vec<(String, String)>) {
    let width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
    for (left, help) in rows {
        if help.is_empty() {
            out.push_str(&format!("  {}\n", left));
        } else {
            out.push_str(&format!("  {:width$}  {}\n", left, help, width = width));
        }
    }
}
