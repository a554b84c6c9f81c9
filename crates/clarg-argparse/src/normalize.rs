//! Coercion of raw argv values into [`Value`]s.

use crate::parameter::Parameter;
use crate::token::TokenValue;
use crate::value::Value;

/// Coerce the value adjoining a parameter on the command line.
///
/// - negatable booleans ignore `raw` and flip their default
/// - variadic parameters always produce a list
/// - a missing value is `Null` for required parameters (validation reports
///   it later) and `true` otherwise
/// - anything else goes through the parameter's filter
pub fn normalize(param: &dyn Parameter, raw: Option<TokenValue<'_>>) -> Value {
    if param.is_bool() {
        return match param.default_value() {
            Value::Bool(b) => Value::Bool(!b),
            _ => Value::Bool(true),
        };
    }

    if param.variadic() {
        let items = match raw {
            None => Vec::new(),
            Some(TokenValue::Scalar(s)) => vec![param.filter(s)],
            Some(TokenValue::List(items)) => items.into_iter().map(|s| param.filter(s)).collect(),
        };
        return Value::List(items);
    }

    match raw {
        None if param.required() => Value::Null,
        None => Value::Bool(true),
        Some(TokenValue::Scalar(s)) => param.filter(s),
        Some(TokenValue::List(items)) => {
            Value::List(items.into_iter().map(|s| param.filter(s)).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::{ArgumentDef, OptionDef};

    #[test]
    fn negatable_flag_flips_default_and_ignores_value() {
        let no = OptionDef::new("-n --no-more");
        assert_eq!(normalize(&no, None), Value::Bool(false));
        assert_eq!(
            normalize(&no, Some(TokenValue::Scalar("x"))),
            Value::Bool(false)
        );
        assert_eq!(normalize(&no, None), Value::Bool(false));

        let with = OptionDef::new("--with-cache");
        assert_eq!(normalize(&with, None), Value::Bool(true));
    }

    #[test]
    fn variadic_wraps_scalars() {
        let arg = ArgumentDef::new("<files...>");
        assert_eq!(
            normalize(&arg, Some(TokenValue::Scalar("a"))),
            Value::from(vec!["a"])
        );
        assert_eq!(
            normalize(&arg, Some(TokenValue::List(vec!["a", "b"]))),
            Value::from(vec!["a", "b"])
        );
        assert_eq!(normalize(&arg, None), Value::List(vec![]));
    }

    #[test]
    fn missing_value_depends_on_required() {
        assert_eq!(normalize(&OptionDef::new("-c <path>"), None), Value::Null);
        assert_eq!(
            normalize(&OptionDef::new("-f|--force"), None),
            Value::Bool(true)
        );
    }

    #[test]
    fn explicit_value_is_filtered() {
        let opt = OptionDef::new("--level").with_filter(|s| Value::from(s.to_uppercase()));
        assert_eq!(
            normalize(&opt, Some(TokenValue::Scalar("debug"))),
            Value::from("DEBUG")
        );
    }
}
