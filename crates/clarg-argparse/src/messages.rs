//! Message templates for errors.
//!
//! Implement [`Messages`] to translate or reword; only override what you need.

pub trait Messages {
    fn duplicate_parameter(&self, label: &str, name: &str) -> String {
        format!("{label} \"{name}\" is already registered")
    }

    fn variadic_not_last(&self, name: &str) -> String {
        format!("Only the last argument can be variadic, \"{name}\" is not last")
    }

    fn unknown_option(&self, option: &str) -> String {
        format!("Option \"{option}\" not registered")
    }

    fn missing_required(&self, label: &str, name: &str) -> String {
        format!("{label} \"{name}\" is required")
    }

    fn invalid_variadic_content(&self, token: &str) -> String {
        format!("Invalid parameter \"{token}\" in variadic group")
    }
}

/// English defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMessages;

impl Messages for DefaultMessages {}
