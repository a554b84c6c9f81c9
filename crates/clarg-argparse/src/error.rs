//! Errors raised while declaring parameters or parsing argv.
//!
//! Every variant keeps the structured detail plus the user-facing message,
//! which is rendered through the parser's [`Messages`](crate::messages::Messages).

/// Declaration mistakes. Raised before any parsing happens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    /// Two parameters derive the same attribute name (or share a flag form).
    #[error("{message}")]
    DuplicateParameter { name: String, message: String },

    /// More than one variadic argument in one `arguments()` batch.
    #[error("{message}")]
    VariadicNotLast { name: String, message: String },
}

impl RegistrationError {
    pub fn message(&self) -> &str {
        match self {
            Self::DuplicateParameter { message, .. } | Self::VariadicNotLast { message, .. } => {
                message
            }
        }
    }
}

/// Failures of `Parser::parse`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// `option` is the flag exactly as typed.
    #[error("{message}")]
    UnknownOption { option: String, message: String },

    /// `label` is `Option` or `Argument`; `name` is the long form or the argument name.
    #[error("{message}")]
    MissingRequired {
        label: &'static str,
        name: String,
        message: String,
    },

    /// A `[ ... ]` group held something other than plain values.
    #[error("{message}")]
    InvalidVariadicContent { token: String, message: String },
}

impl ParseError {
    pub fn message(&self) -> &str {
        match self {
            Self::UnknownOption { message, .. }
            | Self::MissingRequired { message, .. }
            | Self::InvalidVariadicContent { message, .. } => message,
        }
    }
}
