//! Turns raw argv strings into [`Token`]s.
//!
//! Grammars overlap (`-1` could be a flag or a negative number), so each raw
//! string is classified by rules tried in a fixed order:
//!
//! 1. inside a literal region (after `--`) everything is a constant, except a
//!    bare `]` that closes an open group
//! 2. a leading `[` or a trailing `]` (when a group is open) is split off
//! 3. anything not shaped like an option, and numeric literals like `-10`,
//!    are constants
//! 4. `--` starts the literal region
//! 5. `-x`
//! 6. `-abc` expands to `-a -b -c`
//! 7. `-x=value`, the value is classified again
//! 8. `--name`
//! 9. `--name=value`, the value is classified again
//! 10. everything else is a constant
//!
//! While a group is open, produced tokens are nested into the group opener
//! instead of being emitted at the top level.

use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenizeError {
    /// `[` seen while another group is still open.
    #[error("nested variadic group in '{token}'")]
    NestedGroup { token: String },
}

#[derive(Debug)]
enum Step {
    Classify(String),
    Emit(Token),
}

/// Stateful tokenizer. State (literal region, open group) spans the whole argv.
#[derive(Debug, Default)]
pub struct Tokenizer {
    tokens: Vec<Token>,
    literal: bool,
    // Literal region was entered inside the currently open group.
    literal_in_group: bool,
    open_group: Option<usize>,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenize a full argument list (program name already removed).
    pub fn tokenize<I, S>(args: I) -> Result<Vec<Token>, TokenizeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tokenizer = Self::new();
        for arg in args {
            tokenizer.push(arg.as_ref())?;
        }
        Ok(tokenizer.finish())
    }

    /// Whether a `--` region is active.
    pub fn in_literal(&self) -> bool {
        self.literal
    }

    /// Whether a `[` group is waiting for its `]`.
    pub fn in_group(&self) -> bool {
        self.open_group.is_some()
    }

    /// Classify one raw argument.
    pub fn push(&mut self, raw: &str) -> Result<(), TokenizeError> {
        // Worklist instead of recursion: `=` remainders and bracket remainders
        // are pushed back and classified in order.
        let mut work = vec![Step::Classify(raw.to_string())];

        while let Some(step) = work.pop() {
            let s = match step {
                Step::Emit(token) => {
                    self.emit(token);
                    continue;
                }
                Step::Classify(s) => s,
            };

            if self.literal {
                if s == "]" && self.in_group() {
                    self.emit(Token::new(TokenKind::VariadicClose, "]"));
                } else {
                    self.emit(Token::constant(s));
                }
                continue;
            }

            if let Some(rest) = s.strip_prefix('[') {
                if self.in_group() {
                    return Err(TokenizeError::NestedGroup {
                        token: raw.to_string(),
                    });
                }
                self.emit(Token::new(TokenKind::VariadicOpen, "["));
                if !rest.is_empty() {
                    work.push(Step::Classify(rest.to_string()));
                }
                continue;
            }

            if self.in_group() {
                if let Some(rest) = s.strip_suffix(']') {
                    work.push(Step::Emit(Token::new(TokenKind::VariadicClose, "]")));
                    if !rest.is_empty() {
                        work.push(Step::Classify(rest.to_string()));
                    }
                    continue;
                }
            }

            if !is_option_shaped(&s) || is_numeric_literal(&s) {
                self.emit(Token::constant(s));
                continue;
            }

            if s == "--" {
                self.emit(Token::new(TokenKind::Literal, "--"));
                continue;
            }

            if let Some(body) = s.strip_prefix("--") {
                match body.split_once('=') {
                    Some((name, value)) if is_long_name(name) => {
                        let flag = format!("--{name}");
                        work.push(Step::Classify(value.to_string()));
                        self.emit(Token::new(TokenKind::LongOption, flag));
                    }
                    None if is_long_name(body) => {
                        self.emit(Token::new(TokenKind::LongOption, s));
                    }
                    _ => self.emit(Token::constant(s)),
                }
                continue;
            }

            let body = &s[1..];
            match body.split_once('=') {
                Some((name, value)) if is_single_word_char(name) => {
                    let flag = format!("-{name}");
                    work.push(Step::Classify(value.to_string()));
                    self.emit(Token::new(TokenKind::ShortOption, flag));
                }
                None if is_single_word_char(body) => {
                    self.emit(Token::new(TokenKind::ShortOption, s));
                }
                None if body.chars().all(is_word_char) => {
                    for c in body.chars() {
                        self.emit(Token::new(TokenKind::ShortOption, format!("-{c}")));
                    }
                }
                _ => self.emit(Token::constant(s)),
            }
        }

        Ok(())
    }

    /// Finish tokenizing. An unclosed group simply ends here.
    pub fn finish(self) -> Vec<Token> {
        self.tokens
    }

    fn emit(&mut self, token: Token) {
        tracing::trace!(kind = ?token.kind(), raw = token.raw(), "token");

        match token.kind() {
            TokenKind::VariadicOpen => {
                self.open_group = Some(self.tokens.len());
                self.tokens.push(token);
            }
            TokenKind::VariadicClose => {
                self.open_group = None;
                if self.literal_in_group {
                    self.literal = false;
                    self.literal_in_group = false;
                }
            }
            TokenKind::Literal => {
                self.literal = true;
                self.literal_in_group = self.in_group();
                self.tokens.push(token);
            }
            TokenKind::Constant | TokenKind::ShortOption | TokenKind::LongOption => {
                match self.open_group {
                    Some(idx) => self.tokens[idx].push_nested(token),
                    None => self.tokens.push(token),
                }
            }
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_single_word_char(s: &str) -> bool {
    let mut chars = s.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if is_word_char(c))
}

fn is_long_name(s: &str) -> bool {
    s.chars().next().is_some_and(is_word_char) && s.chars().all(|c| is_word_char(c) || c == '-')
}

fn is_option_shaped(s: &str) -> bool {
    s.starts_with('-') && s.len() > 1
}

/// `-10`, `-0.345`, `-1e3`. Not `-inf` or `-nan`.
pub(crate) fn is_numeric_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let starts_numeric = digits
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '.');
    starts_numeric && (digits.parse::<i64>().is_ok() || digits.parse::<f64>().is_ok())
}
