//! Lexical units produced by the [`Tokenizer`](crate::tokenizer::Tokenizer).

/// What a [`Token`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `-x`
    ShortOption,
    /// `--name`
    LongOption,
    /// The `--` marker. Everything after it is taken verbatim.
    Literal,
    /// A plain value.
    Constant,
    /// `[` opening a variadic group.
    VariadicOpen,
    /// `]` closing a variadic group.
    VariadicClose,
}

/// Which bracket of a variadic group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Open,
    Close,
}

/// Value carried by a token.
///
/// Group openers with children resolve to a list, everything else to its raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenValue<'a> {
    Scalar(&'a str),
    List(Vec<&'a str>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    raw: String,
    nested: Vec<Token>,
}

impl Token {
    pub fn new(kind: TokenKind, raw: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
            nested: Vec::new(),
        }
    }

    pub fn constant(raw: impl Into<String>) -> Self {
        Self::new(TokenKind::Constant, raw)
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// The text as it appeared in argv (options keep their dashes).
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Children collected between `[` and `]`.
    pub fn nested(&self) -> &[Token] {
        &self.nested
    }

    pub fn is_option(&self) -> bool {
        matches!(self.kind, TokenKind::ShortOption | TokenKind::LongOption)
    }

    pub fn is_constant(&self) -> bool {
        self.kind == TokenKind::Constant
    }

    pub fn is_literal(&self) -> bool {
        self.kind == TokenKind::Literal
    }

    /// With `None`, any bracket token. With a side, only that bracket.
    pub fn is_variadic(&self, side: Option<Side>) -> bool {
        match side {
            None => matches!(
                self.kind,
                TokenKind::VariadicOpen | TokenKind::VariadicClose
            ),
            Some(Side::Open) => self.kind == TokenKind::VariadicOpen,
            Some(Side::Close) => self.kind == TokenKind::VariadicClose,
        }
    }

    pub fn value(&self) -> TokenValue<'_> {
        if self.kind == TokenKind::VariadicOpen && !self.nested.is_empty() {
            TokenValue::List(self.nested.iter().map(|t| t.raw.as_str()).collect())
        } else {
            TokenValue::Scalar(&self.raw)
        }
    }

    pub(crate) fn push_nested(&mut self, child: Token) {
        debug_assert!(self.kind == TokenKind::VariadicOpen);
        debug_assert!(!child.is_variadic(None));
        self.nested.push(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_of_group_lists_children() {
        let mut open = Token::new(TokenKind::VariadicOpen, "[");
        assert_eq!(open.value(), TokenValue::Scalar("["));

        open.push_nested(Token::constant("a"));
        open.push_nested(Token::constant("b"));
        assert_eq!(open.value(), TokenValue::List(vec!["a", "b"]));
    }

    #[test]
    fn variadic_side_queries() {
        let open = Token::new(TokenKind::VariadicOpen, "[");
        let close = Token::new(TokenKind::VariadicClose, "]");
        assert!(open.is_variadic(None));
        assert!(open.is_variadic(Some(Side::Open)));
        assert!(!open.is_variadic(Some(Side::Close)));
        assert!(close.is_variadic(Some(Side::Close)));
        assert!(!Token::constant("x").is_variadic(None));
    }

    #[test]
    fn option_kinds() {
        assert!(Token::new(TokenKind::ShortOption, "-a").is_option());
        assert!(Token::new(TokenKind::LongOption, "--all").is_option());
        assert!(!Token::new(TokenKind::Literal, "--").is_option());
    }
}
