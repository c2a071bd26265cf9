use logos::Logos;
use std::fmt;
use std::ops::Range;

/// Token kinds of the expression grammar.
///
/// Names may not begin with a digit or `d`, so `2d6` lexes as
/// `2`, `d`, `6` while `adv` is a single name. Anything after the first
/// character runs until whitespace or a delimiter.
#[derive(Logos, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TokenKind {
    #[regex(r"\s+")]
    Whitespace,

    #[token("<>")]
    NotEqual,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,

    #[token(",")]
    Comma,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("$")]
    Dollar,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("/")]
    Slash,
    #[token("*")]
    Star,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,
    #[token("d")]
    Dice,
    #[token("?")]
    Question,
    #[token("=")]
    Equal,
    #[token("<")]
    LessThan,
    #[token(">")]
    GreaterThan,

    #[regex(r"[0-9]+")]
    Number,

    #[regex(r"[^\s\-*/+<>=()$,%?\^d0-9][^\s\-*/+<>=()$,%?]*")]
    Name,

    #[error]
    Invalid,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        use TokenKind::*;

        match self {
            Whitespace => "whitespace",
            NotEqual => "'<>'",
            LessEqual => "'<='",
            GreaterEqual => "'>='",
            Comma => "','",
            LeftParen => "'('",
            RightParen => "')'",
            Dollar => "'$'",
            Plus => "'+'",
            Minus => "'-'",
            Slash => "'/'",
            Star => "'*'",
            Percent => "'%'",
            Caret => "'^'",
            Dice => "'d'",
            Question => "'?'",
            Equal => "'='",
            LessThan => "'<'",
            GreaterThan => "'>'",
            Number => "number",
            Name => "name",
            Invalid => "invalid",
        }
    }

    pub fn as_binary_op(&self) -> Option<crate::common::BinaryOperator> {
        use crate::common::BinaryOperator::*;
        Some(match self {
            Self::Equal => Eq,
            Self::NotEqual => Ne,
            Self::LessEqual => Le,
            Self::GreaterEqual => Ge,
            Self::LessThan => Lt,
            Self::GreaterThan => Gt,
            Self::Plus => Add,
            Self::Minus => Sub,
            Self::Star => Mul,
            Self::Slash => Div,
            Self::Percent => Rem,
            Self::Caret => Pow,
            Self::Dice => Roll,
            _ => return None,
        })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Character offset into the source, used for the error caret.
    pub position: usize,
    pub span: Range<usize>,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text)
    }
}

/// Splits `s` into tokens, left to right. Whitespace tokens are kept; the
/// parser filters them out.
pub fn tokenize(s: &str) -> Vec<Token<'_>> {
    let mut chars = 0;
    let mut last = 0;
    TokenKind::lexer(s)
        .spanned()
        .map(|(kind, span)| {
            chars += s[last..span.start].chars().count();
            last = span.start;
            Token {
                kind,
                text: &s[span.clone()],
                position: chars,
                span,
            }
        })
        .collect()
}
