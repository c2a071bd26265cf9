use super::lexer::Token;
use thiserror::Error;

/// A syntax error, pointing at the offending token in the source text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}. Got: {}\n{}\n{}", .message, describe_found(.found), .text, caret(.position))]
pub struct InvalidToken {
    pub message: String,
    /// Text of the offending token; empty when the input ended early.
    pub found: String,
    pub text: String,
    /// Character offset of the offending token.
    pub position: usize,
}

fn describe_found(found: &str) -> String {
    if found.is_empty() {
        "end of input".to_owned()
    } else {
        format!("'{}'", found)
    }
}

fn caret(position: &usize) -> String {
    format!("{}^", " ".repeat(*position))
}

impl InvalidToken {
    pub(crate) fn new(message: impl Into<String>, token: &Token<'_>, source: &str) -> Self {
        Self {
            message: message.into(),
            found: token.text.to_owned(),
            text: source.to_owned(),
            position: token.position,
        }
    }

    pub(crate) fn at_end(message: impl Into<String>, source: &str) -> Self {
        Self {
            message: message.into(),
            found: String::new(),
            text: source.to_owned(),
            position: source.chars().count(),
        }
    }

    /// A line of spaces with a caret under the offending token.
    pub fn pointer(&self) -> String {
        caret(&self.position)
    }
}
