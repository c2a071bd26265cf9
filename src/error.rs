use crate::parse::InvalidToken;
use crate::roll::RollError;
use crate::variables::VariableError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every failure an equation can produce. The `Display` output is meant to be
/// shown to the user as-is.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("{0}")]
    InvalidToken(#[from] InvalidToken),
    #[error("{0}")]
    BadEquation(String),
    #[error("Unknown variable **{0}**")]
    UnknownVariable(String),
    #[error("Missing argument **${0}**")]
    MissingArgument(usize),
    #[error("Unknown function **{0}**")]
    UnknownFunction(String),
    #[error("{0}")]
    Roll(#[from] RollError),
    #[error("{0}")]
    Variable(#[from] VariableError),
}

impl Error {
    pub fn bad_equation(msg: impl ToString) -> Self {
        Self::BadEquation(msg.to_string())
    }

    pub(crate) fn too_large() -> Self {
        Self::bad_equation("number too large")
    }

    pub(crate) fn too_deep() -> Self {
        Self::bad_equation("too much recursion")
    }

    pub(crate) fn division_by_zero() -> Self {
        Self::bad_equation("division by zero")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(Error::bad_equation("oops").to_string(), "oops");
        assert_eq!(
            Error::UnknownFunction("foo".into()).to_string(),
            "Unknown function **foo**"
        );
        assert_eq!(Error::MissingArgument(2).to_string(), "Missing argument **$2**");
        assert_eq!(
            Error::from(RollError::BadRoll { sides: 0 }).to_string(),
            "cannot roll a die with 0 sides"
        );
    }
}
