use crate::common::Int;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RollError {
    #[error("cannot roll a die with {sides} sides")]
    BadRoll { sides: Int },
    #[error("too many dice rolled")]
    TooManyRolls,
}
