pub mod calc;
pub mod common;
pub mod config;
mod error;
pub mod eval;
mod num;
pub mod parse;
pub mod roll;
pub mod scope;
pub mod variables;

pub use calc::Calculator;
pub use config::{Config, Limits, RandomConfig};
pub use error::{Error, Result};
pub use eval::{evaluate, evaluate_str, Context};
pub use num::Number;
pub use parse::parse;
pub use roll::{Dice, RollLog};

/// Evaluates `text` with builtins only, rolling with the thread-local
/// generator, and returns the result along with every die rolled.
pub fn roll(text: &str) -> Result<(common::Int, RollLog)> {
    let mut dice = Dice::default();
    let (result, log) = dice.logged(|dice| evaluate_str(text, &Context::new(), dice));
    Ok((result?, log))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roll() {
        let (result, log) = roll("3d6 + 2").unwrap();
        assert!((5..=20).contains(&result));
        assert_eq!(log.len(), 3);
        assert!(roll("5++5").is_err());
    }
}
