mod ctx;
mod evaluator;
mod function;

pub use ctx::Context;
pub use evaluator::Evaluator;
pub use function::{Adv, And, Bot, Call, Equal, Function, If, Max, Min, Not, Or, Top, UserFunction};

use crate::common::Int;
use crate::error::Result;
use crate::parse::{self, ast::Expression, visit::Accept};
use crate::roll::Dice;
use tracing::debug;

/// Evaluates a parsed equation. The roll count on `dice` starts over.
#[tracing::instrument(level = "debug", skip_all, fields(equation = %expr))]
pub fn evaluate(expr: &Expression, ctx: &Context<'_>, dice: &mut Dice) -> Result<Int> {
    dice.reset();
    let result = expr.accept(&mut Evaluator::new(ctx, dice));
    debug!(?result, rolls = dice.rolls(), "evaluated");
    result
}

/// Parses `text` under the context's limits and evaluates it.
pub fn evaluate_str(text: &str, ctx: &Context<'_>, dice: &mut Dice) -> Result<Int> {
    let expr = parse::parse_with_limits(text, ctx.limits)?;
    evaluate(&expr, ctx, dice)
}
