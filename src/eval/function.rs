use super::evaluator::Evaluator;
use crate::common::*;
use crate::error::{Error, Result};
use crate::parse::{self, ast};
use std::rc::Rc;

#[enum_dispatch::enum_dispatch]
pub trait Call {
    fn name(&self) -> &str;

    /// Receives the unevaluated argument nodes, so a function decides which
    /// of them are evaluated.
    fn call(&self, eval: &mut Evaluator<'_>, args: &[ast::Node]) -> Result<Int>;
}

#[enum_dispatch::enum_dispatch(Call)]
#[derive(Debug, Clone)]
pub enum Function {
    If(If),
    And(And),
    Or(Or),
    Not(Not),
    Equal(Equal),
    Max(Max),
    Min(Min),
    Adv(Adv),
    Top(Top),
    Bot(Bot),
    User(UserFunction),
}

impl Function {
    pub fn builtins() -> [Function; 10] {
        [
            If.into(),
            And.into(),
            Or.into(),
            Not.into(),
            Equal.into(),
            Max.into(),
            Min.into(),
            Adv.into(),
            Top.into(),
            Bot.into(),
        ]
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, Self::User(_))
    }
}

fn arity_error(name: &str, expected: &str, got: usize) -> Error {
    Error::bad_equation(format!(
        "{}() takes {} arguments but {} were given",
        name, expected, got
    ))
}

fn exactly<'n, const N: usize>(name: &str, args: &'n [ast::Node]) -> Result<&'n [ast::Node; N]> {
    args.try_into()
        .map_err(|_| arity_error(name, &N.to_string(), args.len()))
}

fn at_least_one(name: &str, values: Vec<Int>) -> Result<NonEmpty<Int>> {
    let got = values.len();
    NonEmpty::try_from_vec(values).map_err(|_| arity_error(name, "at least 1", got))
}

fn truth(b: bool) -> Int {
    b as Int
}

/// `if(cond, then, else)`. Only the chosen branch is evaluated.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct If;

impl Call for If {
    fn name(&self) -> &str {
        "if"
    }

    fn call(&self, eval: &mut Evaluator<'_>, args: &[ast::Node]) -> Result<Int> {
        let [cond, then, otherwise] = exactly::<3>(self.name(), args)?;
        if eval.eval(cond)? != 0 {
            eval.eval(then)
        } else {
            eval.eval(otherwise)
        }
    }
}

/// Evaluates every argument before combining them.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct And;

impl Call for And {
    fn name(&self) -> &str {
        "and"
    }

    fn call(&self, eval: &mut Evaluator<'_>, args: &[ast::Node]) -> Result<Int> {
        let values = eval.eval_all(args)?;
        Ok(truth(values.iter().all(|&x| x != 0)))
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Or;

impl Call for Or {
    fn name(&self) -> &str {
        "or"
    }

    fn call(&self, eval: &mut Evaluator<'_>, args: &[ast::Node]) -> Result<Int> {
        let values = eval.eval_all(args)?;
        Ok(truth(values.iter().any(|&x| x != 0)))
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Not;

impl Call for Not {
    fn name(&self) -> &str {
        "not"
    }

    fn call(&self, eval: &mut Evaluator<'_>, args: &[ast::Node]) -> Result<Int> {
        let [x] = exactly::<1>(self.name(), args)?;
        Ok(truth(eval.eval(x)? == 0))
    }
}

/// `eq(a, b, ...)`: 1 when every argument is equal.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Equal;

impl Call for Equal {
    fn name(&self) -> &str {
        "eq"
    }

    fn call(&self, eval: &mut Evaluator<'_>, args: &[ast::Node]) -> Result<Int> {
        let values = at_least_one(self.name(), eval.eval_all(args)?)?;
        let first = *values.first();
        Ok(truth(values.iter().all(|&x| x == first)))
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Max;

impl Call for Max {
    fn name(&self) -> &str {
        "max"
    }

    fn call(&self, eval: &mut Evaluator<'_>, args: &[ast::Node]) -> Result<Int> {
        let values = at_least_one(self.name(), eval.eval_all(args)?)?;
        Ok(values.iter().copied().fold(*values.first(), Int::max))
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Min;

impl Call for Min {
    fn name(&self) -> &str {
        "min"
    }

    fn call(&self, eval: &mut Evaluator<'_>, args: &[ast::Node]) -> Result<Int> {
        let values = at_least_one(self.name(), eval.eval_all(args)?)?;
        Ok(values.iter().copied().fold(*values.first(), Int::min))
    }
}

/// `adv(sides = 20)`: the higher of two dice.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Adv;

impl Call for Adv {
    fn name(&self) -> &str {
        "adv"
    }

    fn call(&self, eval: &mut Evaluator<'_>, args: &[ast::Node]) -> Result<Int> {
        let sides = match args {
            [] => 20,
            [sides] => eval.eval(sides)?,
            _ => return Err(arity_error(self.name(), "0 or 1", args.len())),
        };
        Ok(eval.dice().roll_top(sides, 2, 1, true)?)
    }
}

/// `top(times, sides, n)`: rolls `times` dice and keeps the `n` highest.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Top;

impl Call for Top {
    fn name(&self) -> &str {
        "top"
    }

    fn call(&self, eval: &mut Evaluator<'_>, args: &[ast::Node]) -> Result<Int> {
        let [times, sides, n] = exactly::<3>(self.name(), args)?;
        let (times, sides, n) = (eval.eval(times)?, eval.eval(sides)?, eval.eval(n)?);
        Ok(eval.dice().roll_top(sides, times, n, true)?)
    }
}

/// `bot(times, sides, n)`: rolls `times` dice and keeps the `n` lowest.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Bot;

impl Call for Bot {
    fn name(&self) -> &str {
        "bot"
    }

    fn call(&self, eval: &mut Evaluator<'_>, args: &[ast::Node]) -> Result<Int> {
        let [times, sides, n] = exactly::<3>(self.name(), args)?;
        let (times, sides, n) = (eval.eval(times)?, eval.eval(sides)?, eval.eval(n)?);
        Ok(eval.dice().roll_top(sides, times, n, false)?)
    }
}

/// A named equation. Arguments are evaluated in the caller and read back
/// inside the body as `$1`, `$2`, ...
#[derive(Debug, Clone)]
pub struct UserFunction {
    name: String,
    body: Rc<ast::Expression>,
}

impl UserFunction {
    pub fn new(name: impl Into<String>, body: ast::Expression) -> Self {
        Self {
            name: name.into(),
            body: Rc::new(body),
        }
    }

    pub fn parse(name: impl Into<String>, body: &str) -> Result<Self> {
        Ok(Self::new(name, parse::parse(body)?))
    }

    pub fn body(&self) -> &ast::Expression {
        &self.body
    }
}

impl Call for UserFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, eval: &mut Evaluator<'_>, args: &[ast::Node]) -> Result<Int> {
        let args = eval.eval_all(args)?;
        eval.call_user(&self.body, args)
    }
}
