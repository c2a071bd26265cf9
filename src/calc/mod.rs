//! A shunting-yard calculator over loosely tokenized text.
//!
//! Separate from the expression tree: it works on floats, treats anything
//! above zero as true, and lets stored equations be called by name. Its `d`
//! binds tighter than any named function, so `min(1,2)d6` is
//! `min(1, 2d6)` here.

mod elements;
mod table;

pub use elements::get_elements;
pub use table::{Builtin, EquationSource, Operation, StoredEquation};

use crate::common::*;
use crate::config::Limits;
use crate::error::{Error, Result};
use crate::num::Number;
use crate::roll::Dice;
use crate::scope::Scope;
use crate::variables::set_all_variables;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, trace};

/// Substitution passes allowed when binding a stored equation's arguments.
const BINDING_PASSES: usize = 20;

/// One entry of a postfix equation.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Number(Float),
    Operator(String),
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(x) => fmt::Display::fmt(&Number::normalize(*x), f),
            Self::Operator(op) => f.write_str(op),
        }
    }
}

pub type Operations<'s> = Scope<'s, Operation>;

fn precedence(ops: &Operations<'_>, token: &str) -> Result<u8> {
    Ok(ops.get(token)?.map_or(0, |op| op.precedence()))
}

pub struct Calculator<'s> {
    source: Option<&'s dyn EquationSource>,
    stats: HashMap<String, Number>,
    limits: Limits,
}

impl<'s> Calculator<'s> {
    pub fn new() -> Self {
        Self {
            source: None,
            stats: HashMap::new(),
            limits: Limits::default(),
        }
    }

    /// Lets equations call stored equations by name.
    pub fn with_source(mut self, source: &'s dyn EquationSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Values substituted for `{name}` blocks.
    pub fn with_stats(mut self, stats: impl IntoIterator<Item = (String, Number)>) -> Self {
        self.stats.extend(stats);
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// The builtin table, backed by the equation source if there is one.
    pub fn operations(&self) -> Operations<'s> {
        table::operations(self.source)
    }

    /// Reorders infix elements into postfix.
    ///
    /// A comma closes the argument before it, so `max(1, 2)` becomes
    /// `1 2 max`. Unknown words get the lowest precedence.
    pub fn load_equation(&self, elements: &[String], ops: &Operations<'_>) -> Result<Vec<Element>> {
        let mut stack: Vec<&str> = Vec::new();
        let mut output = Vec::with_capacity(elements.len());
        let mut parens: isize = 0;

        for element in elements {
            if let Ok(x) = element.parse::<Float>() {
                output.push(Element::Number(x));
                continue;
            }

            match element.as_str() {
                ")" => {
                    parens -= 1;
                    while let Some(top) = stack.pop() {
                        if top == "(" {
                            break;
                        }
                        if top != "," {
                            output.push(Element::Operator(top.to_owned()));
                        }
                    }
                    continue;
                }
                "(" => parens += 1,
                "," => {
                    let mut closed = false;
                    while let Some(&top) = stack.last() {
                        if top != "(" {
                            stack.pop();
                        }
                        if top == "," || top == "(" {
                            closed = true;
                            break;
                        }
                        output.push(Element::Operator(top.to_owned()));
                    }
                    if !closed {
                        return Err(Error::bad_equation("Improper use of commas."));
                    }
                }
                op => {
                    let current = precedence(ops, op)?;
                    while let Some(&top) = stack.last() {
                        if current > precedence(ops, top)? {
                            break;
                        }
                        stack.pop();
                        if top == "(" {
                            return Err(Error::bad_equation("Mismatched parentheses."));
                        }
                        output.push(Element::Operator(top.to_owned()));
                    }
                }
            }
            stack.push(element);
        }

        if parens != 0 {
            return Err(Error::bad_equation("Mismatched parentheses."));
        }
        output.extend(stack.into_iter().rev().map(|op| Element::Operator(op.to_owned())));
        Ok(output)
    }

    /// Runs a postfix equation. `depth` counts stored equations currently
    /// being evaluated above this one.
    pub fn calculate_equation(
        &self,
        equation: &[Element],
        ops: &Operations<'_>,
        dice: &mut Dice,
        depth: usize,
    ) -> Result<Float> {
        let mut stack: Vec<Float> = Vec::new();

        for element in equation {
            let name = match element {
                Element::Number(x) => {
                    stack.push(*x);
                    continue;
                }
                Element::Operator(name) => name,
            };

            let op = ops.get(name)?;
            let arity = op.as_ref().map_or(2, Operation::arity);
            if stack.len() < arity {
                return Err(Error::bad_equation("Invalid number of operands"));
            }
            let args = stack.split_off(stack.len() - arity);

            let value = match op {
                Some(Operation::Builtin(b)) => b.apply(&args, dice).map_err(|err| match err {
                    Error::Roll(err) => Error::bad_equation(err),
                    err => err,
                })?,
                Some(Operation::Equation(eq)) => self.call_equation(&eq, &args, dice, depth)?,
                None => return Err(Error::bad_equation(format!("Invalid Function **{}**", name))),
            };
            trace!(%name, value, "applied");
            stack.push(value);
        }

        match stack.as_slice() {
            &[x] => Ok(x),
            _ => Err(Error::bad_equation("Invalid number of operands.")),
        }
    }

    fn call_equation(
        &self,
        eq: &StoredEquation,
        args: &[Float],
        dice: &mut Dice,
        depth: usize,
    ) -> Result<Float> {
        let args: Vec<Number> = args.iter().copied().map(Number::normalize).collect();
        let text = self.bind_arguments(&eq.value, &args)?;
        Ok(self.parse_at(&text, dice, depth + 1)?.as_float())
    }

    /// Fills `{0}`-style blocks with `args` and `{name}` blocks with stats,
    /// repeating while substituted values bring in more blocks.
    pub fn bind_arguments(&self, equation: &str, args: &[Number]) -> Result<String> {
        Ok(set_all_variables(equation, args, &self.stats, BINDING_PASSES)?)
    }

    fn parse_at(&self, text: &str, dice: &mut Dice, depth: usize) -> Result<Number> {
        if depth > self.limits.max_call_depth {
            return Err(Error::too_deep());
        }
        let ops = self.operations();
        let elements = get_elements(text);
        let equation = self.load_equation(&elements, &ops)?;
        let value = self.calculate_equation(&equation, &ops, dice, depth)?;
        Ok(Number::normalize(value))
    }

    /// Evaluates an equation that has already had its `{...}` blocks
    /// substituted. The roll count on `dice` starts over.
    #[tracing::instrument(level = "debug", skip(self, dice))]
    pub fn parse_equation(&self, text: &str, dice: &mut Dice) -> Result<Number> {
        dice.reset();
        let result = self.parse_at(text, dice, 0);
        debug!(?result, "calculated");
        result
    }

    /// Substitutes stats into `text`, then evaluates it.
    pub fn calculate(&self, text: &str, dice: &mut Dice) -> Result<Number> {
        let text = self.bind_arguments(text, &[])?;
        self.parse_equation(&text, dice)
    }
}

impl Default for Calculator<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Calculator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Calculator")
            .field("source", &self.source.is_some())
            .field("stats", &self.stats)
            .field("limits", &self.limits)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{evaluate_str, Context};
    use crate::roll::roller::StepRoller;
    use crate::variables::VariableError;

    fn dice() -> Dice {
        Dice::new(StepRoller::new(1, 1))
    }

    fn check(s: &str, expected: Number) {
        let result = Calculator::new().parse_equation(s, &mut dice());
        assert_eq!(result, Ok(expected), "{}", s);
    }

    fn check_err(s: &str) {
        let result = Calculator::new().parse_equation(s, &mut dice());
        assert!(
            matches!(result, Err(Error::BadEquation(_))),
            "{}: {:?}",
            s,
            result
        );
    }

    fn postfix(s: &str) -> String {
        let calc = Calculator::new();
        let ops = calc.operations();
        let equation = calc.load_equation(&get_elements(s), &ops).unwrap();
        equation
            .iter()
            .map(Element::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_load_equation() {
        assert_eq!(postfix("5 + 4 * 3"), "5 4 3 * +");
        assert_eq!(postfix("max(1, 2) + 3"), "1 2 max 3 +");
        assert_eq!(postfix("if(1, 5, 0)"), "1 5 0 if");
        assert_eq!(postfix("2d6 + 1"), "2 6 d 1 +");
        assert_eq!(postfix("1 - 2 - 3"), "1 2 - 3 -");
    }

    #[test]
    fn test_die_parse() {
        check_err("aah");
        check_err("xd5");
        check("5.4d1", Number::Int(5));
        check_err("1d0");
    }

    #[test]
    fn test_math_parse() {
        check("1 + 1", Number::Int(2));
        check("1 - 1", Number::Int(0));
        check("2 * 2", Number::Int(4));
        check("1 / 2", Number::Float(0.5));
        check("1 % 2", Number::Int(1));
        check("2 ^ 3", Number::Int(8));
        check("floor(1.5)", Number::Int(1));
        check("ceil(1.5)", Number::Int(2));
        check("round(1.5)", Number::Int(2));
        check("round(2.5)", Number::Int(2));
        check("max(1, 2)", Number::Int(2));
        check("min(1, 2)", Number::Int(1));
        check("-5 + 2", Number::Int(-3));
        check("5 - -3", Number::Int(8));
    }

    #[test]
    fn test_logic() {
        check("if(1, 5, 0)", Number::Int(5));
        check("if(0, 5, 0)", Number::Int(0));
        check("if(-1, 5, 0)", Number::Int(0));
        check("or(0, 0)", Number::Int(0));
        check("or(1, 0)", Number::Int(1));
        check("or(0, 1)", Number::Int(1));
        check("or(1, 1)", Number::Int(1));
        check("and(0, 0)", Number::Int(0));
        check("and(1, 0)", Number::Int(0));
        check("and(0, 1)", Number::Int(0));
        check("and(1, 1)", Number::Int(1));
        check("true", Number::Int(1));
        check("if(false, 5, 7)", Number::Int(7));
    }

    #[test]
    fn test_inequality() {
        let cases = [
            ("2 > 1", 1),
            ("1 > 2", 0),
            ("2 > 2", 0),
            ("1 < 2", 1),
            ("2 < 1", 0),
            ("2 < 2", 0),
            ("1 = 2", 0),
            ("2 = 1", 0),
            ("2 = 2", 1),
            ("1 <> 2", 1),
            ("2 <> 1", 1),
            ("2 <> 2", 0),
            ("1 <= 2", 1),
            ("2 <= 1", 0),
            ("2 <= 2", 1),
            ("1 >= 2", 0),
            ("2 >= 1", 1),
            ("2 >= 2", 1),
        ];
        for (s, expected) in cases {
            check(s, Number::Int(expected));
        }
    }

    #[test]
    fn test_complex_equations() {
        check("(floor(5 * 4 + 3 / 6) % 6)", Number::Int(2));
        check("((5 * 4 + 3 / 6) % 6)", Number::Float(2.5));
    }

    #[test]
    fn test_dice() {
        // StepRoller yields 1, 2, 3, ...
        check("3d6", Number::Int(6));
        check("adv(20)", Number::Int(2));
        check("dis(20)", Number::Int(1));
        check("top(4, 6, 3)", Number::Int(9));
        check("bot(4, 6, 3)", Number::Int(6));
    }

    #[test]
    fn test_malformed() {
        check_err("(1 + 2");
        check_err("1 + 2)");
        check_err("1 +");
        check_err("1, 2");
        check_err("1 & 2");
        check_err("2 × 3");
        check_err("é");
        check_err("");
    }

    #[test]
    fn test_whitespace_is_dropped() {
        // Elements are read after all whitespace is stripped.
        check("1 2", Number::Int(12));
        check("2 d 6", Number::Int(3));
    }

    #[test]
    fn test_float_arguments_stay_decimal() {
        let library: HashMap<String, StoredEquation> =
            [("inc".to_owned(), StoredEquation::new("{0} + 1", 1))].into_iter().collect();
        let calc = Calculator::new().with_source(&library);
        let mut dice = dice();
        assert_eq!(
            calc.parse_equation("inc(10 ^ 20)", &mut dice),
            Ok(Number::Float(1e20))
        );
        assert_eq!(
            calc.parse_equation("inc(1 / 10000000)", &mut dice),
            Ok(Number::Float(1.0 / 10000000.0 + 1.0))
        );
    }

    #[test]
    fn test_dice_precedence_differs_from_tree() {
        // Here `d` outranks named functions; in the tree grammar a call is a
        // value, so the same text rolls a different number of dice.
        let mut calc_dice = dice();
        let calc = Calculator::new().parse_equation("min(1,2)d6", &mut calc_dice);
        assert_eq!(calc, Ok(Number::Int(1)));
        assert_eq!(calc_dice.rolls(), 2);

        let mut tree_dice = dice();
        let tree = evaluate_str("min(1,2)d6", &Context::new(), &mut tree_dice);
        assert_eq!(tree, Ok(1));
        assert_eq!(tree_dice.rolls(), 1);
    }

    fn library() -> HashMap<String, StoredEquation> {
        [
            ("double", StoredEquation::new("{0} * 2", 1)),
            ("attack", StoredEquation::new("double(3) + {str}", 0)),
            ("add", StoredEquation::new("{0} + {1}", 2)),
            ("loop", StoredEquation::new("loop + 1", 0)),
            ("ping", StoredEquation::new("pong + 1", 0)),
            ("pong", StoredEquation::new("ping + 1", 0)),
            ("half:2", StoredEquation::new("{0} / 2", 1)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect()
    }

    fn stats() -> Vec<(String, Number)> {
        vec![("str".to_owned(), Number::Int(4))]
    }

    #[test]
    fn test_stored_equations() {
        let library = library();
        let calc = Calculator::new().with_source(&library).with_stats(stats());
        let mut dice = dice();
        assert_eq!(calc.parse_equation("double(5)", &mut dice), Ok(Number::Int(10)));
        assert_eq!(calc.parse_equation("attack + 1", &mut dice), Ok(Number::Int(11)));
        assert_eq!(calc.parse_equation("add(2, 3) * 2", &mut dice), Ok(Number::Int(10)));
        assert_eq!(calc.parse_equation("half:2(5)", &mut dice), Ok(Number::Float(2.5)));
        assert_eq!(calc.calculate("{str} * 3", &mut dice), Ok(Number::Int(12)));
    }

    #[test]
    fn test_recursion_capped() {
        let library = library();
        let calc = Calculator::new().with_source(&library);
        let mut dice = dice();
        assert_eq!(calc.parse_equation("loop", &mut dice), Err(Error::too_deep()));
        assert_eq!(calc.parse_equation("ping", &mut dice), Err(Error::too_deep()));
    }

    #[test]
    fn test_bind_arguments() {
        let calc = Calculator::new().with_stats(stats());
        assert_eq!(
            calc.bind_arguments("{0} + {str}", &[Number::Float(1.5)]),
            Ok("1.5 + 4".to_owned())
        );
        assert_eq!(
            calc.bind_arguments("{1}", &[Number::Int(1)]),
            Err(Error::Variable(VariableError::MissingIndex(1)))
        );
        assert_eq!(
            calc.bind_arguments("{dex}", &[]),
            Err(Error::Variable(VariableError::MissingName("dex".into())))
        );
    }
}
