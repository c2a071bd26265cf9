use crate::common::*;
use crate::error::{Error, Result};
use crate::roll::Dice;
use crate::scope::{Resolver, Scope};
use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::BuildHasher;

/// Operators and functions the calculator knows without any storage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Builtin {
    Lt,
    Le,
    Ge,
    Gt,
    Ne,
    Eq,
    And,
    Or,
    True,
    False,
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Rem,
    Round,
    Max,
    Min,
    Floor,
    Ceil,
    Adv,
    Dis,
    Top,
    Bot,
    If,
    Roll,
}

/// Anything above zero.
fn is_true(x: Float) -> bool {
    x > 0.0
}

fn truth(b: bool) -> Float {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Rounds half to even, as dice counts and sides must be whole.
fn round(x: Float) -> Result<Int> {
    let x = x.round_ties_even();
    if x.is_finite() && x.abs() < Int::MAX as Float {
        Ok(x as Int)
    } else {
        Err(Error::too_large())
    }
}

impl Builtin {
    pub const ALL: [Builtin; 27] = {
        use Builtin::*;
        [
            Lt, Le, Ge, Gt, Ne, Eq, And, Or, True, False, Add, Sub, Mul, Div, Pow, Rem, Round,
            Max, Min, Floor, Ceil, Adv, Dis, Top, Bot, If, Roll,
        ]
    };

    pub fn symbol(self) -> &'static str {
        use Builtin::*;
        match self {
            Lt => "<",
            Le => "<=",
            Ge => ">=",
            Gt => ">",
            Ne => "<>",
            Eq => "=",
            And => "and",
            Or => "or",
            True => "true",
            False => "false",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Pow => "^",
            Rem => "%",
            Round => "round",
            Max => "max",
            Min => "min",
            Floor => "floor",
            Ceil => "ceil",
            Adv => "adv",
            Dis => "dis",
            Top => "top",
            Bot => "bot",
            If => "if",
            Roll => "d",
        }
    }

    /// Higher binds tighter. `d` sits above the named functions.
    pub fn precedence(self) -> u8 {
        use Builtin::*;
        match self {
            Lt | Le | Ge | Gt | Ne | Eq | And | Or | True | False => 1,
            Add | Sub => 2,
            Mul | Div => 3,
            Pow | Rem => 4,
            Round | Max | Min | Floor | Ceil | Adv | Dis | Top | Bot | If => 6,
            Roll => 7,
        }
    }

    pub fn arity(self) -> usize {
        use Builtin::*;
        match self {
            True | False => 0,
            Round | Floor | Ceil | Adv | Dis => 1,
            If | Top | Bot => 3,
            _ => 2,
        }
    }

    /// `args` holds exactly [Builtin::arity] operands, in order.
    pub fn apply(self, args: &[Float], dice: &mut Dice) -> Result<Float> {
        use Builtin::*;
        let value = match (self, args) {
            (Add, &[a, b]) => a + b,
            (Sub, &[a, b]) => a - b,
            (Mul, &[a, b]) => a * b,
            (Div, &[_, b]) | (Rem, &[_, b]) if b == 0.0 => return Err(Error::division_by_zero()),
            (Div, &[a, b]) => a / b,
            (Rem, &[a, b]) => float_mod(a, b),
            (Pow, &[a, b]) => {
                let x = a.powf(b);
                if x.is_nan() {
                    return Err(Error::bad_equation("math domain error"));
                }
                if x.is_infinite() && a.is_finite() && b.is_finite() {
                    return Err(Error::too_large());
                }
                x
            }

            (Lt, &[a, b]) => truth(a < b),
            (Le, &[a, b]) => truth(a <= b),
            (Ge, &[a, b]) => truth(a >= b),
            (Gt, &[a, b]) => truth(a > b),
            (Ne, &[a, b]) => truth(a != b),
            (Eq, &[a, b]) => truth(a == b),
            (And, &[a, b]) => truth(is_true(a) && is_true(b)),
            (Or, &[a, b]) => truth(is_true(a) || is_true(b)),
            (If, &[cond, a, b]) => {
                if is_true(cond) {
                    a
                } else {
                    b
                }
            }
            (True, &[]) => 1.0,
            (False, &[]) => 0.0,

            (Roll, &[count, sides]) => dice.roll_sum(round(sides)?, round(count)?)?.0 as Float,
            (Adv, &[sides]) => dice.roll_top(round(sides)?, 2, 1, true)? as Float,
            (Dis, &[sides]) => dice.roll_top(round(sides)?, 2, 1, false)? as Float,
            (Top, &[times, sides, n]) => {
                dice.roll_top(round(sides)?, round(times)?, round(n)?, true)? as Float
            }
            (Bot, &[times, sides, n]) => {
                dice.roll_top(round(sides)?, round(times)?, round(n)?, false)? as Float
            }

            (Round, &[a]) => a.round_ties_even(),
            (Floor, &[a]) => a.floor(),
            (Ceil, &[a]) => a.ceil(),
            (Max, &[a, b]) => a.max(b),
            (Min, &[a, b]) => a.min(b),

            _ => return Err(Error::bad_equation("Invalid number of operands")),
        };
        Ok(value)
    }
}

/// An equation kept in storage, callable by name from other equations.
/// `params` is how many operands a call consumes.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StoredEquation {
    pub value: String,
    pub params: usize,
}

impl StoredEquation {
    pub fn new(value: impl Into<String>, params: usize) -> Self {
        Self {
            value: value.into(),
            params,
        }
    }
}

/// Storage the calculator can look equations up in. Names may carry a
/// `:id` suffix to pick between equations that share a name.
pub trait EquationSource {
    fn equation(&self, name: &str) -> Result<Option<StoredEquation>>;
}

impl<S: BuildHasher> EquationSource for HashMap<String, StoredEquation, S> {
    fn equation(&self, name: &str) -> Result<Option<StoredEquation>> {
        Ok(self.get(name).cloned())
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Operation {
    Builtin(Builtin),
    Equation(StoredEquation),
}

impl Operation {
    pub fn precedence(&self) -> u8 {
        match self {
            Self::Builtin(b) => b.precedence(),
            Self::Equation(_) => 6,
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Self::Builtin(b) => b.arity(),
            Self::Equation(eq) => eq.params,
        }
    }
}

/// Looks words up in an [EquationSource], asking at most once per name.
struct EquationResolver<'s> {
    source: &'s dyn EquationSource,
    seen: RefCell<HashMap<String, Option<StoredEquation>>>,
}

impl Resolver<Operation> for EquationResolver<'_> {
    fn resolve(&self, name: &str) -> Result<Option<Operation>> {
        if !name.starts_with(|c: char| c.is_ascii_lowercase() || c == ':') {
            return Ok(None);
        }
        if let Some(found) = self.seen.borrow().get(name) {
            return Ok(found.clone().map(Operation::Equation));
        }
        let found = self.source.equation(name)?;
        self.seen
            .borrow_mut()
            .insert(name.to_owned(), found.clone());
        Ok(found.map(Operation::Equation))
    }
}

/// Every builtin, falling back to `source` for anything else.
pub(crate) fn operations<'s>(source: Option<&'s dyn EquationSource>) -> Scope<'s, Operation> {
    let mut scope: Scope<'s, Operation> = Builtin::ALL
        .iter()
        .map(|&b| (b.symbol().to_owned(), Operation::Builtin(b)))
        .collect();
    if let Some(source) = source {
        scope.push_resolver(EquationResolver {
            source,
            seen: RefCell::default(),
        });
    }
    scope
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roll::{roller::StepRoller, RollError};
    use std::cell::Cell;

    fn apply(b: Builtin, args: &[Float]) -> Result<Float> {
        b.apply(args, &mut Dice::new(StepRoller::new(1, 1)))
    }

    #[test]
    fn test_symbols_unique() {
        let scope = operations(None);
        for b in Builtin::ALL {
            assert_eq!(scope.get(b.symbol()).unwrap(), Some(Operation::Builtin(b)));
        }
        assert_eq!(scope.names().count(), Builtin::ALL.len());
    }

    #[test]
    fn test_apply() {
        assert_eq!(apply(Builtin::Div, &[1.0, 2.0]), Ok(0.5));
        assert_eq!(apply(Builtin::Rem, &[-1.0, 3.0]), Ok(2.0));
        assert_eq!(apply(Builtin::Round, &[2.5]), Ok(2.0));
        assert_eq!(apply(Builtin::Round, &[3.5]), Ok(4.0));
        assert_eq!(apply(Builtin::And, &[1.0, -1.0]), Ok(0.0));
        assert_eq!(apply(Builtin::If, &[0.0, 5.0, 7.0]), Ok(7.0));
        assert_eq!(apply(Builtin::True, &[]), Ok(1.0));
        assert_eq!(apply(Builtin::Roll, &[3.0, 6.0]), Ok(6.0));
        assert_eq!(apply(Builtin::Top, &[4.0, 6.0, 3.0]), Ok(9.0));
    }

    #[test]
    fn test_apply_errors() {
        assert_eq!(apply(Builtin::Div, &[1.0, 0.0]), Err(Error::division_by_zero()));
        assert_eq!(apply(Builtin::Pow, &[10.0, 400.0]), Err(Error::too_large()));
        assert_eq!(
            apply(Builtin::Roll, &[1.0, 0.0]),
            Err(Error::Roll(RollError::BadRoll { sides: 0 }))
        );
        assert!(apply(Builtin::Add, &[1.0]).is_err());
    }

    struct CountingSource {
        calls: Cell<usize>,
    }

    impl EquationSource for CountingSource {
        fn equation(&self, name: &str) -> Result<Option<StoredEquation>> {
            self.calls.set(self.calls.get() + 1);
            Ok((name == "str").then(|| StoredEquation::new("10", 0)))
        }
    }

    #[test]
    fn test_resolver_caches() {
        let source = CountingSource {
            calls: Cell::new(0),
        };
        let scope = operations(Some(&source));
        for _ in 0..3 {
            assert_eq!(scope.get("str").unwrap().map(|op| op.precedence()), Some(6));
            assert_eq!(scope.get("nope").unwrap(), None);
        }
        assert_eq!(scope.get("(").unwrap(), None);
        assert_eq!(scope.get("+").unwrap().map(|op| op.arity()), Some(2));
        assert_eq!(source.calls.get(), 2);
    }
}
