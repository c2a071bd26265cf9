use super::{ctx::Context, function::Call};
use crate::common::*;
use crate::error::{Error, Result};
use crate::parse::{
    ast::{self, VariableName},
    visit::{Accept, AstVisitor},
};
use crate::roll::Dice;

/// Walks an expression tree to a single integer.
///
/// Nested user functions get their own evaluator sharing the same context
/// and dice, with the call's arguments in place of the caller's.
pub struct Evaluator<'a> {
    ctx: &'a Context<'a>,
    args: &'a [Int],
    dice: &'a mut Dice,
    depth: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(ctx: &'a Context<'a>, dice: &'a mut Dice) -> Self {
        Self {
            ctx,
            args: &ctx.args,
            dice,
            depth: 0,
        }
    }

    pub fn context(&self) -> &Context<'a> {
        self.ctx
    }

    pub fn dice(&mut self) -> &mut Dice {
        self.dice
    }

    pub fn eval(&mut self, node: &ast::Node) -> Result<Int> {
        node.accept(self)
    }

    pub fn eval_all(&mut self, nodes: &[ast::Node]) -> Result<Vec<Int>> {
        nodes.iter().map(|node| self.eval(node)).collect()
    }

    pub(crate) fn call_user(&mut self, body: &ast::Expression, args: Vec<Int>) -> Result<Int> {
        if self.depth >= self.ctx.limits.max_call_depth {
            return Err(Error::too_deep());
        }
        let mut inner = Evaluator {
            ctx: self.ctx,
            args: &args,
            dice: &mut *self.dice,
            depth: self.depth + 1,
        };
        body.accept(&mut inner)
    }

    fn lookup(&self, name: &VariableName) -> Result<Option<Int>> {
        match name {
            VariableName::Positional(i) => {
                Ok(i.checked_sub(1).and_then(|i| self.args.get(i)).copied())
            }
            VariableName::Named(name) => self.ctx.variables.get(name),
        }
    }

    fn apply(&mut self, op: BinaryOperator, a: Int, b: Int) -> Result<Int> {
        use BinaryOperator::*;
        match op {
            Add => a.checked_add(b).ok_or_else(Error::too_large),
            Sub => a.checked_sub(b).ok_or_else(Error::too_large),
            Mul => a.checked_mul(b).ok_or_else(Error::too_large),
            Div | Rem if b == 0 => Err(Error::division_by_zero()),
            Div => floor_div(a, b).ok_or_else(Error::too_large),
            Rem => floor_mod(a, b).ok_or_else(Error::too_large),
            Pow if b < 0 => Err(Error::bad_equation("exponents can't be negative")),
            Pow if a == 0 || a == 1 => Ok(if b == 0 { 1 } else { a }),
            Pow if a == -1 => Ok(if b % 2 == 0 { 1 } else { -1 }),
            Pow => UInt::try_from(b)
                .ok()
                .and_then(|b| a.checked_pow(b))
                .ok_or_else(Error::too_large),
            Roll => Ok(self.dice.roll_sum(b, a)?.0),
            Eq | Ne | Le | Ge | Lt | Gt => op
                .compare(a, b)
                .ok_or_else(|| Error::bad_equation(format!("'{}' is not a comparison", op))),
        }
    }
}

impl AstVisitor for Evaluator<'_> {
    type Output = Result<Int>;

    fn visit_number(&mut self, x: Int) -> Self::Output {
        Ok(x)
    }

    fn visit_group(&mut self, inner: &ast::Node) -> Self::Output {
        inner.accept(self)
    }

    fn visit_variable(&mut self, var: &ast::Variable) -> Self::Output {
        match (self.lookup(&var.name)?, &var.default) {
            (Some(x), _) => Ok(x),
            (None, Some(default)) => default.accept(self),
            (None, None) => Err(match &var.name {
                VariableName::Positional(i) => Error::MissingArgument(*i),
                VariableName::Named(name) => Error::UnknownVariable(name.clone()),
            }),
        }
    }

    fn visit_call(&mut self, call: &ast::Call) -> Self::Output {
        let function = self
            .ctx
            .functions
            .get(&call.name)?
            .ok_or_else(|| Error::UnknownFunction(call.name.clone()))?;
        function.call(self, &call.args)
    }

    fn visit_negate(&mut self, inner: &ast::Node) -> Self::Output {
        inner.accept(self)?.checked_neg().ok_or_else(Error::too_large)
    }

    fn visit_binary(&mut self, l: &ast::Node, op: BinaryOperator, r: &ast::Node) -> Self::Output {
        let a = l.accept(self)?;
        let b = r.accept(self)?;
        self.apply(op, a, b)
    }
}
