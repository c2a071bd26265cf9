use super::ast::{self, VariableName};
use crate::common::*;
use std::collections::BTreeSet;

pub trait AstVisitor {
    type Output;

    fn visit<T: ?Sized>(&mut self, node: &T) -> Self::Output
    where
        T: Accept<Self>,
    {
        node.accept(self)
    }

    fn visit_number(&mut self, x: Int) -> Self::Output;

    fn visit_group(&mut self, inner: &ast::Node) -> Self::Output;

    fn visit_variable(&mut self, var: &ast::Variable) -> Self::Output;

    fn visit_call(&mut self, call: &ast::Call) -> Self::Output;

    fn visit_negate(&mut self, inner: &ast::Node) -> Self::Output;

    fn visit_binary(
        &mut self,
        l: &ast::Node,
        op: BinaryOperator,
        r: &ast::Node,
    ) -> Self::Output;
}

pub trait Accept<V: AstVisitor + ?Sized> {
    fn accept(&self, v: &mut V) -> V::Output;
}

impl<V: AstVisitor + ?Sized> Accept<V> for ast::Expression {
    fn accept(&self, v: &mut V) -> V::Output {
        v.visit(&self.root)
    }
}

impl<V: AstVisitor + ?Sized> Accept<V> for ast::Node {
    fn accept(&self, v: &mut V) -> V::Output {
        match self {
            Self::Number(x) => v.visit_number(*x),
            Self::Group(x) => v.visit_group(x),
            Self::Variable(x) => v.visit_variable(x),
            Self::Call(x) => v.visit_call(x),
            Self::Negate(x) => v.visit_negate(x),
            Self::Binary(l, op, r) => v.visit_binary(l, *op, r),
        }
    }
}

/// Collects every `$name` and `$n` an expression refers to, including those
/// inside defaults and call arguments.
#[derive(Debug, Default)]
pub(crate) struct VariableCollector {
    pub names: BTreeSet<VariableName>,
}

impl AstVisitor for VariableCollector {
    type Output = ();

    fn visit_number(&mut self, _: Int) {}

    fn visit_group(&mut self, inner: &ast::Node) {
        inner.accept(self)
    }

    fn visit_variable(&mut self, var: &ast::Variable) {
        self.names.insert(var.name.clone());
        if let Some(default) = &var.default {
            default.accept(self);
        }
    }

    fn visit_call(&mut self, call: &ast::Call) {
        for arg in &call.args {
            arg.accept(self);
        }
    }

    fn visit_negate(&mut self, inner: &ast::Node) {
        inner.accept(self)
    }

    fn visit_binary(&mut self, l: &ast::Node, _: BinaryOperator, r: &ast::Node) {
        l.accept(self);
        r.accept(self);
    }
}

impl ast::Expression {
    /// Every variable this expression refers to.
    pub fn variables(&self) -> BTreeSet<VariableName> {
        let mut collector = VariableCollector::default();
        self.accept(&mut collector);
        collector.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    #[test]
    fn test_collect_variables() {
        let expr = parse("$a + max($b?$c, $1) - $a").unwrap();
        let names: Vec<_> = expr.variables().into_iter().collect();
        assert_eq!(
            names,
            vec![
                VariableName::Named("a".into()),
                VariableName::Named("b".into()),
                VariableName::Named("c".into()),
                VariableName::Positional(1),
            ]
        );
    }

    #[test]
    fn test_no_variables() {
        assert!(parse("2d6 + 3").unwrap().variables().is_empty());
    }
}
