use crate::common::*;
use std::fmt;

/// A parsed equation, ready to be evaluated any number of times.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub(crate) root: Node,
    pub(crate) source: String,
}

impl Expression {
    pub(crate) fn new(root: Node, source: impl Into<String>) -> Self {
        Self {
            root,
            source: source.into(),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Number(Int),
    Group(Box<Node>),
    Variable(Variable),
    Call(Call),
    Negate(Box<Node>),
    Binary(Box<Node>, BinaryOperator, Box<Node>),
}

impl Node {
    pub(crate) fn new_literal(x: Int) -> Self {
        Self::Number(x)
    }

    pub(crate) fn new_group(inner: Node) -> Self {
        Self::Group(Box::new(inner))
    }

    pub(crate) fn new_negate(inner: Node) -> Self {
        Self::Negate(Box::new(inner))
    }

    pub(crate) fn new_binary(op: BinaryOperator, lhs: Node, rhs: Node) -> Self {
        Self::Binary(Box::new(lhs), op, Box::new(rhs))
    }

    pub(crate) fn new_variable(name: VariableName, default: Option<Node>) -> Self {
        Self::Variable(Variable {
            name,
            default: default.map(Box::new),
        })
    }

    pub(crate) fn new_call(name: impl Into<String>, args: Vec<Node>) -> Self {
        Self::Call(Call {
            name: name.into(),
            args,
        })
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum VariableName {
    Named(String),
    /// A 1-indexed argument reference such as `$1`.
    Positional(usize),
}

impl fmt::Display for VariableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Positional(i) => fmt::Display::fmt(i, f),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: VariableName,
    /// Evaluated only when `name` cannot be found.
    pub default: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: String,
    pub args: Vec<Node>,
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.fmt(f)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(x) => fmt::Display::fmt(x, f),
            Self::Group(inner) => write!(f, "({})", inner),
            Self::Variable(var) => {
                write!(f, "${}", var.name)?;
                match &var.default {
                    Some(default) => write!(f, "?{}", default),
                    None => Ok(()),
                }
            }
            Self::Call(call) => {
                write!(f, "{}(", call.name)?;
                for (i, arg) in call.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    arg.fmt(f)?;
                }
                f.write_str(")")
            }
            Self::Negate(inner) => write!(f, "-{}", inner),
            Self::Binary(l, op, r) => match op {
                BinaryOperator::Roll | BinaryOperator::Pow => write!(f, "{}{}{}", l, op, r),
                _ => write!(f, "{} {} {}", l, op, r),
            },
        }
    }
}
