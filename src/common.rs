use std::fmt;
use std::num::NonZeroU32;

pub type Int = i64;
pub type UInt = u32;
pub type NonZeroUInt = NonZeroU32;

pub type Float = f64;

pub type NonEmpty<T> = vec1::Vec1<T>;

/// Binary operators of the expression grammar, grouped by precedence tier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BinaryOperator {
    Eq,
    Ne,
    Le,
    Ge,
    Lt,
    Gt,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Roll,
}

impl BinaryOperator {
    pub const COMPARISON: &'static [Self] =
        &[Self::Eq, Self::Ne, Self::Le, Self::Ge, Self::Lt, Self::Gt];

    pub const ADDITION: &'static [Self] = &[Self::Add, Self::Sub];

    pub const MULTIPLICATION: &'static [Self] = &[Self::Mul, Self::Div, Self::Rem];

    pub const EXPONENT: &'static [Self] = &[Self::Pow];

    pub const DICE: &'static [Self] = &[Self::Roll];

    /// Tiers from loosest to tightest binding.
    pub const TIERS: &'static [&'static [Self]] = &[
        Self::COMPARISON,
        Self::ADDITION,
        Self::MULTIPLICATION,
        Self::EXPONENT,
        Self::DICE,
    ];

    pub fn is_comparison(self) -> bool {
        Self::COMPARISON.contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Pow => "^",
            Self::Roll => "d",
        }
    }

    /// Applies a comparison, yielding `1` or `0`. Returns `None` for
    /// non-comparison operators.
    pub fn compare(self, a: Int, b: Int) -> Option<Int> {
        let result = match self {
            Self::Eq => a == b,
            Self::Ne => a != b,
            Self::Le => a <= b,
            Self::Ge => a >= b,
            Self::Lt => a < b,
            Self::Gt => a > b,
            _ => return None,
        };
        Some(Int::from(result))
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Integer division rounding toward negative infinity.
pub fn floor_div(a: Int, b: Int) -> Option<Int> {
    let q = a.checked_div(b)?;
    if (a % b != 0) && ((a < 0) != (b < 0)) {
        q.checked_sub(1)
    } else {
        Some(q)
    }
}

/// Remainder whose sign follows the divisor, paired with [floor_div].
pub fn floor_mod(a: Int, b: Int) -> Option<Int> {
    let r = a.checked_rem(b)?;
    if r != 0 && ((r < 0) != (b < 0)) {
        Some(r + b)
    } else {
        Some(r)
    }
}

/// Float remainder whose sign follows the divisor.
pub fn float_mod(a: Float, b: Float) -> Float {
    let r = a % b;
    if r != 0.0 && ((r < 0.0) != (b < 0.0)) {
        r + b
    } else {
        r
    }
}
