use crate::common::*;
use std::fmt;

const PER_ROW: usize = 10;
const MAX_ROWS: usize = 4;

/// Whether a single die landed on one of its extremes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CritType {
    None,
    Crit,
    Fail,
}

/// One entry in a [RollLog]. `sides` is `None` for aggregate entries such as
/// a computed total, which only exist to be displayed.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RolledDie {
    pub result: Int,
    pub sides: Option<UInt>,
}

impl RolledDie {
    pub fn new(result: Int, sides: UInt) -> Self {
        Self {
            result,
            sides: Some(sides),
        }
    }

    pub fn aggregate(result: Int) -> Self {
        Self {
            result,
            sides: None,
        }
    }

    /// A one-sided die can't crit or fail.
    pub fn crit(&self) -> CritType {
        match self.sides {
            Some(sides) if sides > 1 && self.result == sides as Int => CritType::Crit,
            Some(sides) if sides > 1 && self.result == 1 => CritType::Fail,
            _ => CritType::None,
        }
    }
}

impl fmt::Display for RolledDie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sides {
            Some(sides) => write!(f, "[{}/{}]", self.result, sides),
            None => write!(f, "[{}]", self.result),
        }
    }
}

/// Every die rolled during one logging session, in roll order.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct RollLog {
    dice: Vec<RolledDie>,
}

impl RollLog {
    pub fn new(dice: Vec<RolledDie>) -> Self {
        Self { dice }
    }

    pub fn dice(&self) -> &[RolledDie] {
        &self.dice
    }

    pub fn len(&self) -> usize {
        self.dice.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dice.is_empty()
    }

    pub fn crits(&self) -> impl Iterator<Item = &RolledDie> + '_ {
        self.dice.iter().filter(|d| d.crit() == CritType::Crit)
    }

    pub fn fails(&self) -> impl Iterator<Item = &RolledDie> + '_ {
        self.dice.iter().filter(|d| d.crit() == CritType::Fail)
    }

    pub fn into_inner(self) -> Vec<RolledDie> {
        self.dice
    }
}

impl Extend<RolledDie> for RollLog {
    fn extend<I: IntoIterator<Item = RolledDie>>(&mut self, iter: I) {
        self.dice.extend(iter)
    }
}

/// Renders `Rolled: [3/6], [5/6]`, ten dice per row, cut off with `...`
/// after four rows. An empty log renders as nothing.
impl fmt::Display for RollLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dice.is_empty() {
            return Ok(());
        }
        f.write_str("Rolled: ")?;
        for (i, row) in self.dice.chunks(PER_ROW).take(MAX_ROWS).enumerate() {
            if i > 0 {
                f.write_str(",\n")?;
            }
            for (j, die) in row.iter().enumerate() {
                if j > 0 {
                    f.write_str(", ")?;
                }
                die.fmt(f)?;
            }
        }
        if self.dice.len() > PER_ROW * MAX_ROWS {
            f.write_str("...")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crit() {
        assert_eq!(RolledDie::new(20, 20).crit(), CritType::Crit);
        assert_eq!(RolledDie::new(1, 20).crit(), CritType::Fail);
        assert_eq!(RolledDie::new(7, 20).crit(), CritType::None);
        assert_eq!(RolledDie::new(1, 1).crit(), CritType::None);
        assert_eq!(RolledDie::aggregate(1).crit(), CritType::None);
    }

    #[test]
    fn test_display() {
        let log = RollLog::new(vec![
            RolledDie::new(3, 6),
            RolledDie::new(5, 6),
            RolledDie::aggregate(8),
        ]);
        assert_eq!(log.to_string(), "Rolled: [3/6], [5/6], [8]");
        assert_eq!(RollLog::default().to_string(), "");
    }

    #[test]
    fn test_display_rows() {
        let log = RollLog::new(vec![RolledDie::new(1, 2); 12]);
        let s = log.to_string();
        assert_eq!(s.lines().count(), 2);
        assert!(!s.ends_with("..."));
    }

    #[test]
    fn test_display_truncated() {
        let log = RollLog::new(vec![RolledDie::new(2, 2); 45]);
        let s = log.to_string();
        assert_eq!(s.lines().count(), 4);
        assert!(s.ends_with("..."));
        assert_eq!(s.matches("[2/2]").count(), 40);
    }

    #[test]
    fn test_crits_and_fails() {
        let log = RollLog::new(vec![
            RolledDie::new(6, 6),
            RolledDie::new(1, 6),
            RolledDie::new(1, 6),
            RolledDie::new(4, 6),
        ]);
        assert_eq!(log.crits().count(), 1);
        assert_eq!(log.fails().count(), 2);
    }
}
