use super::{
    error::RollError,
    log::{RollLog, RolledDie},
    roller::Roller,
    RResult,
};
use crate::common::*;
use crate::config::Limits;
use tracing::trace;

/// The dice engine an evaluation rolls through.
///
/// Rolls are counted against `max_rolls` until [Dice::reset]. While a
/// [Dice::logged] session is open every die is also recorded.
pub struct Dice {
    roller: Box<dyn Roller>,
    max_rolls: Option<usize>,
    rolls: usize,
    log: Option<Vec<RolledDie>>,
}

impl Dice {
    pub fn new(roller: impl Roller + 'static) -> Self {
        Self {
            roller: Box::new(roller),
            max_rolls: Some(Limits::default().max_rolls),
            rolls: 0,
            log: None,
        }
    }

    pub fn with_max_rolls(mut self, max_rolls: Option<usize>) -> Self {
        self.max_rolls = max_rolls;
        self
    }

    /// Starts a fresh roll count.
    pub fn reset(&mut self) {
        self.rolls = 0;
    }

    pub fn rolls(&self) -> usize {
        self.rolls
    }

    fn count_rolls(&mut self, n: usize) -> RResult<()> {
        self.rolls = self.rolls.saturating_add(n);
        if self.max_rolls.map_or(false, |max| self.rolls > max) {
            Err(RollError::TooManyRolls)
        } else {
            Ok(())
        }
    }

    fn sides(sides: Int) -> RResult<NonZeroUInt> {
        UInt::try_from(sides)
            .ok()
            .and_then(NonZeroUInt::new)
            .ok_or(RollError::BadRoll { sides })
    }

    fn roll_one(&mut self, sides: NonZeroUInt) -> Int {
        let result = self.roller.roll(sides);
        trace!(result, sides = sides.get(), "rolled");
        self.record(RolledDie::new(result as Int, sides.get()));
        result as Int
    }

    /// Rolls a single die in `1..=sides`.
    pub fn roll(&mut self, sides: Int) -> RResult<Int> {
        let sides = Self::sides(sides)?;
        self.count_rolls(1)?;
        Ok(self.roll_one(sides))
    }

    /// Rolls `count` dice and returns their total along with each result.
    /// A non-positive `count` rolls nothing.
    pub fn roll_sum(&mut self, sides: Int, count: Int) -> RResult<(Int, Vec<Int>)> {
        let sides = Self::sides(sides)?;
        let count = usize::try_from(count).unwrap_or(0);
        self.count_rolls(count)?;
        let rolls: Vec<Int> = (0..count).map(|_| self.roll_one(sides)).collect();
        Ok((rolls.iter().sum(), rolls))
    }

    /// Rolls `count` dice and sums the `pick` highest, or lowest when
    /// `highest` is false. Every die is recorded, kept or not.
    pub fn roll_top(&mut self, sides: Int, count: Int, pick: Int, highest: bool) -> RResult<Int> {
        let (_, mut rolls) = self.roll_sum(sides, count)?;
        let pick = usize::try_from(pick).unwrap_or(0).min(rolls.len());
        if highest {
            rolls.sort_unstable_by(|a, b| b.cmp(a));
        } else {
            rolls.sort_unstable();
        }
        Ok(rolls[..pick].iter().sum())
    }

    pub fn is_logging(&self) -> bool {
        self.log.is_some()
    }

    /// Appends to the open log, if any.
    pub fn record(&mut self, die: RolledDie) {
        if let Some(log) = &mut self.log {
            log.push(die);
        }
    }

    /// Runs `f` with logging enabled and returns what it rolled. The log is
    /// closed again before returning, whatever `f` produced; an enclosing
    /// session is restored untouched.
    pub fn logged<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> (T, RollLog) {
        let outer = self.log.replace(Vec::new());
        let output = f(self);
        let dice = std::mem::replace(&mut self.log, outer).unwrap_or_default();
        (output, RollLog::new(dice))
    }
}

impl Default for Dice {
    fn default() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl std::fmt::Debug for Dice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dice")
            .field("max_rolls", &self.max_rolls)
            .field("rolls", &self.rolls)
            .field("logging", &self.is_logging())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roll::roller::StepRoller;
    use rand::{rngs::StdRng, SeedableRng};

    fn stepped(initial: UInt, step: UInt) -> Dice {
        Dice::new(StepRoller::new(initial, step))
    }

    #[test]
    fn test_roll_in_range() {
        let mut dice = Dice::new(StdRng::seed_from_u64(1)).with_max_rolls(None);
        for _ in 0..500 {
            let x = dice.roll(6).unwrap();
            assert!((1..=6).contains(&x));
        }
    }

    #[test]
    fn test_bad_roll() {
        let mut dice = stepped(1, 1);
        assert_eq!(dice.roll(0), Err(RollError::BadRoll { sides: 0 }));
        assert_eq!(dice.roll(-4), Err(RollError::BadRoll { sides: -4 }));
        assert_eq!(dice.roll_sum(0, 3), Err(RollError::BadRoll { sides: 0 }));
    }

    #[test]
    fn test_roll_sum() {
        let mut dice = stepped(2, 1);
        assert_eq!(dice.roll_sum(6, 3), Ok((9, vec![2, 3, 4])));
    }

    #[test]
    fn test_roll_zero_dice() {
        let mut dice = stepped(2, 1);
        let (result, log) = dice.logged(|d| d.roll_sum(6, 0));
        assert_eq!(result, Ok((0, vec![])));
        assert!(log.is_empty());
        assert_eq!(dice.roll_sum(6, -3), Ok((0, vec![])));
    }

    #[test]
    fn test_roll_top() {
        let mut dice = stepped(1, 1);
        // 1, 2, 3, 4
        let (result, log) = dice.logged(|d| d.roll_top(6, 4, 3, true));
        assert_eq!(result, Ok(9));
        assert_eq!(log.len(), 4);

        let mut dice = stepped(1, 1);
        assert_eq!(dice.roll_top(6, 4, 3, false), Ok(6));
    }

    #[test]
    fn test_roll_top_clamps() {
        let mut dice = stepped(1, 1);
        assert_eq!(dice.roll_top(6, 2, 5, true), Ok(3));
        let mut dice = stepped(1, 1);
        assert_eq!(dice.roll_top(6, 2, -1, true), Ok(0));
    }

    #[test]
    fn test_roll_top_bounds() {
        let mut dice = Dice::new(StdRng::seed_from_u64(99)).with_max_rolls(None);
        for _ in 0..200 {
            let (result, log) = dice.logged(|d| d.roll_top(6, 4, 3, true));
            let result = result.unwrap();
            assert!((3..=18).contains(&result));
            assert_eq!(log.len(), 4);
        }
    }

    #[test]
    fn test_too_many_rolls() {
        let mut dice = stepped(1, 1).with_max_rolls(Some(10));
        assert!(dice.roll_sum(6, 10).is_ok());
        assert_eq!(dice.roll(6), Err(RollError::TooManyRolls));
        dice.reset();
        assert!(dice.roll(6).is_ok());
        assert_eq!(dice.roll_sum(6, 11), Err(RollError::TooManyRolls));
    }

    #[test]
    fn test_logged_session_closes() {
        let mut dice = stepped(6, 0);
        assert!(!dice.is_logging());
        dice.roll(6).unwrap();
        let (_, log) = dice.logged(|d| {
            assert!(d.is_logging());
            d.roll(6)?;
            d.roll(0)
        });
        assert!(!dice.is_logging());
        assert_eq!(log.dice(), &[RolledDie::new(6, 6)]);
    }

    #[test]
    fn test_nested_sessions() {
        let mut dice = stepped(3, 0);
        let ((), outer) = dice.logged(|d| {
            d.roll(6).unwrap();
            let (_, inner) = d.logged(|d| d.roll(4));
            assert_eq!(inner.len(), 1);
            d.roll(6).unwrap();
        });
        assert_eq!(outer.len(), 2);
    }
}
