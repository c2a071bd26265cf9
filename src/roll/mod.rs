pub mod buffer;
mod dice;
mod error;
mod log;
pub mod random_org;
pub mod roller;

pub use buffer::{EntropyError, EntropySource, RandomBuffer, RefillHandle};
pub use dice::Dice;
pub use error::RollError;
pub use log::{CritType, RollLog, RolledDie};
pub use random_org::RandomOrgSource;
pub use roller::Roller;

pub type RResult<T> = Result<T, RollError>;
