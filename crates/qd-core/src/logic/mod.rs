//! Game-logic leaf types: the player robot, puzzle target states,
//! difficulty pools, messages and riddles.

pub mod difficulty;
pub mod message;
pub mod riddle;
pub mod robot;
pub mod statevector;

pub use difficulty::{EnemyFactory, ExplicitTargetDifficulty, TargetDifficulty};
pub use message::Message;
pub use riddle::Riddle;
pub use robot::Robot;
pub use statevector::{Amplitude, StateVector};
