//! Riddles: reach a target state within a bounded number of attempts.

use serde::{Deserialize, Serialize};

use super::statevector::StateVector;
use crate::collectibles::Collectible;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Riddle {
    target: StateVector,
    reward: Collectible,
    attempts: u32,
    solved: bool,
}

impl Riddle {
    pub const DEFAULT_ATTEMPTS: u32 = 7;

    pub fn new(target: StateVector, reward: Collectible, attempts: u32) -> Self {
        Self {
            target,
            reward,
            attempts,
            solved: false,
        }
    }

    pub fn target(&self) -> &StateVector {
        &self.target
    }

    pub fn reward(&self) -> &Collectible {
        &self.reward
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub fn is_active(&self) -> bool {
        !self.solved && self.attempts > 0
    }

    /// Check a candidate state; consumes one attempt on failure.
    pub fn attempt(&mut self, candidate: &StateVector) -> bool {
        if !self.is_active() {
            return false;
        }
        if self.target.matches(candidate, StateVector::TOLERANCE) {
            self.solved = true;
            return true;
        }
        self.attempts -= 1;
        false
    }
}
