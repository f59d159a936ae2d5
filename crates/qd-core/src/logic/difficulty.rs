//! Difficulty pools: where puzzle target states come from.
//!
//! The actual circuit simulation lives outside this crate; the core
//! only needs something that can hand out target state vectors, which
//! is what [`TargetDifficulty`] abstracts.

use serde::{Deserialize, Serialize};

use super::robot::Robot;
use super::statevector::StateVector;
use crate::collectibles::factory::CollectibleFactory;
use crate::collectibles::Collectible;
use crate::errors::DrawError;
use crate::rng::SeededRng;

/// Source of puzzle target states.
pub trait TargetDifficulty {
    /// Produce a target state for a fight/riddle against `robot`.
    fn create_statevector(&mut self, robot: &Robot, rng: &mut SeededRng) -> StateVector;
}

/// A difficulty backed by an explicit list of state vectors, as
/// defined in the level description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplicitTargetDifficulty {
    pool: Vec<StateVector>,
    rewards: CollectibleFactory,
    ordered: bool,
    cursor: usize,
}

impl ExplicitTargetDifficulty {
    pub fn new(pool: Vec<StateVector>, rewards: CollectibleFactory, ordered: bool) -> Self {
        Self {
            pool,
            rewards,
            ordered,
            cursor: 0,
        }
    }

    pub fn pool(&self) -> &[StateVector] {
        &self.pool
    }

    /// Draw a reward from the difficulty's reward pool.
    pub fn produce_reward(&mut self, rng: &mut SeededRng) -> Result<Collectible, DrawError> {
        self.rewards.produce(rng)
    }
}

impl TargetDifficulty for ExplicitTargetDifficulty {
    fn create_statevector(&mut self, robot: &Robot, rng: &mut SeededRng) -> StateVector {
        if self.pool.is_empty() {
            // Nothing to draw from; a trivial basis state keeps the
            // level playable.
            return StateVector::basis(robot.num_qubits());
        }
        if self.ordered {
            let stv = self.pool[self.cursor].clone();
            self.cursor = (self.cursor + 1) % self.pool.len();
            stv
        } else {
            let idx = rng.index(self.pool.len());
            self.pool[idx].clone()
        }
    }
}

/// Builds the puzzle side of enemy tiles: a target state plus a
/// reward, with an optional reward-pool override from the level
/// description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyFactory {
    difficulty: ExplicitTargetDifficulty,
    reward_override: Option<CollectibleFactory>,
}

impl EnemyFactory {
    pub fn new(difficulty: ExplicitTargetDifficulty) -> Self {
        Self {
            difficulty,
            reward_override: None,
        }
    }

    pub fn set_custom_reward_factory(&mut self, factory: CollectibleFactory) {
        self.reward_override = Some(factory);
    }

    pub fn produce_target(&mut self, robot: &Robot, rng: &mut SeededRng) -> StateVector {
        self.difficulty.create_statevector(robot, rng)
    }

    pub fn produce_reward(&mut self, rng: &mut SeededRng) -> Result<Collectible, DrawError> {
        match &mut self.reward_override {
            Some(factory) => factory.produce(rng),
            None => self.difficulty.produce_reward(rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::statevector::Amplitude;

    fn stv(re: f64) -> StateVector {
        StateVector::new(vec![Amplitude::new(re, 0.0), Amplitude::ZERO])
    }

    #[test]
    fn test_ordered_pool_cycles() {
        let rewards = CollectibleFactory::new(vec![Collectible::Coin(1)]);
        let mut difficulty =
            ExplicitTargetDifficulty::new(vec![stv(1.0), stv(0.5)], rewards, true);
        let robot = Robot::new(1, vec![]);
        let mut rng = SeededRng::new(0);

        assert_eq!(difficulty.create_statevector(&robot, &mut rng), stv(1.0));
        assert_eq!(difficulty.create_statevector(&robot, &mut rng), stv(0.5));
        assert_eq!(difficulty.create_statevector(&robot, &mut rng), stv(1.0));
    }

    #[test]
    fn test_empty_pool_falls_back_to_basis() {
        let rewards = CollectibleFactory::new(vec![Collectible::Coin(1)]);
        let mut difficulty = ExplicitTargetDifficulty::new(vec![], rewards, false);
        let robot = Robot::new(2, vec![]);
        let mut rng = SeededRng::new(0);
        assert_eq!(
            difficulty.create_statevector(&robot, &mut rng),
            StateVector::basis(2)
        );
    }

    #[test]
    fn test_reward_override() {
        let rewards = CollectibleFactory::new(vec![Collectible::Coin(1)]);
        let difficulty = ExplicitTargetDifficulty::new(vec![stv(1.0)], rewards, false);
        let mut factory = EnemyFactory::new(difficulty);
        let mut rng = SeededRng::new(3);

        assert_eq!(
            factory.produce_reward(&mut rng).unwrap(),
            Collectible::Coin(1)
        );
        factory.set_custom_reward_factory(CollectibleFactory::new(vec![Collectible::Key(9)]));
        assert_eq!(
            factory.produce_reward(&mut rng).unwrap(),
            Collectible::Key(9)
        );
    }
}
