//! The player actor assembled from the level description's robot
//! production.

use serde::{Deserialize, Serialize};

use crate::collectibles::{Collectible, GateType};

/// The controllable robot: circuit capacity plus carried resources.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Robot {
    num_qubits: u8,
    gates: Vec<GateType>,
    keys: u32,
    coins: u32,
    energy: u32,
}

impl Robot {
    pub fn new(num_qubits: u8, gates: Vec<GateType>) -> Self {
        Self {
            num_qubits,
            gates,
            keys: 0,
            coins: 0,
            energy: 0,
        }
    }

    pub fn num_qubits(&self) -> u8 {
        self.num_qubits
    }

    pub fn gates(&self) -> &[GateType] {
        &self.gates
    }

    pub fn keys(&self) -> u32 {
        self.keys
    }

    pub fn coins(&self) -> u32 {
        self.coins
    }

    pub fn energy(&self) -> u32 {
        self.energy
    }

    /// Apply a picked-up collectible.
    pub fn give(&mut self, collectible: Collectible) {
        match collectible {
            Collectible::Coin(amount) => self.coins += amount,
            Collectible::Key(count) => self.keys += count,
            Collectible::Heart(hp) => self.energy += hp,
            Collectible::Energy(amount) => self.energy += amount,
            Collectible::Qubit(count) => self.num_qubits += count,
            Collectible::Gate(gate) => self.gates.push(gate),
            Collectible::Multi(parts) => {
                for part in parts {
                    self.give(part);
                }
            }
        }
    }

    /// Consume one key if available.
    pub fn use_key(&mut self) -> bool {
        if self.keys == 0 {
            return false;
        }
        self.keys -= 1;
        true
    }

    /// Pay `price` coins if the purse allows it.
    pub fn spend(&mut self, price: u32) -> bool {
        if self.coins < price {
            return false;
        }
        self.coins -= price;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_give_and_use() {
        let mut robot = Robot::new(2, vec![GateType::H]);
        robot.give(Collectible::Key(2));
        robot.give(Collectible::Multi(vec![
            Collectible::Coin(10),
            Collectible::Gate(GateType::X),
        ]));

        assert_eq!(robot.keys(), 2);
        assert_eq!(robot.coins(), 10);
        assert_eq!(robot.gates(), &[GateType::H, GateType::X]);

        assert!(robot.use_key());
        assert!(robot.use_key());
        assert!(!robot.use_key());

        assert!(robot.spend(7));
        assert!(!robot.spend(7));
    }

    #[test]
    fn test_qubit_pickup_grows_circuit() {
        let mut robot = Robot::new(2, vec![]);
        robot.give(Collectible::Qubit(1));
        assert_eq!(robot.num_qubits(), 3);
    }
}
