//! Collectible prototypes and priced shop offers.
//!
//! A pool is an ordered sequence of collectible prototypes (duplicates
//! allowed; order matters for the ordered draw policy). Factories in
//! [`factory`] turn pools into concrete instances.

pub mod factory;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Quantum gate kinds that can be picked up and slotted into the
/// robot's circuit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum GateType {
    /// Identity gate, also the fallback for unknown gate references.
    #[default]
    I,
    X,
    Y,
    Z,
    H,
    Cx,
    Swap,
}

/// A concrete collectible instance as placed on a tile or sold in a
/// shop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Collectible {
    Coin(u32),
    Key(u32),
    Heart(u32),
    Energy(u32),
    Qubit(u8),
    Gate(GateType),
    /// Several collectibles granted at once (multi-draw reward tiles).
    Multi(Vec<Collectible>),
}

impl Collectible {
    /// Undiscounted shop price of this collectible.
    pub fn default_price(&self) -> i32 {
        match self {
            Collectible::Coin(amount) => *amount as i32,
            Collectible::Key(count) => 10 * *count as i32,
            Collectible::Heart(hp) => 3 * *hp as i32,
            Collectible::Energy(amount) => (*amount as i32 / 10).max(1),
            Collectible::Qubit(count) => 25 * *count as i32,
            Collectible::Gate(_) => 20,
            Collectible::Multi(parts) => parts.iter().map(Collectible::default_price).sum(),
        }
    }
}

impl std::fmt::Display for Collectible {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Collectible::Coin(amount) => write!(f, "{amount} coin(s)"),
            Collectible::Key(count) => write!(f, "{count} key(s)"),
            Collectible::Heart(hp) => write!(f, "heart (+{hp})"),
            Collectible::Energy(amount) => write!(f, "energy (+{amount})"),
            Collectible::Qubit(count) => write!(f, "{count} qubit(s)"),
            Collectible::Gate(gate) => write!(f, "{gate} gate"),
            Collectible::Multi(parts) => write!(f, "bundle of {}", parts.len()),
        }
    }
}

/// A collectible offered for sale at a concrete price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopItem {
    pub collectible: Collectible,
    pub price: i32,
}

impl ShopItem {
    /// Smallest price step; also the minimum price jitter amplitude.
    pub const BASE_UNIT: i32 = 1;

    pub fn new(collectible: Collectible, price: i32) -> Self {
        Self { collectible, price }
    }

    /// Offer at the collectible's default price.
    pub fn at_default_price(collectible: Collectible) -> Self {
        let price = collectible.default_price();
        Self { collectible, price }
    }
}
