//! Factories drawing concrete collectibles from configured pools.
//!
//! Factories never mutate their configured pool: draws that need
//! no-replacement semantics operate on a private copy. All randomness
//! comes from a caller-supplied [`SeededRng`].

use serde::{Deserialize, Serialize};

use super::{Collectible, ShopItem};
use crate::errors::DrawError;
use crate::rng::SeededRng;

/// How a factory walks its pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DrawStrategy {
    /// Uniform draws.
    #[default]
    Random,
    /// Strict pool order, wrapping around; never removes.
    Ordered,
}

/// Draws collectibles from a single pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectibleFactory {
    pool: Vec<Collectible>,
    strategy: DrawStrategy,
    cursor: usize,
}

impl CollectibleFactory {
    pub fn new(pool: Vec<Collectible>) -> Self {
        Self {
            pool,
            strategy: DrawStrategy::Random,
            cursor: 0,
        }
    }

    /// Factory that cycles through `pool` in fixed order.
    pub fn ordered(pool: Vec<Collectible>) -> Self {
        Self {
            pool,
            strategy: DrawStrategy::Ordered,
            cursor: 0,
        }
    }

    pub fn with_strategy(pool: Vec<Collectible>, strategy: DrawStrategy) -> Self {
        Self {
            pool,
            strategy,
            cursor: 0,
        }
    }

    pub fn pool(&self) -> &[Collectible] {
        &self.pool
    }

    /// One draw; the configured pool is left untouched.
    pub fn produce(&mut self, rng: &mut SeededRng) -> Result<Collectible, DrawError> {
        match self.strategy {
            DrawStrategy::Random => Ok(rng.element(&self.pool)?.clone()),
            DrawStrategy::Ordered => {
                if self.pool.is_empty() {
                    return Err(DrawError::EmptyPool);
                }
                let item = self.pool[self.cursor].clone();
                self.cursor = (self.cursor + 1) % self.pool.len();
                Ok(item)
            }
        }
    }

    /// Draw `n` collectibles.
    ///
    /// With `unique` set, all draws come from a private copy without
    /// replacement and the call fails with
    /// [`DrawError::InsufficientPool`] when `n` exceeds the pool size.
    /// Ordered factories continue their cycle instead and treat
    /// `unique` as a size check only.
    pub fn produce_multiple(
        &mut self,
        rng: &mut SeededRng,
        n: usize,
        unique: bool,
    ) -> Result<Vec<Collectible>, DrawError> {
        if self.pool.is_empty() {
            return Err(DrawError::EmptyPool);
        }
        if unique && n > self.pool.len() {
            return Err(DrawError::InsufficientPool {
                requested: n,
                available: self.pool.len(),
            });
        }
        match self.strategy {
            DrawStrategy::Random if unique => {
                let mut copy = self.pool.clone();
                (0..n).map(|_| rng.remove_element(&mut copy)).collect()
            }
            DrawStrategy::Random => (0..n).map(|_| self.produce(rng)).collect(),
            DrawStrategy::Ordered => (0..n).map(|_| self.produce(rng)).collect(),
        }
    }
}

/// Composes priced shop offers from a common and a special pool.
///
/// The special pool is quality-weighted: a shop starting at quality
/// level 1 is guaranteed one special offer; higher starting levels make
/// specials progressively less likely for the early slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopFactory {
    common_pool: Vec<Collectible>,
    special_pool: Vec<Collectible>,
    quality_level: i32,
    min_items: i64,
    max_items: i64,
    discount: bool,
}

impl ShopFactory {
    pub fn new(
        common_pool: Vec<Collectible>,
        special_pool: Vec<Collectible>,
        quality_level: i32,
        min_items: i64,
        max_items: i64,
        discount: bool,
    ) -> Self {
        Self {
            common_pool,
            special_pool,
            quality_level,
            min_items,
            max_items,
            discount,
        }
    }

    /// Enable or disable the 50% discount mode.
    pub fn set_discount(&mut self, discount: bool) {
        self.discount = discount;
    }

    /// Produce a priced inventory.
    ///
    /// If `num_of_items` is zero or negative the count is drawn
    /// uniformly from the configured `[min_items, max_items)` range.
    /// The configured pools are never mutated, so one factory can
    /// stock any number of shops.
    pub fn produce(
        &self,
        rng: &mut SeededRng,
        num_of_items: i64,
    ) -> Result<Vec<ShopItem>, DrawError> {
        if self.common_pool.is_empty() {
            return Err(DrawError::EmptyPool);
        }

        let target = if num_of_items <= 0 {
            rng.int(self.min_items, self.max_items).max(self.min_items)
        } else {
            num_of_items
        } as usize;

        let mut specials = self.special_pool.clone();
        let mut items = Vec::with_capacity(target);
        let mut quality_level = self.quality_level;

        // Exactly `target` offers are placed; the quality counter
        // decrements per slot no matter which pool served it.
        while items.len() < target {
            let gets_special =
                quality_level > 0 && rng.real() < 1.0 / f64::from(quality_level);

            let item = if gets_special && !specials.is_empty() {
                rng.remove_element(&mut specials)?
            } else {
                rng.element(&self.common_pool)?.clone()
            };

            let price = self.price_for(&item, rng);
            items.push(ShopItem::new(item, price));
            quality_level -= 1;
        }
        Ok(items)
    }

    fn price_for(&self, item: &Collectible, rng: &mut SeededRng) -> i32 {
        let default = item.default_price();
        if self.discount {
            (f64::from(default) / 2.0).round() as i32
        } else {
            let sigma = f64::from(ShopItem::BASE_UNIT).max(f64::from(default) * 0.1);
            default + rng.real_range(-sigma, sigma).round() as i32
        }
    }
}
