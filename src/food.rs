//! Food budget and the per-tick food spawn pass that drives the
//! placement search for new food items. Reworked around an unbounded
//! `food_amount` accumulator instead of a fixed-rate fractional one.

use rand::Rng;
use tracing::error;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::grid::SpatialGrid;
use crate::placement::{find_spawn_point, PlacementKind};
use crate::store::{EntityStore, WorldObject, WorldObjectKind};

/// Tracks accumulated "potential food mass". Never decreases below zero
/// by any means other than spawn attempts debiting it.
#[derive(Clone, Copy, Debug, Default)]
pub struct FoodBudget {
    pub food_amount: f64,
}

impl FoodBudget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_player_joined(&mut self, bonus: f64) {
        self.food_amount += bonus;
    }

    /// `food_amount -= food_amount - ln(food_amount + 1)`: a logarithmic
    /// decay so a large surplus shrinks faster than a small one. Tunable
    /// policy, not physics.
    fn decay(&mut self) {
        if self.food_amount <= 0.0 {
            return;
        }
        self.food_amount -= self.food_amount - (self.food_amount + 1.0).ln();
        self.food_amount = self.food_amount.max(0.0);
    }
}

/// Advance the food budget and spawn as much food as it affords, up to
/// `MAXIMUM_FOOD_SPAWNING_ATTEMPTS` attempts for the whole tick.
/// Failures are logged at error and do not stop subsequent attempts.
pub fn spawn_food_for_tick(
    budget: &mut FoodBudget,
    grid: &mut SpatialGrid,
    store: &mut EntityStore,
    config: &EngineConfig,
    rng: &mut impl Rng,
) {
    budget.decay();

    let affordable = (budget.food_amount / config.food_spawn_cost).floor() as u32;
    let attempts = affordable.min(config.maximum_food_spawning_attempts);

    for _ in 0..attempts {
        if budget.food_amount < config.food_spawn_cost {
            break;
        }
        let radius = rng.gen_range(config.min_food_radius..=config.max_food_radius);
        match find_spawn_point(
            grid,
            store,
            config,
            rng,
            radius,
            PlacementKind::Food,
            config.maximum_food_spawning_attempts,
        ) {
            Some(placement) => {
                let id = Uuid::new_v4();
                let mut object =
                    WorldObject::new(id, WorldObjectKind::Food, placement.position, radius);
                object.aabb = placement.aabb;
                object.cells = placement.cells.clone();
                let handle = crate::handle::Handle::WorldObject { object_id: id };
                for &cell in &placement.cells {
                    grid.insert(handle, cell);
                }
                store.insert_object(object);
                budget.food_amount -= config.food_spawn_cost;
            }
            None => {
                error!(
                    kind = ?PlacementKind::Food,
                    radius,
                    attempts = config.maximum_food_spawning_attempts,
                    "placement search exhausted for food, budget untouched"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn joining_a_player_credits_the_budget() {
        let mut budget = FoodBudget::new();
        budget.on_player_joined(100.0);
        assert_eq!(budget.food_amount, 100.0);
    }

    #[test]
    fn budget_never_goes_negative_from_decay() {
        let mut budget = FoodBudget { food_amount: 0.0 };
        budget.decay();
        assert!(budget.food_amount >= 0.0);
    }

    #[test]
    fn spawning_food_debits_the_budget_and_populates_the_store() {
        let config = EngineConfig {
            world_radius: 300.0,
            ..EngineConfig::default()
        };
        let mut grid = SpatialGrid::new(100.0);
        let mut store = EntityStore::new();
        let mut budget = FoodBudget {
            food_amount: 5.0 * config.food_spawn_cost,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        spawn_food_for_tick(&mut budget, &mut grid, &mut store, &config, &mut rng);

        assert!(!store.objects.is_empty());
        assert!(budget.food_amount < 5.0 * config.food_spawn_cost);
        for object in store.objects.values() {
            assert!(!object.cells.is_empty());
            for &cell in &object.cells {
                assert!(grid.iter_cell(cell).any(|h| matches!(
                    h,
                    crate::handle::Handle::WorldObject { object_id } if *object_id == object.id
                )));
            }
        }
    }
}
