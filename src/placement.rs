//! Placement search (C4): find a random collision-free point for a new
//! entity, using the spatial grid for conflict queries. The caller is
//! responsible for inserting the entity afterward.

use std::collections::HashSet;

use glam::DVec2;
use rand::Rng;

use crate::aabb::{aabb, overlaps, Aabb};
use crate::config::EngineConfig;
use crate::grid::SpatialGrid;
use crate::handle::Handle;
use crate::store::{EntityStore, WorldObjectKind};

/// What kind of entity is being placed. Only `PlayerBlob` gets the
/// food-overlap exemption in step 4 of the algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementKind {
    PlayerBlob,
    Food,
    Virus,
}

#[derive(Clone, Debug)]
pub struct PlacementResult {
    pub position: DVec2,
    pub aabb: Aabb,
    pub cells: HashSet<u64>,
}

/// Run the placement search for a spawn of radius `r`. Returns `None`
/// after `max_attempts` failed tries.
pub fn find_spawn_point(
    grid: &SpatialGrid,
    store: &EntityStore,
    config: &EngineConfig,
    rng: &mut impl Rng,
    radius: f64,
    kind: PlacementKind,
    max_attempts: u32,
) -> Option<PlacementResult> {
    let half_extent = config.world_radius - radius;
    if half_extent <= 0.0 {
        return None;
    }
    let sep = radius + config.min_separation_distance;

    for _ in 0..max_attempts {
        let x = rng.gen_range(-half_extent..=half_extent);
        let y = rng.gen_range(-half_extent..=half_extent);
        let candidate_aabb = aabb(x, y, sep, sep);
        let cells = grid.cells_intersecting(&candidate_aabb);

        let mut conflict = false;
        for &cell in &cells {
            for handle in grid.iter_cell(cell) {
                if kind == PlacementKind::PlayerBlob && is_food(store, *handle) {
                    continue;
                }
                if let Some(existing_aabb) = store.resolve_handle_aabb(*handle) {
                    if overlaps(&candidate_aabb, &existing_aabb) {
                        conflict = true;
                        break;
                    }
                }
            }
            if conflict {
                break;
            }
        }

        if !conflict {
            return Some(PlacementResult {
                position: DVec2::new(x, y),
                aabb: aabb(x, y, radius, radius),
                cells: grid.cells_intersecting(&aabb(x, y, radius, radius)),
            });
        }
    }
    None
}

fn is_food(store: &EntityStore, handle: Handle) -> bool {
    match handle {
        Handle::WorldObject { object_id } => store
            .objects
            .get(&object_id)
            .is_some_and(|o| o.kind == WorldObjectKind::Food),
        Handle::PlayerBlob { .. } => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Blob, Player, WorldObject};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use uuid::Uuid;

    fn cfg() -> EngineConfig {
        EngineConfig {
            world_radius: 300.0,
            min_separation_distance: 5.0,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn empty_world_always_succeeds() {
        let grid = SpatialGrid::new(100.0);
        let store = EntityStore::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = find_spawn_point(
            &grid,
            &store,
            &cfg(),
            &mut rng,
            20.0,
            PlacementKind::PlayerBlob,
            20,
        );
        assert!(result.is_some());
    }

    #[test]
    fn player_blob_may_overlap_food_but_not_other_players() {
        let config = cfg();
        let mut grid = SpatialGrid::new(100.0);
        let mut store = EntityStore::new();

        // A food item covering the entire world so every sample overlaps it.
        let food_id = Uuid::from_u128(1);
        let food = WorldObject::new(food_id, WorldObjectKind::Food, DVec2::ZERO, 400.0);
        let food_cells = grid.cells_intersecting(&food.aabb);
        for &c in &food_cells {
            grid.insert(Handle::WorldObject { object_id: food_id }, c);
        }
        store.insert_object(WorldObject {
            cells: food_cells,
            ..food
        });

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let result = find_spawn_point(
            &grid,
            &store,
            &config,
            &mut rng,
            20.0,
            PlacementKind::PlayerBlob,
            20,
        );
        assert!(result.is_some(), "player spawn must ignore food overlap");

        // Food spawning itself is not exempt from overlapping other food's
        // AABB test target: a virus occupying the whole world blocks it.
        let virus_id = Uuid::from_u128(2);
        let virus = WorldObject::new(virus_id, WorldObjectKind::Virus, DVec2::ZERO, 400.0);
        let virus_cells = grid.cells_intersecting(&virus.aabb);
        for &c in &virus_cells {
            grid.insert(Handle::WorldObject { object_id: virus_id }, c);
        }
        store.insert_object(WorldObject {
            cells: virus_cells,
            ..virus
        });

        let mut rng2 = ChaCha8Rng::seed_from_u64(7);
        let blocked = find_spawn_point(
            &grid,
            &store,
            &config,
            &mut rng2,
            20.0,
            PlacementKind::PlayerBlob,
            5,
        );
        assert!(blocked.is_none(), "virus overlap must always fail placement");
    }

    #[test]
    fn exhausted_attempts_in_a_full_world_returns_none() {
        let config = cfg();
        let mut grid = SpatialGrid::new(100.0);
        let mut store = EntityStore::new();
        let id = Uuid::nil();
        let player = Player::new(id, "x".into(), Blob::new(DVec2::ZERO, 400.0));
        let blob_cells = grid.cells_intersecting(&player.blobs[0].aabb);
        for &c in &blob_cells {
            grid.insert(
                Handle::PlayerBlob {
                    player_id: id,
                    blob_index: 0,
                },
                c,
            );
        }
        let mut player = player;
        player.blobs[0].cells = blob_cells;
        store.insert_player(player);

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let result = find_spawn_point(
            &grid,
            &store,
            &config,
            &mut rng,
            20.0,
            PlacementKind::PlayerBlob,
            10,
        );
        assert!(result.is_none());
    }
}
