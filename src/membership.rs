//! Cell-membership updater (C7): reconciles each blob's old cell set
//! with its new cell set in the spatial grid after motion integration.

use crate::grid::SpatialGrid;
use crate::handle::Handle;
use crate::store::EntityStore;

/// Reindex every blob of every player. Food/virus cell sets are set at
/// placement and cleared at removal; they never move, so they are not
/// touched here.
pub fn reindex_blobs(store: &mut EntityStore, grid: &mut SpatialGrid) {
    for (&player_id, player) in store.players.iter_mut() {
        for (blob_index, blob) in player.blobs.iter_mut().enumerate() {
            let new_cells = grid.cells_intersecting(&blob.aabb);
            if new_cells == blob.cells {
                continue;
            }
            let handle = Handle::PlayerBlob {
                player_id,
                blob_index,
            };
            for &cell in blob.cells.difference(&new_cells) {
                grid.remove(handle, cell);
            }
            for &cell in new_cells.difference(&blob.cells) {
                grid.insert(handle, cell);
            }
            blob.cells = new_cells;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aabb::aabb;
    use crate::store::{Blob, Player};
    use glam::DVec2;
    use uuid::Uuid;

    #[test]
    fn membership_matches_geometry_after_reindex() {
        let mut grid = SpatialGrid::new(50.0);
        let mut store = EntityStore::new();
        let id = Uuid::nil();
        let mut blob = Blob::new(DVec2::new(10.0, 10.0), 20.0);
        blob.aabb = aabb(10.0, 10.0, 20.0, 20.0);
        store.insert_player(Player::new(id, "a".into(), blob));

        reindex_blobs(&mut store, &mut grid);

        let blob = &store.players[&id].blobs[0];
        assert_eq!(blob.cells, grid.cells_intersecting(&blob.aabb));
        for &cell in &blob.cells {
            assert!(grid.iter_cell(cell).any(|h| *h
                == Handle::PlayerBlob {
                    player_id: id,
                    blob_index: 0
                }));
        }
    }

    #[test]
    fn unchanged_aabb_leaves_grid_untouched() {
        let mut grid = SpatialGrid::new(50.0);
        let mut store = EntityStore::new();
        let id = Uuid::nil();
        let mut blob = Blob::new(DVec2::new(10.0, 10.0), 20.0);
        blob.aabb = aabb(10.0, 10.0, 20.0, 20.0);
        store.insert_player(Player::new(id, "a".into(), blob));
        reindex_blobs(&mut store, &mut grid);
        let before = grid.cell_count();

        reindex_blobs(&mut store, &mut grid);
        assert_eq!(grid.cell_count(), before);
    }
}
