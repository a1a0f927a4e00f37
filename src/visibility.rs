//! Visibility extractor (C8): for each player, gathers blobs and world
//! objects whose AABB overlaps the player's vision AABB. Read-only on
//! the grid and entity store.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::aabb::overlaps;
use crate::handle::Handle;
use crate::grid::SpatialGrid;
use crate::messages::{OtherBlobView, WorldObjectType, WorldObjectView};
use crate::store::{EntityStore, WorldObjectKind};

#[derive(Clone, Debug, Default)]
pub struct Visibility {
    pub other_blobs: Vec<(String, OtherBlobView)>,
    pub world_objects: Vec<(String, WorldObjectView)>,
    /// Every non-self player UUID touched during the sweep, *before* the
    /// AABB overlap filter, so the client can evict stale caches.
    pub player_metadata: HashSet<Uuid>,
}

/// Gather one player's visible neighborhood.
pub fn gather(store: &EntityStore, grid: &SpatialGrid, viewer_id: Uuid) -> Visibility {
    let mut out = Visibility::default();
    let Some(viewer) = store.players.get(&viewer_id) else {
        return out;
    };

    let mut seen_blobs: HashSet<Handle> = HashSet::new();
    let mut seen_objects: HashSet<Uuid> = HashSet::new();

    for cell in grid.cells_intersecting(&viewer.vision_aabb) {
        for &handle in grid.iter_cell(cell) {
            match handle {
                Handle::PlayerBlob {
                    player_id,
                    blob_index,
                } => {
                    if player_id == viewer_id {
                        continue;
                    }
                    out.player_metadata.insert(player_id);
                    if !seen_blobs.insert(handle) {
                        continue;
                    }
                    let Some(other) = store.players.get(&player_id) else {
                        continue;
                    };
                    let Some(blob) = other.blobs.get(blob_index) else {
                        continue;
                    };
                    if overlaps(&blob.aabb, &viewer.vision_aabb) {
                        out.other_blobs.push((
                            handle.to_wire_string(),
                            OtherBlobView {
                                x: blob.position.x,
                                y: blob.position.y,
                                r: blob.radius,
                                vx: blob.velocity.x,
                                vy: blob.velocity.y,
                            },
                        ));
                    }
                }
                Handle::WorldObject { object_id } => {
                    if !seen_objects.insert(object_id) {
                        continue;
                    }
                    let Some(object) = store.objects.get(&object_id) else {
                        continue;
                    };
                    if overlaps(&object.aabb, &viewer.vision_aabb) {
                        let kind = match object.kind {
                            WorldObjectKind::Food => WorldObjectType::Food,
                            WorldObjectKind::Virus => WorldObjectType::Virus,
                        };
                        out.world_objects.push((
                            handle.to_wire_string(),
                            WorldObjectView {
                                kind,
                                x: object.position.x,
                                y: object.position.y,
                                r: object.radius,
                            },
                        ));
                    }
                }
            }
        }
    }
    out
}

/// Gather visibility for every player in the store.
pub fn gather_all(store: &EntityStore, grid: &SpatialGrid) -> HashMap<Uuid, Visibility> {
    store
        .players
        .keys()
        .map(|&id| (id, gather(store, grid, id)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Blob, Player};
    use glam::DVec2;

    fn store_with_two_players(p2_pos: DVec2) -> (EntityStore, Uuid, Uuid) {
        let mut store = EntityStore::new();
        let p1 = Uuid::from_u128(1);
        let p2 = Uuid::from_u128(2);
        let mut player1 = Player::new(p1, "p1".into(), Blob::new(DVec2::ZERO, 20.0));
        player1.refresh_derived_state(1920.0, 1080.0);
        let mut player2 = Player::new(p2, "p2".into(), Blob::new(p2_pos, 20.0));
        player2.refresh_derived_state(1920.0, 1080.0);
        store.insert_player(player1);
        store.insert_player(player2);
        (store, p1, p2)
    }

    fn grid_indexing(store: &EntityStore) -> SpatialGrid {
        let mut grid = SpatialGrid::new(100.0);
        for (&id, player) in &store.players {
            for (idx, blob) in player.blobs.iter().enumerate() {
                let handle = Handle::PlayerBlob {
                    player_id: id,
                    blob_index: idx,
                };
                for cell in grid.cells_intersecting(&blob.aabb) {
                    grid.insert(handle, cell);
                }
            }
        }
        grid
    }

    #[test]
    fn distant_player_is_not_visible() {
        let (store, p1, _p2) = store_with_two_players(DVec2::new(1000.0, 0.0));
        let grid = grid_indexing(&store);
        let vis = gather(&store, &grid, p1);
        assert!(vis.other_blobs.is_empty());
    }

    #[test]
    fn nearby_player_becomes_visible() {
        let (store, p1, _p2) = store_with_two_players(DVec2::new(50.0, 0.0));
        let grid = grid_indexing(&store);
        let vis = gather(&store, &grid, p1);
        assert_eq!(vis.other_blobs.len(), 1);
        assert!((vis.other_blobs[0].1.x - 50.0).abs() < 1e-9);
    }

    #[test]
    fn self_blobs_are_excluded() {
        let (store, p1, _p2) = store_with_two_players(DVec2::new(50.0, 0.0));
        let grid = grid_indexing(&store);
        let vis = gather(&store, &grid, p1);
        let self_handle = Handle::PlayerBlob {
            player_id: p1,
            blob_index: 0,
        };
        assert!(!vis
            .other_blobs
            .iter()
            .any(|(h, _)| *h == self_handle.to_wire_string()));
    }
}
