//! Entity store (C3): owns [`Player`]s (with their [`Blob`]s) and
//! [`WorldObject`]s, and provides the stable handles the grid stores.
//!
//! Players and blobs are keyed directly by UUID rather than by a
//! generation-counted arena index: the UUID is already the stable
//! identity handed in at spawn time, so a second indirection would add
//! nothing. A removal still scrubs every cell the entity occupied.

use std::collections::{HashMap, HashSet};

use glam::DVec2;
use uuid::Uuid;

use crate::aabb::{aabb, Aabb};
use crate::grid::SpatialGrid;
use crate::handle::Handle;

/// A single circular entity controlled by a player.
#[derive(Clone, Debug)]
pub struct Blob {
    pub position: DVec2,
    pub radius: f64,
    pub velocity: DVec2,
    pub aabb: Aabb,
    pub cells: HashSet<u64>,
}

impl Blob {
    pub fn new(position: DVec2, radius: f64) -> Self {
        Self {
            position,
            radius,
            velocity: DVec2::ZERO,
            aabb: aabb(position.x, position.y, radius, radius),
            cells: HashSet::new(),
        }
    }
}

/// A connected player: one or more blobs plus the derived view state
/// used to build its per-tick broadcast.
#[derive(Clone, Debug)]
pub struct Player {
    pub id: Uuid,
    pub username: String,
    pub blobs: Vec<Blob>,
    /// Fixed absolute world-space point the blobs pull toward, captured
    /// once from `com + client offset` at the moment `update_position`
    /// is applied. Re-deriving this from the live COM every tick would
    /// make a single-blob player's target drift with its own motion and
    /// never converge; see the motion integrator.
    pub target: DVec2,
    pub com: DVec2,
    pub zoom_factor: f64,
    pub vision_aabb: Aabb,
}

impl Player {
    pub fn new(id: Uuid, username: String, first_blob: Blob) -> Self {
        let com = first_blob.position;
        Self {
            id,
            username,
            blobs: vec![first_blob],
            target: com,
            com,
            zoom_factor: 0.0,
            vision_aabb: aabb(com.x, com.y, 0.0, 0.0),
        }
    }

    /// Recompute `com`, `zoom_factor` and `vision_aabb` from the current
    /// blobs. `com = Σ(r²·pos) / Σ(r²)`; `zoom_factor = ln(Σr)/100 + 0.03`.
    pub fn refresh_derived_state(&mut self, client_width: f64, client_height: f64) {
        let total_r: f64 = self.blobs.iter().map(|b| b.radius).sum();
        let total_mass: f64 = self.blobs.iter().map(|b| b.radius * b.radius).sum();
        debug_assert!(total_mass > 0.0, "a player always has >=1 blob with r>0");

        let weighted: DVec2 = self
            .blobs
            .iter()
            .map(|b| b.position * (b.radius * b.radius))
            .fold(DVec2::ZERO, |acc, v| acc + v);
        self.com = weighted / total_mass;
        self.zoom_factor = total_r.ln() / 100.0 + 0.03;
        self.vision_aabb = aabb(
            self.com.x,
            self.com.y,
            (client_width / 2.0) * self.zoom_factor,
            (client_height / 2.0) * self.zoom_factor,
        );
    }
}

/// Tagged kind for a [`WorldObject`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorldObjectKind {
    Food,
    /// Recognized as a world object kind but not yet spawned or driven
    /// by any gameplay loop.
    Virus,
}

#[derive(Clone, Debug)]
pub struct WorldObject {
    pub id: Uuid,
    pub kind: WorldObjectKind,
    pub position: DVec2,
    pub radius: f64,
    pub aabb: Aabb,
    pub cells: HashSet<u64>,
}

impl WorldObject {
    pub fn new(id: Uuid, kind: WorldObjectKind, position: DVec2, radius: f64) -> Self {
        Self {
            id,
            kind,
            position,
            radius,
            aabb: aabb(position.x, position.y, radius, radius),
            cells: HashSet::new(),
        }
    }
}

/// Owns every [`Player`] and [`WorldObject`] in the world, keyed by UUID.
#[derive(Default)]
pub struct EntityStore {
    pub players: HashMap<Uuid, Player>,
    pub objects: HashMap<Uuid, WorldObject>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_player(&mut self, player: Player) {
        self.players.insert(player.id, player);
    }

    pub fn insert_object(&mut self, object: WorldObject) {
        self.objects.insert(object.id, object);
    }

    /// Remove a player and scrub every cell its blobs occupied.
    pub fn remove_player(&mut self, grid: &mut SpatialGrid, id: Uuid) -> Option<Player> {
        let player = self.players.remove(&id)?;
        for (idx, blob) in player.blobs.iter().enumerate() {
            let handle = Handle::PlayerBlob {
                player_id: id,
                blob_index: idx,
            };
            for &cell in &blob.cells {
                grid.remove(handle, cell);
            }
        }
        Some(player)
    }

    /// Remove a world object and scrub every cell it occupied.
    pub fn remove_object(&mut self, grid: &mut SpatialGrid, id: Uuid) -> Option<WorldObject> {
        let object = self.objects.remove(&id)?;
        let handle = Handle::WorldObject { object_id: id };
        for &cell in &object.cells {
            grid.remove(handle, cell);
        }
        Some(object)
    }

    pub fn resolve_handle_aabb(&self, handle: Handle) -> Option<Aabb> {
        match handle {
            Handle::PlayerBlob {
                player_id,
                blob_index,
            } => self
                .players
                .get(&player_id)
                .and_then(|p| p.blobs.get(blob_index))
                .map(|b| b.aabb),
            Handle::WorldObject { object_id } => self.objects.get(&object_id).map(|o| o.aabb),
        }
    }
}
