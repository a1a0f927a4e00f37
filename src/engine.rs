//! Tick scheduler (C9): drives the fixed-rate loop, computes dt,
//! sequences the pipeline, and emits tick-update messages. Reworked
//! around a wall-clock timer and an external message bus instead of a
//! local renderer.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use glam::DVec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::food::{spawn_food_for_tick, FoodBudget};
use crate::grid::SpatialGrid;
use crate::handle::Handle;
use crate::ingest::{self, SpawnRequest};
use crate::membership;
use crate::messages::{OutboundMessage, SelfBlobView, TickData};
use crate::motion;
use crate::placement::{find_spawn_point, PlacementKind};
use crate::store::{Blob, EntityStore, Player};
use crate::transport::{Inbound, OutboundBus};
use crate::visibility;

/// Upper bound on the dt handed to the motion integrator in a single tick.
const MAX_DT_SECONDS: f64 = 0.01;

/// A `join_game` that has failed placement this many consecutive ticks
/// is dropped from the retry queue. The outer client-facing join deadline
/// is the session gateway's responsibility, not the engine's.
struct PendingSpawn {
    request: SpawnRequest,
    consecutive_failures: u32,
}

/// Owns the world and drives it forward one tick at a time.
pub struct Engine {
    config: EngineConfig,
    store: EntityStore,
    grid: SpatialGrid,
    food_budget: FoodBudget,
    pending_spawns: Vec<PendingSpawn>,
    rng: ChaCha8Rng,
    tick_count: u64,
    outbound: OutboundBus,
    last_lag_warn: Option<Instant>,
}

impl Engine {
    pub fn new(config: EngineConfig, seed: u64) -> Self {
        let grid = SpatialGrid::new(config.grid_cell_size);
        Self {
            store: EntityStore::new(),
            grid,
            food_budget: FoodBudget::new(),
            pending_spawns: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            tick_count: 0,
            outbound: OutboundBus::new(),
            last_lag_warn: None,
            config,
        }
    }

    pub fn outbound_bus(&mut self) -> &mut OutboundBus {
        &mut self.outbound
    }

    /// Run the fixed-rate loop until `shutdown` resolves. Never returns
    /// early on an internal error: every `EngineError` is logged and the
    /// loop continues.
    pub async fn run(&mut self, inbound: &mut Inbound, mut shutdown: tokio::sync::oneshot::Receiver<()>) {
        let nominal = Duration::from_secs_f64(self.config.tick_dt());
        let mut prev_tick = Instant::now();

        loop {
            if shutdown.try_recv().is_ok() {
                info!("tick engine shutting down");
                return;
            }

            let tick_start = Instant::now();
            let wall_dt = tick_start.duration_since(prev_tick).as_secs_f64();
            let dt = wall_dt.min(MAX_DT_SECONDS);
            prev_tick = tick_start;

            self.tick(inbound, dt);

            let elapsed = tick_start.elapsed();
            if elapsed > nominal {
                self.warn_lag(elapsed, nominal);
                // Lost-tick policy: fire immediately, carry a clamped dt
                // into the next iteration (already enforced above).
                continue;
            }
            tokio::time::sleep(nominal - elapsed).await;
        }
    }

    fn warn_lag(&mut self, elapsed: Duration, nominal: Duration) {
        let should_warn = match self.last_lag_warn {
            None => true,
            Some(last) => last.elapsed() > Duration::from_secs(1),
        };
        if should_warn {
            warn!(?elapsed, ?nominal, "tick overran its budget");
            self.last_lag_warn = Some(Instant::now());
        }
    }

    /// Execute one fixed pipeline step: ingest -> spawn food -> spawn
    /// players -> integrate -> reindex -> visibility -> broadcast.
    pub fn tick(&mut self, inbound: &mut Inbound, dt: f64) {
        let spawns = ingest::drain(inbound, &mut self.store, &self.config);
        for spawn in spawns {
            self.pending_spawns.push(PendingSpawn {
                request: spawn,
                consecutive_failures: 0,
            });
        }

        spawn_food_for_tick(
            &mut self.food_budget,
            &mut self.grid,
            &mut self.store,
            &self.config,
            &mut self.rng,
        );

        self.spawn_pending_players();

        motion::integrate(&mut self.store, &self.config, dt);
        membership::reindex_blobs(&mut self.store, &mut self.grid);

        let visibilities = visibility::gather_all(&self.store, &self.grid);
        self.broadcast(visibilities);

        self.tick_count += 1;
    }

    fn spawn_pending_players(&mut self) {
        if self.pending_spawns.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending_spawns);
        let mut still_pending = Vec::new();

        for mut pending_spawn in pending {
            match find_spawn_point(
                &self.grid,
                &self.store,
                &self.config,
                &mut self.rng,
                self.config.initial_player_radius,
                PlacementKind::PlayerBlob,
                self.config.maximum_player_spawning_attempts,
            ) {
                Some(placement) => {
                    self.finish_player_spawn(pending_spawn.request, placement.position);
                }
                None => {
                    pending_spawn.consecutive_failures += 1;
                    let err = EngineError::PlacementExhausted {
                        kind: PlacementKind::PlayerBlob,
                        radius: self.config.initial_player_radius,
                        attempts: self.config.maximum_player_spawning_attempts,
                    };
                    error!(player_id = %pending_spawn.request.player_id, error = %err, "player spawn attempt failed");
                    if pending_spawn.consecutive_failures < self.config.maximum_player_spawning_attempts {
                        still_pending.push(pending_spawn);
                    } else {
                        error!(player_id = %pending_spawn.request.player_id, "dropping join_game after repeated placement failures");
                    }
                }
            }
        }
        self.pending_spawns = still_pending;
    }

    /// Spawn a player at an explicit world-space position, bypassing the
    /// placement search entirely. The `join_game` topic (drained via
    /// `spawn_pending_players`) is the path a live session takes; this
    /// exists for deterministic test setups that need a specific literal
    /// spawn point rather than whatever the random search lands on.
    pub fn spawn_player_at(&mut self, player_id: Uuid, username: String, position: DVec2) {
        self.finish_player_spawn(SpawnRequest { player_id, username }, position);
    }

    fn finish_player_spawn(&mut self, request: SpawnRequest, position: DVec2) {
        let mut blob = Blob::new(position, self.config.initial_player_radius);
        blob.cells = self.grid.cells_intersecting(&blob.aabb);
        let handle = Handle::PlayerBlob {
            player_id: request.player_id,
            blob_index: 0,
        };
        for &cell in &blob.cells {
            self.grid.insert(handle, cell);
        }

        let mut player = Player::new(request.player_id, request.username, blob);
        player.refresh_derived_state(self.config.client_width_pixels, self.config.client_height_pixels);
        self.store.insert_player(player);

        self.food_budget.on_player_joined(self.config.join_food_bonus);

        let vis = visibility::gather(&self.store, &self.grid, request.player_id);
        let data = self.build_tick_data(request.player_id, &vis);
        self.outbound
            .publish(request.player_id, OutboundMessage::JoinGame(data));
    }

    fn build_tick_data(&self, player_id: Uuid, vis: &visibility::Visibility) -> TickData {
        let player = &self.store.players[&player_id];
        TickData {
            com_x: player.com.x,
            com_y: player.com.y,
            self_blobs: player
                .blobs
                .iter()
                .map(|b| SelfBlobView {
                    x: b.position.x,
                    y: b.position.y,
                    r: b.radius,
                })
                .collect(),
            zoom_factor: player.zoom_factor,
            other_blobs: vis.other_blobs.clone(),
            world_objects: vis.world_objects.clone(),
            world_radius: self.config.world_radius,
        }
    }

    fn broadcast(&mut self, visibilities: HashMap<Uuid, visibility::Visibility>) {
        for (player_id, vis) in &visibilities {
            let data = self.build_tick_data(*player_id, vis);
            self.outbound
                .publish(*player_id, OutboundMessage::TickUpdate(data));
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn remove_player(&mut self, player_id: Uuid) {
        self.store.remove_player(&mut self.grid, player_id);
        self.outbound.unregister(&player_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::inbound_channel;

    fn cfg() -> EngineConfig {
        EngineConfig {
            world_radius: 300.0,
            tps: 60,
            ..EngineConfig::default()
        }
    }

    #[tokio::test]
    async fn joining_player_spawns_and_broadcasts_join_game() {
        let mut engine = Engine::new(cfg(), 1);
        let (handles, mut inbound) = inbound_channel();
        let player_id = Uuid::new_v4();
        engine.outbound_bus().register(player_id);
        let mut rx = engine.outbound_bus().register(player_id);

        handles
            .join_tx
            .send(crate::messages::JoinGameMsg {
                uuid: player_id,
                username: "a".into(),
            })
            .await
            .unwrap();

        engine.tick(&mut inbound, 1.0 / 60.0);

        assert!(engine.store().players.contains_key(&player_id));
        rx.mark_changed();
        let msg = rx.borrow_and_update().clone();
        assert!(matches!(msg, Some(OutboundMessage::JoinGame(_))));
    }

    #[tokio::test]
    async fn idle_lone_player_keeps_position_over_many_ticks() {
        let config = cfg();
        let mut engine = Engine::new(config, 42);
        let (handles, mut inbound) = inbound_channel();
        let player_id = Uuid::new_v4();

        handles
            .join_tx
            .send(crate::messages::JoinGameMsg {
                uuid: player_id,
                username: "a".into(),
            })
            .await
            .unwrap();
        engine.tick(&mut inbound, 1.0 / 60.0);

        let spawned_pos = engine.store().players[&player_id].blobs[0].position;

        for _ in 0..60 {
            engine.tick(&mut inbound, 1.0 / 60.0);
        }

        let pos = engine.store().players[&player_id].blobs[0].position;
        assert_eq!(pos, spawned_pos);
    }
}
