//! Input ingestor (C5): buffers `join_game` and `update_position`
//! messages between ticks and applies position updates immediately.

use tracing::{trace, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::messages::{JoinGameMsg, UpdatePositionMsg};
use crate::store::EntityStore;
use crate::transport::Inbound;

const MAX_USERNAME_LEN: usize = 100;

/// A drained `join_game` waiting for a collision-free spawn slot.
#[derive(Clone, Debug)]
pub struct SpawnRequest {
    pub player_id: Uuid,
    pub username: String,
}

/// Drain both inbound queues for one tick. `update_position` is applied
/// directly to matching players; unknown UUIDs are discarded silently.
/// Returns the join requests to hand to the placement search.
pub fn drain(inbound: &mut Inbound, store: &mut EntityStore, config: &EngineConfig) -> Vec<SpawnRequest> {
    let mut spawns = Vec::new();

    while let Ok(msg) = inbound.join_rx.try_recv() {
        if let Err(e) = validate_join(&msg) {
            warn!(error = %e, "dropping malformed join_game message");
            continue;
        }
        spawns.push(SpawnRequest {
            player_id: msg.uuid,
            username: msg.username,
        });
    }

    while let Ok(msg) = inbound.update_rx.try_recv() {
        apply_update_position(store, config, msg);
    }

    spawns
}

fn validate_join(msg: &JoinGameMsg) -> Result<(), EngineError> {
    if msg.username.len() > MAX_USERNAME_LEN {
        return Err(EngineError::MalformedInput {
            topic: "player:join_game",
            reason: format!("username exceeds {MAX_USERNAME_LEN} bytes"),
        });
    }
    Ok(())
}

/// `client_x_world = (x - W/2) * zoom`, `client_y_world = (y - H/2) * zoom`,
/// then folded into a fixed absolute world-space target `(com_x +
/// client_x_world, com_y - client_y_world)` using the player's COM *as of
/// this input*. The Y flip relative to world axis happens here, at the
/// moment the target is fixed, rather than being re-applied against a
/// live COM every tick — the motion integrator just pulls toward the
/// stored point.
fn apply_update_position(store: &mut EntityStore, config: &EngineConfig, msg: UpdatePositionMsg) {
    let Some(player) = store.players.get_mut(&msg.uuid) else {
        trace!(uuid = %msg.uuid, "update_position for unknown uuid, discarding");
        return;
    };
    let zoom = player.zoom_factor;
    let client_x_world = (msg.x - config.client_width_pixels / 2.0) * zoom;
    let client_y_world = (msg.y - config.client_height_pixels / 2.0) * zoom;
    player.target = glam::DVec2::new(
        player.com.x + client_x_world,
        player.com.y - client_y_world,
    );
}
