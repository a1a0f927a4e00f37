//! Motion integrator (C6): advances blob positions toward each player's
//! target, clamps to world bounds, and refreshes AABBs and
//! center-of-mass. Uses a pull-target-with-rescale step instead of
//! velocity/friction.

use glam::DVec2;

use crate::aabb::swept_aabb_vec;
use crate::config::EngineConfig;
use crate::store::EntityStore;

/// Integrate one tick of motion for every player's blobs, then refresh
/// each player's derived center-of-mass/zoom/vision state.
///
/// `dt` is the elapsed wall time since the previous tick, already
/// clamped to <=10ms by the caller (the tick scheduler).
pub fn integrate(store: &mut EntityStore, config: &EngineConfig, dt: f64) {
    for player in store.players.values_mut() {
        let target = player.target;

        for blob in &mut player.blobs {
            let d = target - blob.position;
            let m2 = d.length_squared();

            if m2 > 0.0 {
                let r2 = blob.radius * blob.radius;
                let step = if m2 > r2 {
                    let scale = blob.radius / m2.sqrt();
                    d * scale
                } else {
                    d
                };

                let disp = step * dt * config.tps as f64;
                let limit = config.world_radius - blob.radius;
                let new_x = (blob.position.x + disp.x).clamp(-limit, limit);
                let new_y = (blob.position.y + disp.y).clamp(-limit, limit);

                blob.velocity = if dt > 0.0 {
                    DVec2::new((new_x - blob.position.x) / dt, (new_y - blob.position.y) / dt)
                } else {
                    DVec2::ZERO
                };
                blob.position = DVec2::new(new_x, new_y);
            } else {
                blob.velocity = DVec2::ZERO;
            }

            blob.aabb = swept_aabb_vec(blob.position, blob.velocity, blob.radius, config.tps);
        }

        player.refresh_derived_state(config.client_width_pixels, config.client_height_pixels);
    }
}
