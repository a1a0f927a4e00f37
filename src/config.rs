//! All tunable world constants in one place, read once at startup.

use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};

/// World and gameplay constants, fixed for the lifetime of a running engine.
///
/// Covers world bounds, grid resolution, spawn radii, separation distance,
/// tick rate and client viewport dimensions, plus the spawn-attempt
/// ceilings used by the placement search.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub world_radius: f64,
    pub grid_cell_size: f64,
    pub initial_player_radius: f64,
    pub min_food_radius: f64,
    pub max_food_radius: f64,
    pub min_separation_distance: f64,
    pub tps: u32,
    pub client_width_pixels: f64,
    pub client_height_pixels: f64,
    pub maximum_player_spawning_attempts: u32,
    pub maximum_food_spawning_attempts: u32,
    /// `food_amount` debited per successful food spawn.
    pub food_spawn_cost: f64,
    /// `food_amount` credited when a player joins.
    pub join_food_bonus: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            world_radius: 2000.0,
            grid_cell_size: 100.0,
            initial_player_radius: 20.0,
            min_food_radius: 5.0,
            max_food_radius: 10.0,
            min_separation_distance: 5.0,
            tps: 60,
            client_width_pixels: 1920.0,
            client_height_pixels: 1080.0,
            maximum_player_spawning_attempts: 20,
            maximum_food_spawning_attempts: 50,
            food_spawn_cost: 10.0,
            join_food_bonus: 100.0,
        }
    }
}

impl EngineConfig {
    /// Seconds covered by one nominal tick at the configured rate.
    pub fn tick_dt(&self) -> f64 {
        1.0 / self.tps as f64
    }

    /// Build a config from environment variables, falling back to
    /// [`EngineConfig::default`] for anything unset. The enclosing process
    /// owns env parsing per the external-interfaces contract; the engine
    /// itself never reads argv or a config file.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            world_radius: env_or("WORLD_RADIUS", defaults.world_radius)?,
            grid_cell_size: env_or("GRID_CELL_SIZE", defaults.grid_cell_size)?,
            initial_player_radius: env_or(
                "INITIAL_PLAYER_RADIUS",
                defaults.initial_player_radius,
            )?,
            min_food_radius: env_or("MIN_FOOD_RADIUS", defaults.min_food_radius)?,
            max_food_radius: env_or("MAX_FOOD_RADIUS", defaults.max_food_radius)?,
            min_separation_distance: env_or(
                "MIN_SEPARATION_DISTANCE",
                defaults.min_separation_distance,
            )?,
            tps: env_or("TPS", defaults.tps)?,
            client_width_pixels: env_or("CLIENT_WIDTH_PIXELS", defaults.client_width_pixels)?,
            client_height_pixels: env_or(
                "CLIENT_HEIGHT_PIXELS",
                defaults.client_height_pixels,
            )?,
            maximum_player_spawning_attempts: env_or(
                "MAXIMUM_PLAYER_SPAWNING_ATTEMPTS",
                defaults.maximum_player_spawning_attempts,
            )?,
            maximum_food_spawning_attempts: env_or(
                "MAXIMUM_FOOD_SPAWNING_ATTEMPTS",
                defaults.maximum_food_spawning_attempts,
            )?,
            food_spawn_cost: env_or("FOOD_SPAWN_COST", defaults.food_spawn_cost)?,
            join_food_bonus: env_or("JOIN_FOOD_BONUS", defaults.join_food_bonus)?,
        })
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(e) => Err(e).with_context(|| format!("reading {key}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_internally_consistent() {
        let cfg = EngineConfig::default();
        assert!(cfg.world_radius > cfg.initial_player_radius);
        assert!((cfg.tick_dt() - 1.0 / 60.0).abs() < 1e-12);
    }
}
