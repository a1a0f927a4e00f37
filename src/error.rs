//! Engine-local error taxonomy. Nothing here is fatal to the process;
//! every variant is observed and logged by the tick scheduler.

use thiserror::Error;

use crate::placement::PlacementKind;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("malformed input on topic {topic}: {reason}")]
    MalformedInput { topic: &'static str, reason: String },

    #[error("placement exhausted for {kind:?} (radius {radius}) after {attempts} attempts")]
    PlacementExhausted {
        kind: PlacementKind,
        radius: f64,
        attempts: u32,
    },
}
