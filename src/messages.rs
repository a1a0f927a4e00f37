//! Wire message shapes for the two inbound pub/sub topics the engine
//! consumes and the per-player outbound topic it produces. Framing
//! itself is the transport's concern; these types only need to
//! round-trip through `serde_json`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `player:join_game` payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JoinGameMsg {
    pub uuid: Uuid,
    pub username: String,
}

/// `player:update_position` payload. `(x, y)` is the client cursor
/// position in client pixel coordinates.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdatePositionMsg {
    pub uuid: Uuid,
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SelfBlobView {
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OtherBlobView {
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub vx: f64,
    pub vy: f64,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorldObjectType {
    Food,
    Virus,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorldObjectView {
    #[serde(rename = "type")]
    pub kind: WorldObjectType,
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

/// Shared payload shape for both `join_game` and `tick_update` broadcasts.
/// Coordinates are world-space; the session gateway (out of scope here)
/// applies the screen-relative transform for rendering.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TickData {
    pub com_x: f64,
    pub com_y: f64,
    pub self_blobs: Vec<SelfBlobView>,
    pub zoom_factor: f64,
    pub other_blobs: Vec<(String, OtherBlobView)>,
    pub world_objects: Vec<(String, WorldObjectView)>,
    pub world_radius: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "method", content = "data", rename_all = "snake_case")]
pub enum OutboundMessage {
    JoinGame(TickData),
    TickUpdate(TickData),
}
