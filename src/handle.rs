//! Entity handles: tagged, stable identifiers the grid stores instead of
//! owning references (see Design Notes on cyclic/back references).

use uuid::Uuid;

/// A tagged value distinguishing a player's blob from a world object.
/// In-memory this is a struct-valued enum; only the outbound message
/// layer stringifies it, preserving the `"uuid"` / `"uuid:blob_index"`
/// wire form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Handle {
    PlayerBlob { player_id: Uuid, blob_index: usize },
    WorldObject { object_id: Uuid },
}

impl Handle {
    /// Serialization-only string form, e.g. `"{uuid}:{blob_index}"` or
    /// `"{uuid}"`.
    pub fn to_wire_string(&self) -> String {
        match self {
            Handle::PlayerBlob {
                player_id,
                blob_index,
            } => format!("{player_id}:{blob_index}"),
            Handle::WorldObject { object_id } => object_id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_blob_handle_stringifies_with_blob_index() {
        let id = Uuid::nil();
        let h = Handle::PlayerBlob {
            player_id: id,
            blob_index: 2,
        };
        assert_eq!(h.to_wire_string(), format!("{id}:2"));
    }

    #[test]
    fn world_object_handle_stringifies_as_bare_uuid() {
        let id = Uuid::nil();
        let h = Handle::WorldObject { object_id: id };
        assert_eq!(h.to_wire_string(), id.to_string());
    }
}
