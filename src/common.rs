/// Common types shared across entities, services and handlers
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// An (attribute, attribute value) pair, e.g. (Color, Red).
///
/// Used for variant signatures, image tags and storefront selections alike.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
pub struct AttributePair {
    pub attribute_id: Uuid,
    pub attribute_value_id: Uuid,
}

impl AttributePair {
    pub fn new(attribute_id: Uuid, attribute_value_id: Uuid) -> Self {
        Self {
            attribute_id,
            attribute_value_id,
        }
    }
}

impl From<(Uuid, Uuid)> for AttributePair {
    fn from((attribute_id, attribute_value_id): (Uuid, Uuid)) -> Self {
        Self::new(attribute_id, attribute_value_id)
    }
}
