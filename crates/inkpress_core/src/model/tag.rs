//! Tag model.

use serde::{Deserialize, Serialize};

/// Row id of a tag. Tags are shared between posts and have no owner.
pub type TagId = i64;

/// A unique free-form tag name, e.g. `#rust`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}
