//! Post model: flat rows and the hydrated detail projection.
//!
//! # Invariants
//! - `author_id` is immutable after creation.
//! - `PostDetail` nests the author and never exposes the raw foreign key.

use crate::model::tag::Tag;
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a post.
pub type PostId = Uuid;

/// Flat post row as returned by list views.
///
/// List views are intentionally cheap: no tags, no author hydration, the
/// author reference stays a plain foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub title: String,
    pub content: String,
    /// Unix epoch milliseconds, maintained by the store.
    pub created_at: i64,
    /// Unix epoch milliseconds, maintained by the store.
    pub updated_at: i64,
}

/// Input shape for post creation. Tag handling is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewPost {
    pub author_id: UserId,
    pub title: String,
    pub content: String,
}

/// Partial update for a post row. The author is not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl PostPatch {
    /// Returns whether the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

/// Public author projection nested inside a hydrated post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub id: UserId,
    pub username: String,
    pub name: Option<String>,
    pub location: Option<String>,
}

/// Fully hydrated post: tags joined through the association table and the
/// author's public fields in place of the raw `author_id` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostDetail {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub author: Author,
    pub tags: Vec<Tag>,
}
