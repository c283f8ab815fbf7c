//! User account model.
//!
//! # Invariants
//! - `username` is unique across the store.
//! - The stored credential is write-only: no read model carries it.

use crate::model::post::Post;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a user account.
pub type UserId = Uuid;

/// Public account projection returned by every fetch path.
///
/// The credential column is excluded at the query level, so this shape
/// cannot leak it even when serialized verbatim to a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub active: bool,
}

/// Input shape for account creation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub name: Option<String>,
    pub location: Option<String>,
}

/// Partial update for a user row.
///
/// Only fields present here can ever reach a SET clause; the struct itself
/// is the allow-list of updatable columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserPatch {
    pub username: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub active: Option<bool>,
}

impl UserPatch {
    /// Returns whether the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password.is_none()
            && self.name.is_none()
            && self.location.is_none()
            && self.active.is_none()
    }
}

/// Account projection hydrated with every post the user authored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserWithPosts {
    pub id: UserId,
    pub username: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub active: bool,
    pub posts: Vec<Post>,
}
