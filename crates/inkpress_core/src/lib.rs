//! Core domain logic for Inkpress.
//! This crate is the single source of truth for content-API invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::post::{Author, NewPost, Post, PostDetail, PostId, PostPatch};
pub use model::tag::{Tag, TagId};
pub use model::user::{NewUser, User, UserId, UserPatch, UserWithPosts};
pub use repo::post_repo::{PostRepository, SqlitePostRepository};
pub use repo::tag_repo::{SqliteTagRepository, TagRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult, UpdateOutcome};
pub use service::post_service::{PostService, PostServiceError};
pub use service::user_service::{UserService, UserServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
