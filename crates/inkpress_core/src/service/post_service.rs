//! Post publishing use-case service.
//!
//! # Responsibility
//! - Orchestrate the publish sequence: create post, ensure tags, link tags,
//!   re-fetch the hydrated result.
//! - Validate tag input before the first statement is issued.
//!
//! # Invariants
//! - Each call produces exactly one terminal outcome: a value or an error.
//! - A failure after the post insert leaves the post row persisted and
//!   partially tagged; no rollback is attempted.

use crate::model::post::{NewPost, Post, PostDetail, PostId, PostPatch};
use crate::model::tag::Tag;
use crate::model::user::UserId;
use crate::repo::post_repo::PostRepository;
use crate::repo::tag_repo::TagRepository;
use crate::repo::{RepoError, RepoResult, UpdateOutcome};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for post use-cases.
#[derive(Debug)]
pub enum PostServiceError {
    /// A tag name is blank after trimming.
    InvalidTag(String),
    /// Target post does not exist.
    PostNotFound(PostId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal mismatch between a write and its read-back.
    InconsistentState(&'static str),
}

impl Display for PostServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTag(value) => write!(f, "invalid tag: `{value}`"),
            Self::PostNotFound(id) => write!(f, "post not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent post state: {details}"),
        }
    }
}

impl Error for PostServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for PostServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Post service facade over post and tag repositories.
pub struct PostService<P: PostRepository, T: TagRepository> {
    posts: P,
    tags: T,
}

impl<P: PostRepository, T: TagRepository> PostService<P, T> {
    /// Creates a service over the provided repository implementations.
    pub fn new(posts: P, tags: T) -> Self {
        Self { posts, tags }
    }

    /// Publishes a post with the given tag names.
    ///
    /// Sequence: validate tags, insert the post row, upsert the tags, link
    /// every pair, re-fetch the hydrated post. Tag names are validated
    /// before the post insert, so a blank tag never leaves an orphaned row.
    pub fn publish_post(
        &self,
        new_post: &NewPost,
        tag_names: &[String],
    ) -> Result<PostDetail, PostServiceError> {
        validate_tag_names(tag_names)?;

        let post = self
            .posts
            .create_post(new_post)?
            .ok_or(PostServiceError::InconsistentState(
                "post insert yielded no row",
            ))?;

        self.tag_post(post.id, tag_names)
    }

    /// Ensures the given tag names exist and links them to an existing post.
    ///
    /// Returns the hydrated post on success. Re-linking already-linked tags
    /// is a no-op.
    pub fn tag_post(
        &self,
        post_id: PostId,
        tag_names: &[String],
    ) -> Result<PostDetail, PostServiceError> {
        validate_tag_names(tag_names)?;

        let tags = self.tags.ensure_tags(tag_names)?;
        self.tags
            .link_post_to_tags(post_id, &tags)?
            .ok_or(PostServiceError::PostNotFound(post_id))
    }

    /// Applies a patch to the post row. Empty patches pass through as
    /// `UpdateOutcome::NoFields`.
    pub fn update_post(&self, id: PostId, patch: &PostPatch) -> RepoResult<UpdateOutcome<Post>> {
        self.posts.update_post(id, patch)
    }

    /// Gets one post hydrated with tags and author.
    pub fn get_post(&self, id: PostId) -> RepoResult<Option<PostDetail>> {
        self.posts.get_post(id)
    }

    /// Lists all posts as flat rows.
    pub fn list_posts(&self) -> RepoResult<Vec<Post>> {
        self.posts.list_posts()
    }

    /// Lists the flat rows authored by one user.
    pub fn posts_by_author(&self, author_id: UserId) -> RepoResult<Vec<Post>> {
        self.posts.posts_by_author(author_id)
    }

    /// Lists the flat rows linked to the given tag name.
    pub fn posts_with_tag(&self, tag_name: &str) -> RepoResult<Vec<Post>> {
        self.posts.posts_with_tag(tag_name)
    }

    /// Lists all known tags.
    pub fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        self.tags.list_tags()
    }
}

fn validate_tag_names(tag_names: &[String]) -> Result<(), PostServiceError> {
    for name in tag_names {
        if name.trim().is_empty() {
            return Err(PostServiceError::InvalidTag(name.clone()));
        }
    }
    Ok(())
}
