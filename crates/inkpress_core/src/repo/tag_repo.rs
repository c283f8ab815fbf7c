//! Tag association manager: tag upserts and the post↔tag join relation.
//!
//! # Responsibility
//! - Upsert tag rows from free-form name lists.
//! - Link posts to tags idempotently through `post_tags`.
//!
//! # Invariants
//! - Tag names are unique; re-ensuring an existing name returns its
//!   original row.
//! - Join-pair inserts are idempotent; re-linking an already-linked tag is
//!   harmless.
//! - A failed link aborts the whole batch before any hydration happens.

use crate::model::post::{PostDetail, PostId};
use crate::model::tag::Tag;
use crate::repo::post_repo::{PostRepository, SqlitePostRepository};
use crate::repo::RepoResult;
use rusqlite::{params, params_from_iter, Connection};
use std::collections::BTreeSet;

/// Repository interface for tag upserts and post↔tag links.
pub trait TagRepository {
    /// Upserts every candidate name and returns the authoritative tag rows,
    /// pre-existing ones included. Empty input issues no statements.
    fn ensure_tags(&self, names: &[String]) -> RepoResult<Vec<Tag>>;
    /// Links the post to every given tag, then re-fetches the hydrated post.
    /// The first failing link aborts the call; rows already linked stay
    /// linked.
    fn link_post_to_tags(&self, post_id: PostId, tags: &[Tag]) -> RepoResult<Option<PostDetail>>;
    /// Returns all known tag rows sorted by name.
    fn list_tags(&self) -> RepoResult<Vec<Tag>>;
}

/// SQLite-backed tag association manager.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TagRepository for SqliteTagRepository<'_> {
    fn ensure_tags(&self, names: &[String]) -> RepoResult<Vec<Tag>> {
        let names = dedupe_tag_names(names);
        if names.is_empty() {
            return Ok(Vec::new());
        }

        for name in &names {
            self.conn.execute(
                "INSERT INTO tags (name) VALUES (?1)
                 ON CONFLICT(name) DO NOTHING;",
                [name.as_str()],
            )?;
        }

        // The conflict-tolerant insert does not report pre-existing rows;
        // the re-select is the authoritative answer for the full name set.
        let placeholders = vec!["?"; names.len()].join(", ");
        let sql = format!(
            "SELECT id, name
             FROM tags
             WHERE name IN ({placeholders})
             ORDER BY name ASC;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(names.iter()))?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(Tag {
                id: row.get("id")?,
                name: row.get("name")?,
            });
        }
        Ok(tags)
    }

    fn link_post_to_tags(&self, post_id: PostId, tags: &[Tag]) -> RepoResult<Option<PostDetail>> {
        for tag in tags {
            self.conn.execute(
                "INSERT INTO post_tags (post_uuid, tag_id) VALUES (?1, ?2)
                 ON CONFLICT(post_uuid, tag_id) DO NOTHING;",
                params![post_id.to_string(), tag.id],
            )?;
        }

        SqlitePostRepository::new(self.conn).get_post(post_id)
    }

    fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM tags ORDER BY name ASC;")?;
        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(Tag {
                id: row.get("id")?,
                name: row.get("name")?,
            });
        }
        Ok(tags)
    }
}

/// Trims candidate names, drops blanks and collapses duplicates.
pub fn dedupe_tag_names(names: &[String]) -> Vec<String> {
    let mut unique = BTreeSet::new();
    for name in names {
        let trimmed = name.trim();
        if !trimmed.is_empty() {
            unique.insert(trimmed.to_string());
        }
    }
    unique.into_iter().collect()
}
