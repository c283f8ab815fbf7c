//! Post repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist post rows and serve flat list projections.
//! - Own the detail-hydration path: tags through the association table plus
//!   the author's public fields.
//!
//! # Invariants
//! - List views stay flat: no tags, no author, raw `author_id` present.
//! - `get_post` is the only hydrating read; its result nests the author and
//!   carries no raw foreign key.
//! - The author reference is immutable: no patch path touches it.

use crate::model::post::{Author, NewPost, Post, PostDetail, PostId, PostPatch};
use crate::model::tag::Tag;
use crate::model::user::UserId;
use crate::repo::{RepoError, RepoResult, UpdateOutcome};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

const POST_SELECT_SQL: &str = "SELECT
    uuid,
    author_uuid,
    title,
    content,
    created_at,
    updated_at
FROM posts";

/// Repository interface for posts.
pub trait PostRepository {
    /// Inserts the core post fields. Tag creation/linking is the caller's
    /// responsibility. Returns `None` only if the insert yields no row.
    fn create_post(&self, new_post: &NewPost) -> RepoResult<Option<Post>>;
    /// Applies a partial update built from the fields present on the patch.
    fn update_post(&self, id: PostId, patch: &PostPatch) -> RepoResult<UpdateOutcome<Post>>;
    /// Returns all posts as flat rows.
    fn list_posts(&self) -> RepoResult<Vec<Post>>;
    /// Returns the flat rows authored by one user.
    fn posts_by_author(&self, author_id: UserId) -> RepoResult<Vec<Post>>;
    /// Returns the flat rows linked to the given tag name.
    fn posts_with_tag(&self, tag_name: &str) -> RepoResult<Vec<Post>>;
    /// Gets one post hydrated with its tag set and author.
    fn get_post(&self, id: PostId) -> RepoResult<Option<PostDetail>>;
}

/// SQLite-backed post repository.
pub struct SqlitePostRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePostRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PostRepository for SqlitePostRepository<'_> {
    fn create_post(&self, new_post: &NewPost) -> RepoResult<Option<Post>> {
        let id = Uuid::new_v4();
        let changed = self.conn.execute(
            "INSERT INTO posts (uuid, author_uuid, title, content)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                id.to_string(),
                new_post.author_id.to_string(),
                new_post.title.as_str(),
                new_post.content.as_str(),
            ],
        )?;

        if changed == 0 {
            return Ok(None);
        }

        match fetch_post(self.conn, id)? {
            Some(post) => Ok(Some(post)),
            None => Err(RepoError::InvalidData(
                "created post missing on read-back".to_string(),
            )),
        }
    }

    fn update_post(&self, id: PostId, patch: &PostPatch) -> RepoResult<UpdateOutcome<Post>> {
        let mut assignments: Vec<&'static str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(title) = patch.title.as_ref() {
            assignments.push("title = ?");
            bind_values.push(Value::Text(title.clone()));
        }
        if let Some(content) = patch.content.as_ref() {
            assignments.push("content = ?");
            bind_values.push(Value::Text(content.clone()));
        }

        if assignments.is_empty() {
            return Ok(UpdateOutcome::NoFields);
        }

        let sql = format!(
            "UPDATE posts
             SET {}, updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?;",
            assignments.join(", ")
        );
        bind_values.push(Value::Text(id.to_string()));

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        if changed == 0 {
            return Ok(UpdateOutcome::NotFound);
        }

        match fetch_post(self.conn, id)? {
            Some(post) => Ok(UpdateOutcome::Updated(post)),
            None => Err(RepoError::InvalidData(
                "updated post missing on read-back".to_string(),
            )),
        }
    }

    fn list_posts(&self) -> RepoResult<Vec<Post>> {
        let mut stmt = self.conn.prepare(&format!(
            "{POST_SELECT_SQL} ORDER BY created_at DESC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        collect_posts(&mut rows)
    }

    fn posts_by_author(&self, author_id: UserId) -> RepoResult<Vec<Post>> {
        let mut stmt = self.conn.prepare(&format!(
            "{POST_SELECT_SQL}
             WHERE author_uuid = ?1
             ORDER BY created_at DESC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([author_id.to_string()])?;
        collect_posts(&mut rows)
    }

    fn posts_with_tag(&self, tag_name: &str) -> RepoResult<Vec<Post>> {
        let mut stmt = self.conn.prepare(&format!(
            "{POST_SELECT_SQL}
             WHERE EXISTS (
                SELECT 1
                FROM post_tags pt
                INNER JOIN tags t ON t.id = pt.tag_id
                WHERE pt.post_uuid = posts.uuid
                  AND t.name = ?1
             )
             ORDER BY created_at DESC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([tag_name])?;
        collect_posts(&mut rows)
    }

    fn get_post(&self, id: PostId) -> RepoResult<Option<PostDetail>> {
        let Some(post) = fetch_post(self.conn, id)? else {
            return Ok(None);
        };

        // The tag and author queries have no ordering dependency between them.
        let tags = load_tags_for_post(self.conn, id)?;
        let author = fetch_author(self.conn, post.author_id)?.ok_or_else(|| {
            RepoError::InvalidData(format!(
                "post {} references missing author {}",
                post.id, post.author_id
            ))
        })?;

        Ok(Some(PostDetail {
            id: post.id,
            title: post.title,
            content: post.content,
            created_at: post.created_at,
            updated_at: post.updated_at,
            author,
            tags,
        }))
    }
}

fn fetch_post(conn: &Connection, id: PostId) -> RepoResult<Option<Post>> {
    let mut stmt = conn.prepare(&format!("{POST_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_post_row(row)?));
    }
    Ok(None)
}

fn fetch_author(conn: &Connection, id: UserId) -> RepoResult<Option<Author>> {
    let mut stmt = conn.prepare(
        "SELECT uuid, username, name, location
         FROM users
         WHERE uuid = ?1;",
    )?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        let uuid_text: String = row.get("uuid")?;
        let id = Uuid::parse_str(&uuid_text).map_err(|_| {
            RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in users.uuid"))
        })?;
        return Ok(Some(Author {
            id,
            username: row.get("username")?,
            name: row.get("name")?,
            location: row.get("location")?,
        }));
    }
    Ok(None)
}

fn load_tags_for_post(conn: &Connection, post_id: PostId) -> RepoResult<Vec<Tag>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.name
         FROM post_tags pt
         INNER JOIN tags t ON t.id = pt.tag_id
         WHERE pt.post_uuid = ?1
         ORDER BY t.name ASC;",
    )?;
    let mut rows = stmt.query([post_id.to_string()])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(Tag {
            id: row.get("id")?,
            name: row.get("name")?,
        });
    }
    Ok(tags)
}

fn collect_posts(rows: &mut rusqlite::Rows<'_>) -> RepoResult<Vec<Post>> {
    let mut posts = Vec::new();
    while let Some(row) = rows.next()? {
        posts.push(parse_post_row(row)?);
    }
    Ok(posts)
}

fn parse_post_row(row: &Row<'_>) -> RepoResult<Post> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in posts.uuid"))
    })?;

    let author_text: String = row.get("author_uuid")?;
    let author_id = Uuid::parse_str(&author_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{author_text}` in posts.author_uuid"
        ))
    })?;

    Ok(Post {
        id,
        author_id,
        title: row.get("title")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
