//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist user accounts and serve their public projections.
//! - Build partial-update statements from typed patches.
//!
//! # Invariants
//! - The password column never appears in a read projection.
//! - Username collisions on create are conflict-tolerant: the insert is a
//!   no-op and the caller receives `None`, not an error.
//! - Only fixed column names reach identifier position; values always bind
//!   positionally.

use crate::model::user::{NewUser, User, UserId, UserPatch, UserWithPosts};
use crate::repo::post_repo::{PostRepository, SqlitePostRepository};
use crate::repo::{RepoError, RepoResult, UpdateOutcome};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

const USER_SELECT_SQL: &str = "SELECT
    uuid,
    username,
    name,
    location,
    active
FROM users";

/// Repository interface for user accounts.
pub trait UserRepository {
    /// Inserts a new account. Returns `None` when the username is taken.
    fn create_user(&self, new_user: &NewUser) -> RepoResult<Option<User>>;
    /// Applies a partial update built from the fields present on the patch.
    fn update_user(&self, id: UserId, patch: &UserPatch) -> RepoResult<UpdateOutcome<User>>;
    /// Returns all accounts, credential excluded.
    fn list_users(&self) -> RepoResult<Vec<User>>;
    /// Gets one account with its authored posts attached.
    fn get_user(&self, id: UserId) -> RepoResult<Option<UserWithPosts>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, new_user: &NewUser) -> RepoResult<Option<User>> {
        let id = Uuid::new_v4();
        let changed = self.conn.execute(
            "INSERT INTO users (uuid, username, password, name, location)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(username) DO NOTHING;",
            params![
                id.to_string(),
                new_user.username.as_str(),
                new_user.password.as_str(),
                new_user.name.as_deref(),
                new_user.location.as_deref(),
            ],
        )?;

        if changed == 0 {
            return Ok(None);
        }

        match fetch_user(self.conn, id)? {
            Some(user) => Ok(Some(user)),
            None => Err(RepoError::InvalidData(
                "created user missing on read-back".to_string(),
            )),
        }
    }

    fn update_user(&self, id: UserId, patch: &UserPatch) -> RepoResult<UpdateOutcome<User>> {
        let mut assignments: Vec<&'static str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(username) = patch.username.as_ref() {
            assignments.push("username = ?");
            bind_values.push(Value::Text(username.clone()));
        }
        if let Some(password) = patch.password.as_ref() {
            assignments.push("password = ?");
            bind_values.push(Value::Text(password.clone()));
        }
        if let Some(name) = patch.name.as_ref() {
            assignments.push("name = ?");
            bind_values.push(Value::Text(name.clone()));
        }
        if let Some(location) = patch.location.as_ref() {
            assignments.push("location = ?");
            bind_values.push(Value::Text(location.clone()));
        }
        if let Some(active) = patch.active {
            assignments.push("active = ?");
            bind_values.push(Value::Integer(i64::from(active)));
        }

        if assignments.is_empty() {
            return Ok(UpdateOutcome::NoFields);
        }

        let sql = format!(
            "UPDATE users
             SET {}, updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?;",
            assignments.join(", ")
        );
        bind_values.push(Value::Text(id.to_string()));

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        if changed == 0 {
            return Ok(UpdateOutcome::NotFound);
        }

        match fetch_user(self.conn, id)? {
            Some(user) => Ok(UpdateOutcome::Updated(user)),
            None => Err(RepoError::InvalidData(
                "updated user missing on read-back".to_string(),
            )),
        }
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} ORDER BY username ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<UserWithPosts>> {
        let Some(user) = fetch_user(self.conn, id)? else {
            return Ok(None);
        };

        let posts = SqlitePostRepository::new(self.conn).posts_by_author(id)?;
        Ok(Some(UserWithPosts {
            id: user.id,
            username: user.username,
            name: user.name,
            location: user.location,
            active: user.active,
            posts,
        }))
    }
}

fn fetch_user(conn: &Connection, id: UserId) -> RepoResult<Option<User>> {
    let mut stmt = conn.prepare(&format!("{USER_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_user_row(row)?));
    }
    Ok(None)
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in users.uuid"))
    })?;

    let active = match row.get::<_, i64>("active")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid active value `{other}` in users.active"
            )));
        }
    };

    Ok(User {
        id,
        username: row.get("username")?,
        name: row.get("name")?,
        location: row.get("location")?,
        active,
    })
}
