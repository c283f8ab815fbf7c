//! User account use-case service.
//!
//! # Responsibility
//! - Validate registration input before any statement is issued.
//! - Delegate persistence to the user repository.
//!
//! # Invariants
//! - Username format and credential length are checked up front.
//! - The stored credential is never echoed back in an error.

use crate::model::user::{NewUser, User, UserId, UserPatch, UserWithPosts};
use crate::repo::user_repo::UserRepository;
use crate::repo::{RepoError, RepoResult, UpdateOutcome};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]{3,32}$").expect("valid username regex"));

const MIN_PASSWORD_CHARS: usize = 8;

/// Service error for user use-cases.
#[derive(Debug)]
pub enum UserServiceError {
    /// Username does not match the accepted format.
    InvalidUsername(String),
    /// Credential too short. The value itself is intentionally absent.
    InvalidCredential,
    /// The username is already taken; nothing was created.
    UsernameTaken(String),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for UserServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUsername(value) => write!(f, "invalid username: `{value}`"),
            Self::InvalidCredential => {
                write!(f, "credential must be at least {MIN_PASSWORD_CHARS} characters")
            }
            Self::UsernameTaken(value) => write!(f, "username already taken: `{value}`"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for UserServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for UserServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// User service facade over a repository implementation.
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new account after validating the input.
    ///
    /// A username collision is reported as `UsernameTaken`; the underlying
    /// insert is conflict-tolerant and leaves the existing row untouched.
    pub fn register_user(&self, new_user: NewUser) -> Result<User, UserServiceError> {
        validate_username(new_user.username.as_str())?;
        validate_password(new_user.password.as_str())?;

        match self.repo.create_user(&new_user)? {
            Some(user) => Ok(user),
            None => Err(UserServiceError::UsernameTaken(new_user.username)),
        }
    }

    /// Applies a profile patch, validating patched username/credential first.
    ///
    /// An empty patch is passed through as `UpdateOutcome::NoFields`.
    pub fn update_profile(
        &self,
        id: UserId,
        patch: UserPatch,
    ) -> Result<UpdateOutcome<User>, UserServiceError> {
        if let Some(username) = patch.username.as_deref() {
            validate_username(username)?;
        }
        if let Some(password) = patch.password.as_deref() {
            validate_password(password)?;
        }

        Ok(self.repo.update_user(id, &patch)?)
    }

    /// Gets one account hydrated with its authored posts.
    pub fn get_user(&self, id: UserId) -> RepoResult<Option<UserWithPosts>> {
        self.repo.get_user(id)
    }

    /// Lists all accounts, credential excluded.
    pub fn list_users(&self) -> RepoResult<Vec<User>> {
        self.repo.list_users()
    }
}

fn validate_username(username: &str) -> Result<(), UserServiceError> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(UserServiceError::InvalidUsername(username.to_string()))
    }
}

fn validate_password(password: &str) -> Result<(), UserServiceError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(UserServiceError::InvalidCredential);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_password, validate_username};

    #[test]
    fn username_format_allows_word_characters_only() {
        assert!(validate_username("albert_99").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("dash-ed").is_err());
    }

    #[test]
    fn password_requires_minimum_length() {
        assert!(validate_password("bertie99").is_ok());
        assert!(validate_password("short").is_err());
    }
}
