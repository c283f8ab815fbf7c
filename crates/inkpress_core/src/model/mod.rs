//! Domain models for accounts, posts and tags.
//!
//! # Responsibility
//! - Define the read and write shapes exchanged with core callers.
//! - Keep credential data out of every read model.
//!
//! # Invariants
//! - Every entity is identified by a stable id assigned at creation.
//! - Read models are plain data; no model talks to storage.

pub mod post;
pub mod tag;
pub mod user;
