//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep HTTP/CLI callers decoupled from storage details.

pub mod post_service;
pub mod user_service;
