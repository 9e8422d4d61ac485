//! # Zhiyuan Common Library
//!
//! Shared code for the zhiyuan services including:
//! - Database schema, initialization and row models
//! - Credential hashing and session token helpers
//! - Configuration loading and root folder resolution
//! - Input validation rules

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod validate;

pub use error::{Error, Result};
