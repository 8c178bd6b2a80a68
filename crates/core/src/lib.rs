//! Pet Adoption Core - Shared types library.
//!
//! This crate provides common types used across the pet adoption components:
//! - `server` - The JSON API for pets and adoption requests
//! - `cli` - Command-line tools for migrations and account management
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, usernames, emails, tokens
//!   and the pet choice enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
