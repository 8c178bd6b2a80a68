//! Core types for the pet adoption service.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod status;
pub mod token;
pub mod username;

pub use email::{Email, EmailError};
pub use id::*;
pub use status::*;
pub use token::{AuthToken, AuthTokenError};
pub use username::{Username, UsernameError};
