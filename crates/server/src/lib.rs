//! Pet adoption server library.
//!
//! JSON API for pet listings and adoption requests. Exposed as a library
//! so the router can be driven end to end from tests and the CLI can reuse
//! the account service.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;
