//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Signup, login and token resolution
//! - `permissions` - Object-level authorization rules
//! - `pets` - Pet listing operations
//! - `adoption_requests` - Adoption request operations
//!
//! The caller is always an explicit argument; no service reads ambient
//! request state.

pub mod adoption_requests;
pub mod auth;
pub mod permissions;
pub mod pets;

pub use adoption_requests::AdoptionRequestService;
pub use auth::{AuthError, AuthService};
pub use pets::PetService;
