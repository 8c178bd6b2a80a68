//! Domain models.
//!
//! These types represent validated domain objects. Incoming payloads
//! (`*Input`) are converted into them through [`crate::validation`].

pub mod adoption_request;
pub mod pet;
pub mod user;

pub use adoption_request::{
    AdoptionRequest, AdoptionRequestChanges, AdoptionRequestDetail, AdoptionRequestInput,
    ContactDetails, NewAdoptionRequest,
};
pub use pet::{NewPet, Pet, PetChanges, PetFilter, PetInput};
pub use user::{CurrentUser, LoginInput, NewUser, SignupInput, User};
