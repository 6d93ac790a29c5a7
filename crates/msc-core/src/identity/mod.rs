//! Identity records returned by the identity lookup collaborator.

mod user;

pub use user::IdentityUser;
