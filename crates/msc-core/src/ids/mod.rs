//! ID type wrappers for type safety.

pub mod owner_id;

pub use owner_id::OwnerId;
