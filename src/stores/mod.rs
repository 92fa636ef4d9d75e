//! Concrete collaborators for the CLI and for tests.

mod auth;
mod config_store;
mod images;
mod ratings;

pub use auth::RoleAuthorizer;
pub use config_store::{JsonFileConfigStore, MemoryConfigStore};
pub use images::UrlPrefixImageHost;
pub use ratings::{InMemoryRatingStore, JsonRatingStore};
