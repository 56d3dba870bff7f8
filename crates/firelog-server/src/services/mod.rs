//! Orchestration between the HTTP layer and the provider/database seams.
//!
//! Services borrow their dependencies from [`crate::state::AppState`] and
//! keep nothing between calls.

pub mod admin;
pub mod auth;
pub mod dictionary;
pub mod meldunki;
pub mod profile;

pub use admin::AdminService;
pub use auth::AuthService;
pub use dictionary::DictionaryService;
pub use meldunki::MeldunkiService;
pub use profile::ProfileService;

#[cfg(test)]
pub(crate) mod test_support;
