pub mod admin;
pub mod auth;
pub mod dictionary;
pub mod meldunki;
pub mod profile;
