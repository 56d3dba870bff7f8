pub mod auth;
pub mod authz;
pub mod config;
pub mod db;
pub mod error;
pub mod rate_limit;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;
