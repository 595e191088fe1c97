pub mod auth;
pub mod common;
pub mod config;
pub mod fetch;
pub mod notes;
pub mod user;
