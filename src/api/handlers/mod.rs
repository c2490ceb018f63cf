//! API handlers for the session gate service.

pub mod admin;
pub mod auth;
pub mod health;
pub mod root;
