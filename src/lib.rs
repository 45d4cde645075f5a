//! Movie recommendation HTTP service.
//!
//! Given a user's preferred genres, a runtime bucket and an age, returns a
//! short ranked list of movies from an in-memory catalog loaded at startup.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
