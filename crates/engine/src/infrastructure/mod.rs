//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod auth;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod history;
pub mod ports;
pub mod profile_store;
