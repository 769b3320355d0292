//! QuestArena Engine library.
//!
//! This crate contains all server-side code for the battle arena.
//!
//! ## Structure
//!
//! - `use_cases/` - Matchmaking, battle actors, broadcasts and outcome reporting
//! - `stores/` - Live battle registry
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - HTTP and WebSocket entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod stores;
pub mod use_cases;

pub use app::App;
