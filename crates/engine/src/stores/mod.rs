//! In-memory state storage modules.
//!
//! Stores manage runtime state that doesn't belong in the database:
//! - `BattleStore` - live battle actor handles

pub mod battles;

pub use battles::BattleStore;
