//! Domain events
//!
//! Return types from aggregate mutations, communicating what happened when
//! battle state was modified.

pub mod battle_events;

pub use battle_events::*;
