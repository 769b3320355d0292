//! Aggregate roots - domain objects that own their related data
//!
//! - Private fields, behavior through methods
//! - Mutations return outcome enums from `events`

pub mod battle;

pub use battle::{Battle, BattleAction, BattleStatus, Round, RoundAction, RoundOutcome};
