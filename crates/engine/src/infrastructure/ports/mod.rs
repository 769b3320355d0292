//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Identity (token verification)
//! - Player profiles (could swap in-memory -> HTTP service)
//! - Battle history (SQLite, or none)
//! - Client delivery (WebSocket registry)
//! - Clock/Random (for testing)

mod error;
mod external;
mod testing;

// =============================================================================
// Error Types
// =============================================================================
pub use error::{AuthError, ProfileStoreError, RepoError};

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{
    BattleHistory, ConnectionPort, PlayerProfile, ProfileStore, TokenVerifier,
};

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use external::{
    MockBattleHistory, MockConnectionPort, MockProfileStore, MockTokenVerifier,
};

#[cfg(test)]
pub use testing::MockClockPort;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::{ClockPort, RandomPort};
