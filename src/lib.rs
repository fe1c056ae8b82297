//! Veil Match - pairing engine for the Veil anonymous chat service
//!
//! Pairs registered users one-to-one: candidates are filtered for mutual
//! age and gender compatibility, scored, and one is drawn at random from
//! the best few. Pairings are created atomically so nobody ends up in two
//! conversations at once, and silent pairings are swept after a while.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{calculate_compatibility_score, Matcher};
pub use models::{Pairing, PairingStatus, Profile, User, UserId};
pub use services::{InMemoryStore, MatchService, PairingStore, PostgresStore};
