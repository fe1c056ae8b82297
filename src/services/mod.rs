// Service exports
pub mod cache;
pub mod matchmaking;
pub mod memory;
pub mod postgres;
pub mod store;
pub mod sweeper;

pub use cache::{CacheError, CacheKey, CacheManager, Cooldown};
pub use matchmaking::{
    FindError, GenderReveal, MatchError, MatchFound, MatchPolicy, MatchService, NoMatch,
    PairingClosed,
};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use store::{PairingStore, StoreError};
pub use sweeper::InactivitySweeper;
