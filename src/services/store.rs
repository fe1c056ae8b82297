use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{
    CandidateFilter, Message, NewPairing, Pairing, PairingId, PairingStatus, Profile, Role, User,
    UserId,
};

/// Errors that can occur when reading or writing persistent state
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A uniqueness rule rejected the write, e.g. a user already has an active pairing
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Persistence operations the pairing engine relies on
///
/// `create_pairing` must be atomic with respect to the rule that a user is
/// in at most one active pairing: a losing concurrent writer gets
/// [`StoreError::Conflict`] and nothing is written.
#[async_trait]
pub trait PairingStore: Send + Sync {
    /// Create the account for `external_id`, or return the existing one
    async fn register_user(&self, external_id: &str, role: Role) -> Result<User, StoreError>;

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, StoreError>;

    /// The user together with their profile; `None` if either is missing
    async fn get_user_with_profile(
        &self,
        user_id: UserId,
    ) -> Result<Option<(User, Profile)>, StoreError>;

    /// Insert or replace the profile and mark the user registered
    async fn save_profile(&self, profile: &Profile) -> Result<Profile, StoreError>;

    /// Users blocked by or blocking `user_id`
    async fn list_blocked_pairs(&self, user_id: UserId) -> Result<HashSet<UserId>, StoreError>;

    /// Partners of `user_id` in pairings created at or after `since`, any status
    async fn list_recent_pairing_partners(
        &self,
        user_id: UserId,
        since: DateTime<Utc>,
    ) -> Result<HashSet<UserId>, StoreError>;

    async fn list_users_in_active_pairing(&self) -> Result<HashSet<UserId>, StoreError>;

    /// Registered, active users matching the pre-filter, in a stable order
    async fn query_candidates(
        &self,
        filter: &CandidateFilter,
    ) -> Result<Vec<(User, Profile)>, StoreError>;

    async fn create_pairing(&self, pairing: NewPairing) -> Result<Pairing, StoreError>;

    async fn end_pairing(
        &self,
        pairing_id: PairingId,
        status: PairingStatus,
        ended_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    async fn find_active_pairing(&self, user_id: UserId) -> Result<Option<Pairing>, StoreError>;

    /// Most recent first
    async fn pairing_history(&self, user_id: UserId, limit: usize)
        -> Result<Vec<Pairing>, StoreError>;

    /// Record `blocker -> blocked`; repeated calls are no-ops
    async fn create_block(&self, blocker_id: UserId, blocked_id: UserId) -> Result<(), StoreError>;

    async fn record_message(
        &self,
        pairing_id: PairingId,
        sender_id: UserId,
        receiver_id: UserId,
        content: &str,
    ) -> Result<Message, StoreError>;

    /// End active pairings created before `created_before` that have no messages
    async fn end_inactive_pairings(
        &self,
        created_before: DateTime<Utc>,
        ended_at: DateTime<Utc>,
    ) -> Result<u64, StoreError>;

    async fn increment_gender_views(&self, user_id: UserId) -> Result<(), StoreError>;

    /// Revert a lapsed premium subscription to the free tier
    async fn downgrade_subscription(&self, user_id: UserId) -> Result<(), StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}
