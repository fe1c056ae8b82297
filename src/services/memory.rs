use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::core::filters::matches_candidate_filter;
use crate::models::{
    Block, CandidateFilter, Message, NewPairing, Pairing, PairingId, PairingStatus, Profile, Role,
    SubscriptionTier, User, UserId, UserStatus,
};
use crate::services::store::{PairingStore, StoreError};

#[derive(Debug, Default)]
struct State {
    next_user_id: UserId,
    next_message_id: i64,
    users: HashMap<UserId, User>,
    profiles: HashMap<UserId, Profile>,
    pairings: Vec<Pairing>,
    blocks: Vec<Block>,
    messages: Vec<Message>,
}

/// Process-local store with the same semantics as the PostgreSQL one
///
/// A single mutex guards all state, so the active-pairing check and the
/// insert in `create_pairing` cannot interleave with another writer.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a pairing's creation time
    pub async fn backdate_pairing(&self, pairing_id: PairingId, created_at: DateTime<Utc>) {
        let mut state = self.state.lock().await;
        if let Some(pairing) = state.pairings.iter_mut().find(|p| p.id == pairing_id) {
            pairing.created_at = created_at;
        }
    }

    pub async fn set_status(&self, user_id: UserId, status: UserStatus) {
        let mut state = self.state.lock().await;
        if let Some(user) = state.users.get_mut(&user_id) {
            user.status = status;
        }
    }

    pub async fn set_premium(&self, user_id: UserId, expires_at: DateTime<Utc>) {
        let mut state = self.state.lock().await;
        if let Some(user) = state.users.get_mut(&user_id) {
            user.subscription = SubscriptionTier::Premium;
            user.premium_expires_at = Some(expires_at);
        }
    }

    pub async fn pairings(&self) -> Vec<Pairing> {
        self.state.lock().await.pairings.clone()
    }
}

fn has_active_pairing(state: &State, user_id: UserId) -> bool {
    state
        .pairings
        .iter()
        .any(|p| p.is_active() && p.involves(user_id))
}

#[async_trait]
impl PairingStore for InMemoryStore {
    async fn register_user(&self, external_id: &str, role: Role) -> Result<User, StoreError> {
        let mut state = self.state.lock().await;

        if let Some(existing) = state.users.values().find(|u| u.external_id == external_id) {
            return Ok(existing.clone());
        }

        state.next_user_id += 1;
        let user = User {
            id: state.next_user_id,
            external_id: external_id.to_string(),
            status: UserStatus::Active,
            is_registered: false,
            role,
            subscription: SubscriptionTier::Free,
            premium_expires_at: None,
            gender_views_used: 0,
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.state.lock().await.users.get(&user_id).cloned())
    }

    async fn get_user_with_profile(
        &self,
        user_id: UserId,
    ) -> Result<Option<(User, Profile)>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .get(&user_id)
            .zip(state.profiles.get(&user_id))
            .map(|(u, p)| (u.clone(), p.clone())))
    }

    async fn save_profile(&self, profile: &Profile) -> Result<Profile, StoreError> {
        let mut state = self.state.lock().await;

        let user = state
            .users
            .get_mut(&profile.user_id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", profile.user_id)))?;
        user.is_registered = true;

        let now = Utc::now();
        let mut saved = profile.clone();
        saved.updated_at = now;
        saved.created_at = state
            .profiles
            .get(&profile.user_id)
            .map(|p| p.created_at)
            .unwrap_or(now);

        state.profiles.insert(saved.user_id, saved.clone());
        Ok(saved)
    }

    async fn list_blocked_pairs(&self, user_id: UserId) -> Result<HashSet<UserId>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .blocks
            .iter()
            .filter_map(|b| {
                if b.blocker_id == user_id {
                    Some(b.blocked_id)
                } else if b.blocked_id == user_id {
                    Some(b.blocker_id)
                } else {
                    None
                }
            })
            .collect())
    }

    async fn list_recent_pairing_partners(
        &self,
        user_id: UserId,
        since: DateTime<Utc>,
    ) -> Result<HashSet<UserId>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .pairings
            .iter()
            .filter(|p| p.created_at >= since)
            .filter_map(|p| p.partner_of(user_id))
            .collect())
    }

    async fn list_users_in_active_pairing(&self) -> Result<HashSet<UserId>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .pairings
            .iter()
            .filter(|p| p.is_active())
            .flat_map(|p| [p.user1_id, p.user2_id])
            .collect())
    }

    async fn query_candidates(
        &self,
        filter: &CandidateFilter,
    ) -> Result<Vec<(User, Profile)>, StoreError> {
        let state = self.state.lock().await;

        let mut candidates: Vec<(User, Profile)> = state
            .users
            .values()
            .filter_map(|u| state.profiles.get(&u.id).map(|p| (u, p)))
            .filter(|(u, p)| matches_candidate_filter(u, p, filter))
            .map(|(u, p)| (u.clone(), p.clone()))
            .collect();

        candidates.sort_by_key(|(u, _)| u.id);
        Ok(candidates)
    }

    async fn create_pairing(&self, pairing: NewPairing) -> Result<Pairing, StoreError> {
        let mut state = self.state.lock().await;

        for user_id in [pairing.user1_id, pairing.user2_id] {
            if has_active_pairing(&state, user_id) {
                return Err(StoreError::Conflict(format!(
                    "user {} already has an active pairing",
                    user_id
                )));
            }
        }

        let created = Pairing {
            id: Uuid::new_v4(),
            user1_id: pairing.user1_id,
            user2_id: pairing.user2_id,
            status: PairingStatus::Active,
            created_at: Utc::now(),
            ended_at: None,
            anon_id_1: pairing.anon_id_1,
            anon_id_2: pairing.anon_id_2,
        };
        state.pairings.push(created.clone());
        Ok(created)
    }

    async fn end_pairing(
        &self,
        pairing_id: PairingId,
        status: PairingStatus,
        ended_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let pairing = state
            .pairings
            .iter_mut()
            .find(|p| p.id == pairing_id)
            .ok_or_else(|| StoreError::NotFound(format!("pairing {}", pairing_id)))?;

        pairing.status = status;
        pairing.ended_at = Some(ended_at);
        Ok(())
    }

    async fn find_active_pairing(&self, user_id: UserId) -> Result<Option<Pairing>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .pairings
            .iter()
            .find(|p| p.is_active() && p.involves(user_id))
            .cloned())
    }

    async fn pairing_history(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<Pairing>, StoreError> {
        let state = self.state.lock().await;
        let mut history: Vec<Pairing> = state
            .pairings
            .iter()
            .filter(|p| p.involves(user_id))
            .cloned()
            .collect();

        history.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        history.truncate(limit);
        Ok(history)
    }

    async fn create_block(&self, blocker_id: UserId, blocked_id: UserId) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let exists = state
            .blocks
            .iter()
            .any(|b| b.blocker_id == blocker_id && b.blocked_id == blocked_id);

        if !exists {
            state.blocks.push(Block {
                blocker_id,
                blocked_id,
                created_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn record_message(
        &self,
        pairing_id: PairingId,
        sender_id: UserId,
        receiver_id: UserId,
        content: &str,
    ) -> Result<Message, StoreError> {
        let mut state = self.state.lock().await;
        if !state.pairings.iter().any(|p| p.id == pairing_id) {
            return Err(StoreError::NotFound(format!("pairing {}", pairing_id)));
        }

        state.next_message_id += 1;
        let message = Message {
            id: state.next_message_id,
            pairing_id,
            sender_id,
            receiver_id,
            content: content.to_string(),
            is_read: false,
            created_at: Utc::now(),
        };
        state.messages.push(message.clone());
        Ok(message)
    }

    async fn end_inactive_pairings(
        &self,
        created_before: DateTime<Utc>,
        ended_at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut state = self.state.lock().await;
        let with_messages: HashSet<PairingId> =
            state.messages.iter().map(|m| m.pairing_id).collect();

        let mut count = 0;
        for pairing in state.pairings.iter_mut() {
            if pairing.is_active()
                && pairing.created_at < created_before
                && !with_messages.contains(&pairing.id)
            {
                pairing.status = PairingStatus::Ended;
                pairing.ended_at = Some(ended_at);
                count += 1;
            }
        }
        Ok(count)
    }

    async fn increment_gender_views(&self, user_id: UserId) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", user_id)))?;
        user.gender_views_used += 1;
        Ok(())
    }

    async fn downgrade_subscription(&self, user_id: UserId) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", user_id)))?;
        user.subscription = SubscriptionTier::Free;
        user.premium_expires_at = None;
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
