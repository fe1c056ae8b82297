use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use thiserror::Error;

use crate::core::{
    compatibility_summary, filters::candidate_filter, gender_visibility, role_for,
    validate_profile, visibility::Denial, AnonIdGenerator, Exclusions, Matcher, ProfileLimits,
    Visibility,
};
use crate::models::{
    Gender, Message, NewPairing, Pairing, PairingStatus, Profile, ScoredCandidate, User, UserId,
};
use crate::services::store::{PairingStore, StoreError};

pub const MAX_MESSAGE_CHARS: usize = 1000;

/// Errors surfaced by pairing operations other than `find_match`
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("User {0} has no active pairing")]
    NoActivePairing(UserId),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),
}

/// Tunables for the pairing service
#[derive(Debug, Clone)]
pub struct MatchPolicy {
    /// Minimum time before the same two users may be paired again
    pub recency_window: Duration,
    /// Free partner gender reveals before premium is required
    pub free_gender_views: u32,
    pub profile_limits: ProfileLimits,
    /// External ids that receive the owner role when registering
    pub owner_ids: HashSet<String>,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            recency_window: Duration::days(7),
            free_gender_views: 5,
            profile_limits: ProfileLimits::default(),
            owner_ids: HashSet::new(),
        }
    }
}

/// A pairing created by `find_match`, with what the caller needs to notify both sides
#[derive(Debug, Clone)]
pub struct MatchFound {
    pub pairing: Pairing,
    pub requester_id: UserId,
    pub partner_id: UserId,
    pub score: u32,
    pub summary: String,
}

impl MatchFound {
    pub fn requester_anon_id(&self) -> &str {
        &self.pairing.anon_id_1
    }

    pub fn partner_anon_id(&self) -> &str {
        &self.pairing.anon_id_2
    }
}

/// Why `try_find_match` produced no pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoMatch {
    /// Requester unknown, unregistered, inactive or without a profile
    NotReady,
    /// Requester already has an active pairing
    AlreadyPaired,
    NoEligibleCandidates,
    /// Another writer paired one of the two users first
    LostRace,
}

/// A pairing closed by one of its parties
#[derive(Debug, Clone)]
pub struct PairingClosed {
    pub pairing: Pairing,
    pub partner_id: UserId,
    /// User-initiated closes always notify the other side
    pub notify_partner: bool,
}

/// Result of the partner gender gate
#[derive(Debug, Clone)]
pub struct GenderReveal {
    pub visibility: Visibility,
    pub gender: Option<Gender>,
}

/// Pairing orchestrator - reads state from the store, runs the matcher, writes the pairing
#[derive(Clone)]
pub struct MatchService {
    store: Arc<dyn PairingStore>,
    matcher: Matcher,
    anon_ids: AnonIdGenerator,
    policy: MatchPolicy,
}

impl MatchService {
    pub fn new(
        store: Arc<dyn PairingStore>,
        matcher: Matcher,
        anon_ids: AnonIdGenerator,
        policy: MatchPolicy,
    ) -> Self {
        Self {
            store,
            matcher,
            anon_ids,
            policy,
        }
    }

    pub fn store(&self) -> &Arc<dyn PairingStore> {
        &self.store
    }

    /// Find a partner for `user_id` and create an active pairing
    ///
    /// Every failure is reported as `None`. Storage faults are logged at
    /// error level with the failing operation so they can be told apart
    /// from an empty candidate pool.
    pub async fn find_match(&self, user_id: UserId) -> Option<MatchFound> {
        match self.try_find_match(user_id).await {
            Ok(Ok(found)) => Some(found),
            Ok(Err(reason)) => {
                match reason {
                    NoMatch::LostRace => tracing::warn!(
                        user_id,
                        "Pairing creation lost a concurrent race, reporting no match"
                    ),
                    _ => tracing::info!(user_id, ?reason, "No match found"),
                }
                None
            }
            Err(FindError { operation, source }) => {
                tracing::error!(user_id, operation, error = %source, "Storage fault while finding match");
                None
            }
        }
    }

    /// Like [`find_match`](Self::find_match) but keeps the reason for a miss
    pub async fn try_find_match(&self, user_id: UserId) -> Result<Result<MatchFound, NoMatch>, FindError> {
        let Some((user, requester)) = self
            .store
            .get_user_with_profile(user_id)
            .await
            .map_err(FindError::at("get_user_with_profile"))?
        else {
            return Ok(Err(NoMatch::NotReady));
        };

        if !user.can_participate() {
            return Ok(Err(NoMatch::NotReady));
        }

        let in_active_pairing = self
            .store
            .list_users_in_active_pairing()
            .await
            .map_err(FindError::at("list_users_in_active_pairing"))?;

        if in_active_pairing.contains(&user_id) {
            return Ok(Err(NoMatch::AlreadyPaired));
        }

        let exclusions = Exclusions {
            blocked: self
                .store
                .list_blocked_pairs(user_id)
                .await
                .map_err(FindError::at("list_blocked_pairs"))?,
            recent_partners: self
                .store
                .list_recent_pairing_partners(user_id, Utc::now() - self.policy.recency_window)
                .await
                .map_err(FindError::at("list_recent_pairing_partners"))?,
            in_active_pairing,
        };

        let candidates = self
            .store
            .query_candidates(&candidate_filter(user_id, &requester))
            .await
            .map_err(FindError::at("query_candidates"))?;

        let Some((chosen, anon_id_1, anon_id_2)) = self.pick(user_id, &requester, &candidates, &exclusions) else {
            return Ok(Err(NoMatch::NoEligibleCandidates));
        };

        let pairing = match self
            .store
            .create_pairing(NewPairing {
                user1_id: user_id,
                user2_id: chosen.user_id,
                anon_id_1,
                anon_id_2,
            })
            .await
        {
            Ok(pairing) => pairing,
            Err(StoreError::Conflict(_)) => return Ok(Err(NoMatch::LostRace)),
            Err(e) => return Err(FindError::at("create_pairing")(e)),
        };

        let summary = candidates
            .iter()
            .find(|(u, _)| u.id == chosen.user_id)
            .map(|(_, partner)| compatibility_summary(&requester, partner))
            .unwrap_or_default();

        tracing::info!(
            user_id,
            partner_id = chosen.user_id,
            pairing_id = %pairing.id,
            score = chosen.score,
            "Match created"
        );

        Ok(Ok(MatchFound {
            pairing,
            requester_id: user_id,
            partner_id: chosen.user_id,
            score: chosen.score,
            summary,
        }))
    }

    /// Rank, shortlist and draw; also mints both anonymous ids
    fn pick(
        &self,
        user_id: UserId,
        requester: &Profile,
        candidates: &[(User, Profile)],
        exclusions: &Exclusions,
    ) -> Option<(ScoredCandidate, String, String)> {
        let mut rng = rand::thread_rng();
        let result = self
            .matcher
            .select(user_id, requester, candidates, exclusions, &mut rng);

        tracing::debug!(
            user_id,
            total_candidates = result.total_candidates,
            eligible = result.eligible,
            "Ranked candidates"
        );

        let chosen = result.chosen?;
        let (anon_id_1, anon_id_2) = self.anon_ids.generate_pair(&mut rng);
        Some((chosen, anon_id_1, anon_id_2))
    }

    /// End active pairings without messages that are older than `max_inactive`
    ///
    /// Returns the number of pairings ended; storage faults are logged and
    /// count as zero. Partners are not notified.
    pub async fn end_inactive_pairings(&self, max_inactive: Duration) -> u64 {
        let now = Utc::now();
        match self
            .store
            .end_inactive_pairings(now - max_inactive, now)
            .await
        {
            Ok(count) => {
                if count > 0 {
                    tracing::info!(count, "Ended inactive pairings");
                }
                count
            }
            Err(e) => {
                tracing::error!(operation = "end_inactive_pairings", error = %e, "Inactivity sweep failed");
                0
            }
        }
    }

    /// End the user's active pairing at their request
    pub async fn stop_pairing(&self, user_id: UserId) -> Result<PairingClosed, MatchError> {
        self.close_active(user_id, PairingStatus::Ended).await
    }

    /// Block the current partner and close the pairing as `blocked`
    pub async fn block_partner(&self, user_id: UserId) -> Result<PairingClosed, MatchError> {
        let pairing = self
            .store
            .find_active_pairing(user_id)
            .await?
            .ok_or(MatchError::NoActivePairing(user_id))?;
        let partner_id = pairing
            .partner_of(user_id)
            .ok_or(MatchError::NoActivePairing(user_id))?;

        self.store.create_block(user_id, partner_id).await?;
        self.close(user_id, pairing, partner_id, PairingStatus::Blocked).await
    }

    async fn close_active(
        &self,
        user_id: UserId,
        status: PairingStatus,
    ) -> Result<PairingClosed, MatchError> {
        let pairing = self
            .store
            .find_active_pairing(user_id)
            .await?
            .ok_or(MatchError::NoActivePairing(user_id))?;
        let partner_id = pairing
            .partner_of(user_id)
            .ok_or(MatchError::NoActivePairing(user_id))?;

        self.close(user_id, pairing, partner_id, status).await
    }

    async fn close(
        &self,
        user_id: UserId,
        mut pairing: Pairing,
        partner_id: UserId,
        status: PairingStatus,
    ) -> Result<PairingClosed, MatchError> {
        let ended_at = Utc::now();
        self.store.end_pairing(pairing.id, status, ended_at).await?;

        pairing.status = status;
        pairing.ended_at = Some(ended_at);

        tracing::info!(user_id, partner_id, pairing_id = %pairing.id, ?status, "Pairing closed");

        Ok(PairingClosed {
            pairing,
            partner_id,
            notify_partner: true,
        })
    }

    /// Most recent pairings involving `user_id`
    pub async fn match_history(&self, user_id: UserId, limit: usize) -> Result<Vec<Pairing>, MatchError> {
        Ok(self.store.pairing_history(user_id, limit).await?)
    }

    /// Create or fetch the account, assigning the owner role from configuration
    pub async fn register_user(&self, external_id: &str) -> Result<User, MatchError> {
        let role = role_for(external_id, &self.policy.owner_ids);
        Ok(self.store.register_user(external_id, role).await?)
    }

    /// Validate and store a profile, marking its user registered
    pub async fn save_profile(&self, profile: Profile) -> Result<Profile, MatchError> {
        validate_profile(&profile, &self.policy.profile_limits).map_err(MatchError::InvalidProfile)?;

        match self.store.save_profile(&profile).await {
            Err(StoreError::NotFound(_)) => Err(MatchError::UserNotFound(profile.user_id)),
            other => Ok(other?),
        }
    }

    /// Store a chat message on the sender's active pairing
    pub async fn record_message(&self, sender_id: UserId, content: &str) -> Result<Message, MatchError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(MatchError::InvalidMessage("message is empty".to_string()));
        }
        if content.chars().count() > MAX_MESSAGE_CHARS {
            return Err(MatchError::InvalidMessage(format!(
                "message is longer than {} characters",
                MAX_MESSAGE_CHARS
            )));
        }

        let pairing = self
            .store
            .find_active_pairing(sender_id)
            .await?
            .ok_or(MatchError::NoActivePairing(sender_id))?;
        let receiver_id = pairing
            .partner_of(sender_id)
            .ok_or(MatchError::NoActivePairing(sender_id))?;

        Ok(self
            .store
            .record_message(pairing.id, sender_id, receiver_id, content)
            .await?)
    }

    /// Apply the gender visibility gate for the viewer's current partner
    ///
    /// A granted free-tier view is charged against the viewer's quota; a
    /// lapsed premium subscription is downgraded.
    pub async fn reveal_partner_gender(&self, viewer_id: UserId) -> Result<GenderReveal, MatchError> {
        let viewer = self
            .store
            .get_user(viewer_id)
            .await?
            .ok_or(MatchError::UserNotFound(viewer_id))?;

        let pairing = self
            .store
            .find_active_pairing(viewer_id)
            .await?
            .ok_or(MatchError::NoActivePairing(viewer_id))?;
        let partner_id = pairing
            .partner_of(viewer_id)
            .ok_or(MatchError::NoActivePairing(viewer_id))?;

        let visibility = gender_visibility(&viewer, self.policy.free_gender_views, Utc::now());

        if visibility == Visibility::Denied(Denial::PremiumExpired) {
            self.store.downgrade_subscription(viewer_id).await?;
        }

        if !visibility.is_granted() {
            return Ok(GenderReveal {
                visibility,
                gender: None,
            });
        }

        let gender = self
            .store
            .get_user_with_profile(partner_id)
            .await?
            .map(|(_, profile)| profile.gender);

        if visibility.consumes_free_view() && gender.is_some() {
            self.store.increment_gender_views(viewer_id).await?;
        }

        Ok(GenderReveal { visibility, gender })
    }
}

/// Storage fault during `find_match`, tagged with the failing operation
#[derive(Debug, Error)]
#[error("{operation} failed: {source}")]
pub struct FindError {
    pub operation: &'static str,
    #[source]
    pub source: StoreError,
}

impl FindError {
    fn at(operation: &'static str) -> impl Fn(StoreError) -> FindError {
        move |source| FindError { operation, source }
    }
}
