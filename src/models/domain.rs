use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Internal user identifier
pub type UserId = i64;

/// Pairing identifier
pub type PairingId = Uuid;

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Banned,
}

/// Privilege claim, assigned once when the account is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Owner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subscription_tier", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Free,
    Premium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "gender", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}


/// Registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(rename = "externalId")]
    pub external_id: String,
    pub status: UserStatus,
    #[serde(rename = "isRegistered")]
    pub is_registered: bool,
    pub role: Role,
    pub subscription: SubscriptionTier,
    #[serde(rename = "premiumExpiresAt", default)]
    pub premium_expires_at: Option<DateTime<Utc>>,
    #[serde(rename = "genderViewsUsed", default)]
    pub gender_views_used: u32,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Registered and active users are the only ones that take part in matching
    pub fn can_participate(&self) -> bool {
        self.is_registered && self.status == UserStatus::Active
    }

    pub fn is_owner(&self) -> bool {
        self.role == Role::Owner
    }
}

/// Matching profile, owned one-to-one by a [`User`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    pub age: u8,
    pub gender: Gender,
    #[serde(rename = "lookingFor")]
    pub looking_for: Gender,
    #[serde(rename = "minAge")]
    pub min_age: u8,
    #[serde(rename = "maxAge")]
    pub max_age: u8,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    /// Comma-delimited list as entered by the user
    #[serde(default)]
    pub interests: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Whether `age` falls inside this profile's preferred range
    #[inline]
    pub fn accepts_age(&self, age: u8) -> bool {
        age >= self.min_age && age <= self.max_age
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "pairing_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PairingStatus {
    Pending,
    Active,
    Ended,
    Blocked,
}

/// A conversation link between two users
///
/// `user1`/`user2` order carries no meaning; each side gets its own
/// anonymous display identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pairing {
    pub id: PairingId,
    #[serde(rename = "user1Id")]
    pub user1_id: UserId,
    #[serde(rename = "user2Id")]
    pub user2_id: UserId,
    pub status: PairingStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "endedAt", default)]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(rename = "anonId1")]
    pub anon_id_1: String,
    #[serde(rename = "anonId2")]
    pub anon_id_2: String,
}

impl Pairing {
    pub fn involves(&self, user_id: UserId) -> bool {
        self.user1_id == user_id || self.user2_id == user_id
    }

    /// The other party, or `None` if `user_id` is not part of this pairing
    pub fn partner_of(&self, user_id: UserId) -> Option<UserId> {
        if self.user1_id == user_id {
            Some(self.user2_id)
        } else if self.user2_id == user_id {
            Some(self.user1_id)
        } else {
            None
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == PairingStatus::Active
    }
}

/// Input for creating a pairing
#[derive(Debug, Clone)]
pub struct NewPairing {
    pub user1_id: UserId,
    pub user2_id: UserId,
    pub anon_id_1: String,
    pub anon_id_2: String,
}

/// Directed block relation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "blockerId")]
    pub blocker_id: UserId,
    #[serde(rename = "blockedId")]
    pub blocked_id: UserId,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Chat message inside a pairing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    #[serde(rename = "pairingId")]
    pub pairing_id: PairingId,
    #[serde(rename = "senderId")]
    pub sender_id: UserId,
    #[serde(rename = "receiverId")]
    pub receiver_id: UserId,
    pub content: String,
    #[serde(rename = "isRead")]
    pub is_read: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Pre-filter pushed down to the store when listing candidates
///
/// Mirrors the registration, status, age and gender predicates so the store
/// can narrow the pool before the matcher applies the full eligibility check.
#[derive(Debug, Clone)]
pub struct CandidateFilter {
    pub exclude_user_id: UserId,
    /// Requester's own age, which the candidate's range must accept
    pub requester_age: u8,
    pub min_age: u8,
    pub max_age: u8,
    /// Candidate gender must equal this (requester's looking-for)
    pub gender: Gender,
    /// Candidate looking-for must equal this (requester's gender)
    pub looking_for: Gender,
}

/// Candidate that passed eligibility, with its compatibility score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    pub score: u32,
}
