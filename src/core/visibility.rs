use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::models::{Role, SubscriptionTier, User};

/// Outcome of the partner gender visibility gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Granted(Grant),
    Denied(Denial),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    Owner,
    Premium,
    /// `view` is the 1-based number of this free view out of `limit`
    FreeTier { view: u32, limit: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// Premium lapsed; the account should be downgraded to free
    PremiumExpired,
    PremiumRequired,
}

impl Visibility {
    pub fn is_granted(&self) -> bool {
        matches!(self, Visibility::Granted(_))
    }

    /// Granted views that draw from the free quota
    pub fn consumes_free_view(&self) -> bool {
        matches!(self, Visibility::Granted(Grant::FreeTier { .. }))
    }

    pub fn reason(&self) -> String {
        match self {
            Visibility::Granted(Grant::Owner) => "Owner privileges".to_string(),
            Visibility::Granted(Grant::Premium) => "Premium active".to_string(),
            Visibility::Granted(Grant::FreeTier { view, limit }) => {
                format!("Free tier ({}/{})", view, limit)
            }
            Visibility::Denied(Denial::PremiumExpired) => "Premium expired".to_string(),
            Visibility::Denied(Denial::PremiumRequired) => "Premium required".to_string(),
        }
    }
}

/// Decide whether `viewer` may see their partner's gender
///
/// Pure: callers apply the side effects (quota increment, downgrade).
pub fn gender_visibility(viewer: &User, free_views: u32, now: DateTime<Utc>) -> Visibility {
    if viewer.is_owner() {
        return Visibility::Granted(Grant::Owner);
    }

    match viewer.subscription {
        SubscriptionTier::Premium => match viewer.premium_expires_at {
            Some(expires_at) if expires_at > now => Visibility::Granted(Grant::Premium),
            _ => Visibility::Denied(Denial::PremiumExpired),
        },
        SubscriptionTier::Free if viewer.gender_views_used < free_views => {
            Visibility::Granted(Grant::FreeTier {
                view: viewer.gender_views_used + 1,
                limit: free_views,
            })
        }
        SubscriptionTier::Free => Visibility::Denied(Denial::PremiumRequired),
    }
}

/// Role claim for a new account, from the configured owner ids
pub fn role_for(external_id: &str, owner_ids: &HashSet<String>) -> Role {
    if owner_ids.contains(external_id) {
        Role::Owner
    } else {
        Role::Member
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserStatus;
    use chrono::Duration;

    fn create_viewer(role: Role, subscription: SubscriptionTier, views: u32) -> User {
        User {
            id: 1,
            external_id: "1001".to_string(),
            status: UserStatus::Active,
            is_registered: true,
            role,
            subscription,
            premium_expires_at: None,
            gender_views_used: views,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_owner_always_sees() {
        let owner = create_viewer(Role::Owner, SubscriptionTier::Free, 1000);
        assert_eq!(gender_visibility(&owner, 5, Utc::now()), Visibility::Granted(Grant::Owner));
    }

    #[test]
    fn test_free_quota() {
        let now = Utc::now();
        let fresh = create_viewer(Role::Member, SubscriptionTier::Free, 0);
        let visibility = gender_visibility(&fresh, 5, now);
        assert_eq!(visibility, Visibility::Granted(Grant::FreeTier { view: 1, limit: 5 }));
        assert!(visibility.consumes_free_view());
        assert_eq!(visibility.reason(), "Free tier (1/5)");

        let spent = create_viewer(Role::Member, SubscriptionTier::Free, 5);
        assert_eq!(
            gender_visibility(&spent, 5, now),
            Visibility::Denied(Denial::PremiumRequired)
        );
    }

    #[test]
    fn test_premium_expiry() {
        let now = Utc::now();
        let mut premium = create_viewer(Role::Member, SubscriptionTier::Premium, 0);

        premium.premium_expires_at = Some(now + Duration::days(3));
        let visibility = gender_visibility(&premium, 5, now);
        assert_eq!(visibility, Visibility::Granted(Grant::Premium));
        assert!(!visibility.consumes_free_view());

        premium.premium_expires_at = Some(now - Duration::days(1));
        assert_eq!(
            gender_visibility(&premium, 5, now),
            Visibility::Denied(Denial::PremiumExpired)
        );

        premium.premium_expires_at = None;
        assert!(!gender_visibility(&premium, 5, now).is_granted());
    }

    #[test]
    fn test_role_claim_from_owner_set() {
        let owners: HashSet<String> = ["5518634633".to_string()].into_iter().collect();
        assert_eq!(role_for("5518634633", &owners), Role::Owner);
        assert_eq!(role_for("42", &owners), Role::Member);
    }
}
