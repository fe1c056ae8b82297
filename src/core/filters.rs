use std::collections::HashSet;

use crate::models::{CandidateFilter, Profile, User, UserId};

/// Users that must never be offered to a given requester
///
/// Built from the store's block, recency and active-pairing queries before
/// candidates are scored.
#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    /// Blocked by the requester or blocking the requester
    pub blocked: HashSet<UserId>,
    /// Paired with the requester inside the recency window, any status
    pub recent_partners: HashSet<UserId>,
    /// Currently a party to an active pairing
    pub in_active_pairing: HashSet<UserId>,
}

impl Exclusions {
    #[inline]
    pub fn excludes(&self, user_id: UserId) -> bool {
        self.blocked.contains(&user_id)
            || self.recent_partners.contains(&user_id)
            || self.in_active_pairing.contains(&user_id)
    }
}

/// Each side's age lies inside the other side's preferred range
#[inline]
pub fn ages_compatible(a: &Profile, b: &Profile) -> bool {
    a.accepts_age(b.age) && b.accepts_age(a.age)
}

/// Each side is what the other is looking for
#[inline]
pub fn genders_compatible(a: &Profile, b: &Profile) -> bool {
    b.gender == a.looking_for && b.looking_for == a.gender
}

/// Full eligibility check for one candidate
///
/// The store pre-filter narrows the pool, but every predicate is applied
/// again here so the result does not depend on how faithful the store's
/// query was.
pub fn is_eligible(
    requester_id: UserId,
    requester: &Profile,
    candidate_user: &User,
    candidate: &Profile,
    exclusions: &Exclusions,
) -> bool {
    if candidate_user.id == requester_id || candidate.user_id != candidate_user.id {
        return false;
    }

    if !candidate_user.can_participate() {
        return false;
    }

    if !ages_compatible(requester, candidate) {
        return false;
    }

    if !genders_compatible(requester, candidate) {
        return false;
    }

    !exclusions.excludes(candidate_user.id)
}

/// Build the store-side pre-filter for a requester
pub fn candidate_filter(requester_id: UserId, requester: &Profile) -> CandidateFilter {
    CandidateFilter {
        exclude_user_id: requester_id,
        requester_age: requester.age,
        min_age: requester.min_age,
        max_age: requester.max_age,
        gender: requester.looking_for,
        looking_for: requester.gender,
    }
}

/// Whether a (user, profile) row satisfies the store pre-filter
///
/// Stores without a query language use this to evaluate [`CandidateFilter`].
#[inline]
pub fn matches_candidate_filter(user: &User, profile: &Profile, filter: &CandidateFilter) -> bool {
    user.id != filter.exclude_user_id
        && user.can_participate()
        && profile.age >= filter.min_age
        && profile.age <= filter.max_age
        && profile.accepts_age(filter.requester_age)
        && profile.gender == filter.gender
        && profile.looking_for == filter.looking_for
}

/// System-wide bounds on ages and free-text fields
#[derive(Debug, Clone, Copy)]
pub struct ProfileLimits {
    pub min_age: u8,
    pub max_age: u8,
    pub max_bio_len: usize,
    pub max_interests_len: usize,
    pub max_interests: usize,
    pub max_city_len: usize,
}

impl Default for ProfileLimits {
    fn default() -> Self {
        Self {
            min_age: 18,
            max_age: 99,
            max_bio_len: 500,
            max_interests_len: 200,
            max_interests: 10,
            max_city_len: 50,
        }
    }
}

/// Check profile invariants, returning a description of the first violation
pub fn validate_profile(profile: &Profile, limits: &ProfileLimits) -> Result<(), String> {
    let in_bounds = |age: u8| age >= limits.min_age && age <= limits.max_age;

    if !in_bounds(profile.age) {
        return Err(format!(
            "age must be between {} and {}",
            limits.min_age, limits.max_age
        ));
    }
    if !in_bounds(profile.min_age) || !in_bounds(profile.max_age) {
        return Err(format!(
            "preferred ages must be between {} and {}",
            limits.min_age, limits.max_age
        ));
    }
    if profile.min_age > profile.max_age {
        return Err("minimum preferred age exceeds maximum".to_string());
    }

    if let Some(bio) = &profile.bio {
        if bio.chars().count() > limits.max_bio_len {
            return Err(format!("bio is longer than {} characters", limits.max_bio_len));
        }
    }

    if let Some(city) = profile.city.as_deref().filter(|c| !c.trim().is_empty()) {
        if city.chars().count() > limits.max_city_len {
            return Err(format!("city is longer than {} characters", limits.max_city_len));
        }
        if !city.chars().all(|c| c.is_alphabetic() || c == ' ' || c == '-' || c == '\'') {
            return Err("city may only contain letters, spaces, hyphens and apostrophes".to_string());
        }
    }

    if let Some(interests) = profile.interests.as_deref().filter(|i| !i.trim().is_empty()) {
        if interests.chars().count() > limits.max_interests_len {
            return Err(format!(
                "interests are longer than {} characters",
                limits.max_interests_len
            ));
        }
        let items: Vec<&str> = interests.split(',').map(str::trim).collect();
        if items.len() > limits.max_interests {
            return Err(format!("at most {} interests are allowed", limits.max_interests));
        }
        for item in items {
            let len = item.chars().count();
            if !(2..=30).contains(&len) {
                return Err(format!("interest '{}' must be 2 to 30 characters", item));
            }
            if !item.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-') {
                return Err(format!("interest '{}' contains unsupported characters", item));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, Role, SubscriptionTier, UserStatus};
    use chrono::Utc;

    fn create_user(id: UserId) -> User {
        User {
            id,
            external_id: format!("ext-{}", id),
            status: UserStatus::Active,
            is_registered: true,
            role: Role::Member,
            subscription: SubscriptionTier::Free,
            premium_expires_at: None,
            gender_views_used: 0,
            created_at: Utc::now(),
        }
    }

    fn create_profile(
        user_id: UserId,
        age: u8,
        gender: Gender,
        looking_for: Gender,
        min_age: u8,
        max_age: u8,
    ) -> Profile {
        Profile {
            user_id,
            age,
            gender,
            looking_for,
            min_age,
            max_age,
            city: None,
            bio: None,
            interests: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn requester() -> Profile {
        create_profile(1, 25, Gender::Male, Gender::Female, 20, 30)
    }

    #[test]
    fn test_compatible_candidate_is_eligible() {
        let candidate = create_profile(2, 27, Gender::Female, Gender::Male, 22, 32);
        assert!(is_eligible(1, &requester(), &create_user(2), &candidate, &Exclusions::default()));
    }

    #[test]
    fn test_age_must_be_accepted_both_ways() {
        // Candidate fits requester's range, but requester (25) is too young for candidate
        let candidate = create_profile(2, 28, Gender::Female, Gender::Male, 26, 35);
        assert!(!ages_compatible(&requester(), &candidate));
        assert!(!is_eligible(1, &requester(), &create_user(2), &candidate, &Exclusions::default()));
    }

    #[test]
    fn test_gender_must_match_both_ways() {
        let wrong_looking_for = create_profile(2, 27, Gender::Female, Gender::Female, 20, 30);
        assert!(!genders_compatible(&requester(), &wrong_looking_for));

        let wrong_gender = create_profile(3, 27, Gender::Other, Gender::Male, 20, 30);
        assert!(!genders_compatible(&requester(), &wrong_gender));
    }

    #[test]
    fn test_self_is_never_eligible() {
        let me = create_profile(1, 25, Gender::Female, Gender::Female, 20, 30);
        let mine = create_profile(1, 25, Gender::Female, Gender::Female, 20, 30);
        assert!(!is_eligible(1, &me, &create_user(1), &mine, &Exclusions::default()));
    }

    #[test]
    fn test_inactive_or_unregistered_filtered() {
        let candidate = create_profile(2, 27, Gender::Female, Gender::Male, 20, 30);

        let mut banned = create_user(2);
        banned.status = UserStatus::Banned;
        assert!(!is_eligible(1, &requester(), &banned, &candidate, &Exclusions::default()));

        let mut unregistered = create_user(2);
        unregistered.is_registered = false;
        assert!(!is_eligible(1, &requester(), &unregistered, &candidate, &Exclusions::default()));
    }

    #[test]
    fn test_exclusions_apply() {
        let candidate = create_profile(2, 27, Gender::Female, Gender::Male, 20, 30);
        let user = create_user(2);

        for field in 0..3 {
            let mut exclusions = Exclusions::default();
            match field {
                0 => exclusions.blocked.insert(2),
                1 => exclusions.recent_partners.insert(2),
                _ => exclusions.in_active_pairing.insert(2),
            };
            assert!(!is_eligible(1, &requester(), &user, &candidate, &exclusions));
        }
    }

    #[test]
    fn test_candidate_filter_agrees_with_eligibility() {
        let filter = candidate_filter(1, &requester());
        let good = create_profile(2, 27, Gender::Female, Gender::Male, 22, 32);
        let too_old = create_profile(3, 31, Gender::Female, Gender::Male, 22, 32);

        assert!(matches_candidate_filter(&create_user(2), &good, &filter));
        assert!(!matches_candidate_filter(&create_user(3), &too_old, &filter));
    }

    #[test]
    fn test_validate_profile_ranges() {
        let limits = ProfileLimits::default();
        assert!(validate_profile(&requester(), &limits).is_ok());

        let inverted = create_profile(1, 25, Gender::Male, Gender::Female, 40, 30);
        assert!(validate_profile(&inverted, &limits).is_err());

        let too_young = create_profile(1, 17, Gender::Male, Gender::Female, 18, 30);
        assert!(validate_profile(&too_young, &limits).is_err());
    }

    #[test]
    fn test_validate_profile_interests() {
        let limits = ProfileLimits::default();
        let mut profile = requester();

        profile.interests = Some("music, hiking, board-games".to_string());
        assert!(validate_profile(&profile, &limits).is_ok());

        profile.interests = Some("music, x".to_string());
        assert!(validate_profile(&profile, &limits).is_err());

        profile.interests = Some("music, c++".to_string());
        assert!(validate_profile(&profile, &limits).is_err());
    }
}
