// Unit tests for Veil Match

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use veil_match::core::{
    calculate_compatibility_score, compatibility_summary, filters::ages_compatible,
    genders_compatible, is_eligible, scoring::raw_compatibility_score, shared_interests,
    AnonIdGenerator, Exclusions, Matcher,
};
use veil_match::models::{Gender, Profile, Role, SubscriptionTier, User, UserId, UserStatus};

fn user(id: UserId) -> User {
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

fn profile(user_id: UserId, age: u8, min_age: u8, max_age: u8, gender: Gender, looking_for: Gender) -> Profile {
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
    Profile {
        city: Some("Kyiv".to_string()),
        bio: Some("I like long walks and longer books".to_string()),
        interests: Some("music, hiking, chess, cooking".to_string()),
        ..profile(1, 25, 20, 30, Gender::Male, Gender::Female)
    }
}

fn ideal_candidate() -> Profile {
    Profile {
        city: Some("KYIV".to_string()),
        bio: Some("Coffee, cats and conversation all day".to_string()),
        interests: Some("Chess,music , hiking, painting".to_string()),
        ..profile(2, 27, 22, 32, Gender::Female, Gender::Male)
    }
}

#[test]
fn test_full_bonus_profile_is_clamped() {
    let a = requester();
    let b = ideal_candidate();

    // 50 + 20 city + 15 age + 15 interests + 10 bios
    assert_eq!(raw_compatibility_score(&a, &b), 110);
    assert_eq!(calculate_compatibility_score(&a, &b), 100);
}

#[test]
fn test_score_is_symmetric() {
    let a = requester();
    let mut b = ideal_candidate();
    b.city = Some("Lviv".to_string());
    b.age = 33;

    assert_eq!(
        calculate_compatibility_score(&a, &b),
        calculate_compatibility_score(&b, &a)
    );
    assert_eq!(shared_interests(&a, &b), shared_interests(&b, &a));
}

#[test]
fn test_score_bounds() {
    let bare_a = profile(1, 18, 18, 99, Gender::Male, Gender::Female);
    let bare_b = profile(2, 99, 18, 99, Gender::Female, Gender::Male);

    assert_eq!(calculate_compatibility_score(&bare_a, &bare_b), 50);
    assert!(calculate_compatibility_score(&requester(), &ideal_candidate()) <= 100);
}

#[test]
fn test_age_gap_bands() {
    let a = profile(1, 30, 18, 99, Gender::Male, Gender::Female);
    let score_at = |age: u8| {
        let b = profile(2, age, 18, 99, Gender::Female, Gender::Male);
        calculate_compatibility_score(&a, &b)
    };

    assert_eq!(score_at(30), 65);
    assert_eq!(score_at(28), 65);
    assert_eq!(score_at(27), 60);
    assert_eq!(score_at(25), 60);
    assert_eq!(score_at(40), 55);
    assert_eq!(score_at(41), 50);
}

#[test]
fn test_short_bio_earns_nothing() {
    let mut a = profile(1, 30, 18, 99, Gender::Male, Gender::Female);
    let mut b = profile(2, 45, 18, 99, Gender::Female, Gender::Male);
    a.bio = Some("x".repeat(21));
    b.bio = Some("x".repeat(20));

    assert_eq!(calculate_compatibility_score(&a, &b), 50);
}

#[test]
fn test_compatibility_is_bidirectional() {
    let a = profile(1, 25, 20, 30, Gender::Male, Gender::Female);
    // a accepts b's age, but b does not accept a's
    let b = profile(2, 27, 28, 35, Gender::Female, Gender::Male);
    assert!(!ages_compatible(&a, &b));
    assert!(!ages_compatible(&b, &a));

    let c = profile(3, 27, 22, 32, Gender::Female, Gender::Female);
    assert!(!genders_compatible(&a, &c));
}

#[test]
fn test_eligibility_rejects_inactive_and_unregistered() {
    let a = requester();
    let b = ideal_candidate();
    let exclusions = Exclusions::default();

    assert!(is_eligible(1, &a, &user(2), &b, &exclusions));

    let mut banned = user(2);
    banned.status = UserStatus::Banned;
    assert!(!is_eligible(1, &a, &banned, &b, &exclusions));

    let mut unregistered = user(2);
    unregistered.is_registered = false;
    assert!(!is_eligible(1, &a, &unregistered, &b, &exclusions));

    assert!(!is_eligible(2, &b, &user(2), &b, &exclusions));
}

#[test]
fn test_recent_partner_is_never_chosen() {
    let matcher = Matcher::default();
    let a = requester();
    let candidates = vec![(user(2), ideal_candidate())];
    let exclusions = Exclusions {
        recent_partners: [2].into_iter().collect(),
        ..Exclusions::default()
    };

    let mut rng = StdRng::seed_from_u64(3);
    let result = matcher.select(1, &a, &candidates, &exclusions, &mut rng);
    assert!(result.chosen.is_none());
    assert_eq!(result.total_candidates, 1);
    assert_eq!(result.eligible, 0);
}

#[test]
fn test_two_candidate_pick_is_roughly_uniform() {
    let matcher = Matcher::default();
    let a = profile(1, 30, 18, 99, Gender::Male, Gender::Female);

    // Both six years apart with one shared interest; only `high` shares the city
    let high = Profile {
        city: Some("Odesa".to_string()),
        interests: Some("jazz".to_string()),
        ..profile(2, 36, 18, 99, Gender::Female, Gender::Male)
    };
    let low = Profile {
        interests: Some("jazz".to_string()),
        ..profile(3, 36, 18, 99, Gender::Female, Gender::Male)
    };
    let a = Profile {
        city: Some("Odesa".to_string()),
        interests: Some("jazz".to_string()),
        ..a
    };
    assert_eq!(calculate_compatibility_score(&a, &high), 80);
    assert_eq!(calculate_compatibility_score(&a, &low), 60);

    let candidates = vec![(user(2), high), (user(3), low)];
    let mut rng = StdRng::seed_from_u64(11);
    let mut counts: HashMap<UserId, u32> = HashMap::new();

    for _ in 0..2000 {
        let result = matcher.select(1, &a, &candidates, &Exclusions::default(), &mut rng);
        let chosen = result.chosen.expect("eligible set is not empty");
        *counts.entry(chosen.user_id).or_default() += 1;
    }

    assert_eq!(counts.len(), 2);
    for id in [2, 3] {
        let n = counts[&id];
        assert!((850..=1150).contains(&n), "user {} chosen {} times", id, n);
    }
}

#[test]
fn test_summary_mentions_shared_interests() {
    let summary = compatibility_summary(&requester(), &ideal_candidate());
    assert!(summary.contains("chess"));
    assert!(!summary.is_empty());
}

#[test]
fn test_anon_ids_differ_within_a_pair() {
    let generator = AnonIdGenerator::default();
    let mut rng = StdRng::seed_from_u64(5);

    for _ in 0..100 {
        let (a, b) = generator.generate_pair(&mut rng);
        assert_ne!(a, b);
        assert_eq!(a.len(), "User".len() + 8);
    }
}
