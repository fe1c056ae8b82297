use std::collections::HashSet;

use crate::models::Profile;

/// Awarded for passing the eligibility filter at all
pub const BASE_SCORE: u32 = 50;
pub const SAME_CITY_BONUS: u32 = 20;
pub const SHARED_INTEREST_POINTS: u32 = 5;
pub const BIO_BONUS: u32 = 10;
/// Bios must be strictly longer than this to count
pub const MIN_BIO_CHARS: usize = 20;
pub const MAX_SCORE: u32 = 100;

/// Calculate the compatibility score (50-100) of two eligible profiles
///
/// Scoring formula:
/// score = min(100,
///     50                                  # base
///   + 20 if same city (case-insensitive)
///   + 15 / 10 / 5 for age gap <= 2 / <= 5 / <= 10
///   + 5 per shared interest
///   + 10 if both bios are longer than 20 characters
/// )
pub fn calculate_compatibility_score(a: &Profile, b: &Profile) -> u32 {
    raw_compatibility_score(a, b).min(MAX_SCORE)
}

/// Score before the 100 point ceiling is applied
pub fn raw_compatibility_score(a: &Profile, b: &Profile) -> u32 {
    let mut score = BASE_SCORE;

    if same_city(a, b) {
        score += SAME_CITY_BONUS;
    }

    score += age_gap_bonus(a.age, b.age);

    score += shared_interests(a, b).len() as u32 * SHARED_INTEREST_POINTS;

    if has_long_bio(a) && has_long_bio(b) {
        score += BIO_BONUS;
    }

    score
}

#[inline]
fn age_gap_bonus(a: u8, b: u8) -> u32 {
    match a.abs_diff(b) {
        0..=2 => 15,
        3..=5 => 10,
        6..=10 => 5,
        _ => 0,
    }
}

/// Both cities present and equal ignoring case
#[inline]
pub fn same_city(a: &Profile, b: &Profile) -> bool {
    match (non_empty(&a.city), non_empty(&b.city)) {
        (Some(x), Some(y)) => x.to_lowercase() == y.to_lowercase(),
        _ => false,
    }
}

#[inline]
fn has_long_bio(profile: &Profile) -> bool {
    profile
        .bio
        .as_deref()
        .map(|bio| bio.chars().count() > MIN_BIO_CHARS)
        .unwrap_or(false)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Normalized interest set: comma split, trimmed, lowercased
pub fn interest_set(interests: Option<&str>) -> HashSet<String> {
    interests
        .map(|raw| {
            raw.split(',')
                .map(|interest| interest.trim().to_lowercase())
                .filter(|interest| !interest.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Interests present in both profiles, sorted for stable output
pub fn shared_interests(a: &Profile, b: &Profile) -> Vec<String> {
    let left = interest_set(a.interests.as_deref());
    let right = interest_set(b.interests.as_deref());

    let mut shared: Vec<String> = left.intersection(&right).cloned().collect();
    shared.sort();
    shared
}

/// Short description of what two profiles have in common
pub fn compatibility_summary(a: &Profile, b: &Profile) -> String {
    let mut points = Vec::new();

    match a.age.abs_diff(b.age) {
        0..=2 => points.push("Very close in age".to_string()),
        3..=5 => points.push("Similar age range".to_string()),
        _ => {}
    }

    if same_city(a, b) {
        if let Some(city) = non_empty(&a.city) {
            points.push(format!("Both from {}", city));
        }
    }

    let shared = shared_interests(a, b);
    match shared.len() {
        0 => {}
        1 => points.push(format!("Shared interest: {}", shared[0])),
        _ => points.push(format!("Shared interests: {}", shared[..2].join(", "))),
    }

    if points.is_empty() {
        "You both meet each other's preferences!".to_string()
    } else {
        format!("You have: {}", points.join(", "))
    }
}
