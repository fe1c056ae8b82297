// Core algorithm exports
pub mod anon_id;
pub mod filters;
pub mod matcher;
pub mod scoring;
pub mod visibility;

pub use anon_id::{AnonIdGenerator, MAX_ANON_ID_LEN};
pub use filters::{
    ages_compatible, candidate_filter, genders_compatible, is_eligible, matches_candidate_filter,
    validate_profile, Exclusions, ProfileLimits,
};
pub use matcher::{MatchResult, Matcher};
pub use scoring::{calculate_compatibility_score, compatibility_summary, shared_interests};
pub use visibility::{gender_visibility, role_for, Visibility};
