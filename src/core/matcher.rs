use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::{
    filters::{is_eligible, Exclusions},
    scoring::calculate_compatibility_score,
};
use crate::models::{Profile, ScoredCandidate, User, UserId};

pub const DEFAULT_SHORTLIST_SIZE: usize = 5;

/// Result of ranking and selection for one requester
#[derive(Debug)]
pub struct MatchResult {
    pub chosen: Option<ScoredCandidate>,
    /// Candidates returned by the store
    pub total_candidates: usize,
    /// Candidates left after the eligibility filter
    pub eligible: usize,
}

/// Selection engine - implements the eligibility, scoring and shortlist stages
///
/// # Pipeline Stages
/// 1. Eligibility filter (bidirectional age/gender, status, exclusions)
/// 2. Compatibility scoring
/// 3. Descending sort, top-K shortlist
/// 4. Uniform random pick from the shortlist
///
/// The matcher holds no state across calls and never touches storage.
#[derive(Debug, Clone)]
pub struct Matcher {
    shortlist_size: usize,
}

impl Matcher {
    pub fn new(shortlist_size: usize) -> Self {
        Self {
            shortlist_size: shortlist_size.max(1),
        }
    }

    pub fn shortlist_size(&self) -> usize {
        self.shortlist_size
    }

    /// Filter and score candidates, best first
    ///
    /// The sort is stable, so equal scores keep the store's order.
    pub fn rank(
        &self,
        requester_id: UserId,
        requester: &Profile,
        candidates: &[(User, Profile)],
        exclusions: &Exclusions,
    ) -> Vec<ScoredCandidate> {
        let mut ranked: Vec<ScoredCandidate> = candidates
            .iter()
            .filter(|(user, profile)| is_eligible(requester_id, requester, user, profile, exclusions))
            .map(|(user, profile)| ScoredCandidate {
                user_id: user.id,
                score: calculate_compatibility_score(requester, profile),
            })
            .collect();

        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked
    }

    /// The top-K slice of an already ranked list
    pub fn shortlist<'a>(&self, ranked: &'a [ScoredCandidate]) -> &'a [ScoredCandidate] {
        &ranked[..ranked.len().min(self.shortlist_size)]
    }

    /// Pick uniformly at random from the shortlist
    pub fn choose<R: Rng + ?Sized>(
        &self,
        ranked: &[ScoredCandidate],
        rng: &mut R,
    ) -> Option<ScoredCandidate> {
        self.shortlist(ranked).choose(rng).cloned()
    }

    /// Run the full pipeline for one requester
    pub fn select<R: Rng + ?Sized>(
        &self,
        requester_id: UserId,
        requester: &Profile,
        candidates: &[(User, Profile)],
        exclusions: &Exclusions,
        rng: &mut R,
    ) -> MatchResult {
        let ranked = self.rank(requester_id, requester, candidates, exclusions);

        MatchResult {
            chosen: self.choose(&ranked, rng),
            total_candidates: candidates.len(),
            eligible: ranked.len(),
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(DEFAULT_SHORTLIST_SIZE)
    }
}
