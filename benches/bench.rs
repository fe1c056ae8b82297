// Criterion benchmarks for Veil Match

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use veil_match::core::{calculate_compatibility_score, Exclusions, Matcher};
use veil_match::models::{Gender, Profile, Role, SubscriptionTier, User, UserStatus};

const CITIES: [&str; 4] = ["Kyiv", "Lviv", "Odesa", "Dnipro"];
const INTERESTS: [&str; 6] = ["music", "hiking", "chess", "cooking", "films", "travel"];

fn create_profile(id: i64, gender: Gender, looking_for: Gender) -> Profile {
    let n = id as usize;
    Profile {
        user_id: id,
        age: 20 + (n % 15) as u8,
        gender,
        looking_for,
        min_age: 18,
        max_age: 40,
        city: Some(CITIES[n % CITIES.len()].to_string()),
        bio: (n % 2 == 0).then(|| "Looking for good conversation and coffee".to_string()),
        interests: Some(format!(
            "{}, {}",
            INTERESTS[n % INTERESTS.len()],
            INTERESTS[(n / 2) % INTERESTS.len()]
        )),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn create_candidate(id: i64) -> (User, Profile) {
    let user = User {
        id,
        external_id: id.to_string(),
        status: UserStatus::Active,
        is_registered: true,
        role: Role::Member,
        subscription: SubscriptionTier::Free,
        premium_expires_at: None,
        gender_views_used: 0,
        created_at: Utc::now(),
    };
    (user, create_profile(id, Gender::Female, Gender::Male))
}

fn bench_compatibility_score(c: &mut Criterion) {
    let a = create_profile(1, Gender::Male, Gender::Female);
    let b = create_profile(2, Gender::Female, Gender::Male);

    c.bench_function("compatibility_score", |bench| {
        bench.iter(|| calculate_compatibility_score(black_box(&a), black_box(&b)));
    });
}

fn bench_rank_candidates(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_candidates");
    let matcher = Matcher::default();
    let requester = create_profile(0, Gender::Male, Gender::Female);
    let exclusions = Exclusions {
        recent_partners: (1..50).step_by(7).collect(),
        ..Exclusions::default()
    };

    for size in [100, 1_000, 10_000] {
        let candidates: Vec<_> = (1..=size).map(create_candidate).collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &candidates, |bench, candidates| {
            bench.iter(|| matcher.rank(0, black_box(&requester), black_box(candidates), &exclusions));
        });
    }

    group.finish();
}

fn bench_select(c: &mut Criterion) {
    let matcher = Matcher::default();
    let requester = create_profile(0, Gender::Male, Gender::Female);
    let candidates: Vec<_> = (1..=1_000).map(create_candidate).collect();
    let exclusions = Exclusions::default();
    let mut rng = StdRng::seed_from_u64(42);

    c.bench_function("select_1000", |bench| {
        bench.iter(|| matcher.select(0, black_box(&requester), &candidates, &exclusions, &mut rng));
    });
}

criterion_group!(
    benches,
    bench_compatibility_score,
    bench_rank_candidates,
    bench_select
);
criterion_main!(benches);
