use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::models::{
    FindMatchResponse, HealthResponse, HistoryQuery, HistoryResponse, SweepResponse,
    UserActionRequest,
};
use crate::routes::{bad_request, match_error_response, AppState};

const MAX_HISTORY_LIMIT: u16 = 50;

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches/find", web::post().to(find_match))
        .route("/matches/history", web::get().to(match_history))
        .route("/maintenance/sweep", web::post().to(sweep));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.service.store().health_check().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Find match endpoint
///
/// POST /api/v1/matches/find
///
/// Request body:
/// ```json
/// { "userId": 42 }
/// ```
///
/// Always answers 200; `matched` is false when nobody is available, when the
/// requester is already paired, or while their cooldown runs.
async fn find_match(
    state: web::Data<AppState>,
    req: web::Json<UserActionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!(field_errors = ?errors, "Validation failed for find_match request");
        return bad_request("Validation failed", errors.to_string());
    }

    let user_id = req.user_id;

    if let Some(left) = state.cooldown_remaining(user_id).await {
        tracing::debug!(user_id, left, "Match request during cooldown");
        return HttpResponse::Ok().json(no_match(format!(
            "Please wait {} more minute(s) before the next match",
            (left + 59) / 60
        )));
    }

    tracing::info!(user_id, "Finding match");

    match state.service.find_match(user_id).await {
        Some(found) => HttpResponse::Ok().json(FindMatchResponse {
            matched: true,
            partner_id: Some(found.partner_id),
            your_anon_id: Some(found.requester_anon_id().to_string()),
            partner_anon_id: Some(found.partner_anon_id().to_string()),
            score: Some(found.score),
            summary: Some(found.summary.clone()),
            message: "Match found".to_string(),
            pairing: Some(found.pairing),
        }),
        None => HttpResponse::Ok().json(no_match("No match available right now".to_string())),
    }
}

fn no_match(message: String) -> FindMatchResponse {
    FindMatchResponse {
        matched: false,
        pairing: None,
        partner_id: None,
        your_anon_id: None,
        partner_anon_id: None,
        score: None,
        summary: None,
        message,
    }
}

/// Match history
///
/// GET /api/v1/matches/history?userId={userId}&limit={limit}
async fn match_history(
    state: web::Data<AppState>,
    query: web::Query<HistoryQuery>,
) -> impl Responder {
    let limit = query.limit.clamp(1, MAX_HISTORY_LIMIT) as usize;

    match state.service.match_history(query.user_id, limit).await {
        Ok(pairings) => HttpResponse::Ok().json(HistoryResponse {
            user_id: query.user_id,
            count: pairings.len(),
            pairings,
        }),
        Err(e) => match_error_response(&e),
    }
}

/// Run the inactivity sweep now
///
/// POST /api/v1/maintenance/sweep
async fn sweep(state: web::Data<AppState>) -> impl Responder {
    let ended = state
        .service
        .end_inactive_pairings(state.inactivity_limit)
        .await;

    HttpResponse::Ok().json(SweepResponse { ended })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AnonIdGenerator, Matcher};
    use crate::models::{Gender, Profile, Role};
    use crate::services::{InMemoryStore, MatchPolicy, MatchService, PairingStore};
    use actix_web::{test, App};
    use std::sync::Arc;

    async fn seeded_state() -> (AppState, i64) {
        let store = Arc::new(InMemoryStore::new());
        let now = chrono::Utc::now();
        let mut first = 0;
        for (ext, gender, looking_for) in [("a", Gender::Male, Gender::Female), ("b", Gender::Female, Gender::Male)] {
            let user = store.register_user(ext, Role::Member).await.unwrap();
            store
                .save_profile(&Profile {
                    user_id: user.id,
                    age: 30,
                    gender,
                    looking_for,
                    min_age: 18,
                    max_age: 50,
                    city: None,
                    bio: None,
                    interests: None,
                    created_at: now,
                    updated_at: now,
                })
                .await
                .unwrap();
            if first == 0 {
                first = user.id;
            }
        }

        let service = MatchService::new(
            store,
            Matcher::default(),
            AnonIdGenerator::default(),
            MatchPolicy::default(),
        );
        let state = AppState {
            service,
            cache: None,
            cooldown_secs: 0,
            inactivity_limit: chrono::Duration::hours(24),
        };
        (state, first)
    }

    #[actix_web::test]
    async fn test_health_check() {
        let (state, _) = seeded_state().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/health").to_request();
        let body: HealthResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.status, "healthy");
    }

    #[actix_web::test]
    async fn test_find_match_then_history() {
        let (state, user_id) = seeded_state().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/matches/find")
            .set_json(serde_json::json!({ "userId": user_id }))
            .to_request();
        let found: FindMatchResponse = test::call_and_read_body_json(&app, req).await;
        assert!(found.matched);
        assert!(found.your_anon_id.unwrap().starts_with("User"));

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/matches/history?userId={}", user_id))
            .to_request();
        let history: HistoryResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(history.count, 1);
    }

    #[actix_web::test]
    async fn test_find_match_rejects_invalid_user_id() {
        let (state, _) = seeded_state().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/matches/find")
            .set_json(serde_json::json!({ "userId": 0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }
}
