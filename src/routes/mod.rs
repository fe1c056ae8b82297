// Route exports
pub mod matches;
pub mod pairings;
pub mod users;

use actix_web::{web, HttpResponse};
use std::sync::Arc;

use crate::models::{ErrorResponse, UserId};
use crate::services::{CacheManager, MatchError, MatchService, StoreError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: MatchService,
    /// Cooldowns are skipped when no cache is configured
    pub cache: Option<Arc<CacheManager>>,
    pub cooldown_secs: u64,
    pub inactivity_limit: chrono::Duration,
}

impl AppState {
    /// Start a match cooldown; cache failures only cost the cooldown
    pub(crate) async fn start_cooldown(&self, user_id: UserId) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.start_cooldown(user_id, self.cooldown_secs).await {
                tracing::warn!(user_id, error = %e, "Failed to start match cooldown");
            }
        }
    }

    pub(crate) async fn cooldown_remaining(&self, user_id: UserId) -> Option<i64> {
        let cache = self.cache.as_ref()?;
        match cache.cooldown_remaining(user_id).await {
            Ok(left) => left,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Failed to read match cooldown, allowing request");
                None
            }
        }
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure)
            .configure(pairings::configure)
            .configure(users::configure),
    );
}

pub(crate) fn bad_request(error: &str, message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: error.to_string(),
        message: message.into(),
        status_code: 400,
    })
}

/// Map a service error onto an HTTP response
pub(crate) fn match_error_response(err: &MatchError) -> HttpResponse {
    match err {
        MatchError::UserNotFound(_) => HttpResponse::NotFound().json(ErrorResponse {
            error: "User not found".to_string(),
            message: err.to_string(),
            status_code: 404,
        }),
        MatchError::NoActivePairing(_) => HttpResponse::Conflict().json(ErrorResponse {
            error: "No active pairing".to_string(),
            message: err.to_string(),
            status_code: 409,
        }),
        MatchError::InvalidProfile(msg) => bad_request("Invalid profile", msg.clone()),
        MatchError::InvalidMessage(msg) => bad_request("Invalid message", msg.clone()),
        MatchError::Store(StoreError::NotFound(msg)) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Not found".to_string(),
            message: msg.clone(),
            status_code: 404,
        }),
        MatchError::Store(e) => {
            tracing::error!(error = %e, "Storage failure");
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Storage failure".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}
