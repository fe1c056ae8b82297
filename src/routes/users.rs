use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use validator::Validate;

use crate::models::{Profile, RegisterUserRequest, SaveProfileRequest};
use crate::routes::{bad_request, match_error_response, AppState};

/// Configure account and profile routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/users", web::post().to(register_user))
        .route("/profiles", web::put().to(save_profile));
}

/// POST /api/v1/users
async fn register_user(
    state: web::Data<AppState>,
    req: web::Json<RegisterUserRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("Validation failed", errors.to_string());
    }

    match state.service.register_user(req.external_id.trim()).await {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(e) => match_error_response(&e),
    }
}

/// PUT /api/v1/profiles
async fn save_profile(
    state: web::Data<AppState>,
    req: web::Json<SaveProfileRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("Validation failed", errors.to_string());
    }

    let req = req.into_inner();
    let now = Utc::now();
    let profile = Profile {
        user_id: req.user_id,
        age: req.age,
        gender: req.gender,
        looking_for: req.looking_for,
        min_age: req.min_age,
        max_age: req.max_age,
        city: non_blank(req.city),
        bio: non_blank(req.bio),
        interests: non_blank(req.interests),
        created_at: now,
        updated_at: now,
    };

    match state.service.save_profile(profile).await {
        Ok(saved) => HttpResponse::Ok().json(saved),
        Err(e) => match_error_response(&e),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
