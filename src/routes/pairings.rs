use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::models::{
    PairingClosedResponse, PartnerGenderResponse, SendMessageRequest, UserActionRequest, UserQuery,
};
use crate::routes::{bad_request, match_error_response, AppState};
use crate::services::PairingClosed;

/// Configure routes acting on the caller's active pairing
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/pairings/stop", web::post().to(stop_pairing))
        .route("/pairings/block", web::post().to(block_partner))
        .route("/pairings/messages", web::post().to(send_message))
        .route("/pairings/partner-gender", web::get().to(partner_gender));
}

fn closed_response(closed: PairingClosed) -> HttpResponse {
    HttpResponse::Ok().json(PairingClosedResponse {
        pairing_id: closed.pairing.id,
        partner_id: closed.partner_id,
        notify_partner: closed.notify_partner,
    })
}

/// POST /api/v1/pairings/stop
async fn stop_pairing(
    state: web::Data<AppState>,
    req: web::Json<UserActionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("Validation failed", errors.to_string());
    }

    match state.service.stop_pairing(req.user_id).await {
        Ok(closed) => {
            state.start_cooldown(req.user_id).await;
            closed_response(closed)
        }
        Err(e) => match_error_response(&e),
    }
}

/// POST /api/v1/pairings/block
async fn block_partner(
    state: web::Data<AppState>,
    req: web::Json<UserActionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("Validation failed", errors.to_string());
    }

    match state.service.block_partner(req.user_id).await {
        Ok(closed) => {
            state.start_cooldown(req.user_id).await;
            closed_response(closed)
        }
        Err(e) => match_error_response(&e),
    }
}

/// POST /api/v1/pairings/messages
async fn send_message(
    state: web::Data<AppState>,
    req: web::Json<SendMessageRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("Validation failed", errors.to_string());
    }

    match state.service.record_message(req.user_id, &req.content).await {
        Ok(message) => HttpResponse::Created().json(message),
        Err(e) => match_error_response(&e),
    }
}

/// GET /api/v1/pairings/partner-gender?userId={userId}
async fn partner_gender(
    state: web::Data<AppState>,
    query: web::Query<UserQuery>,
) -> impl Responder {
    match state.service.reveal_partner_gender(query.user_id).await {
        Ok(reveal) => HttpResponse::Ok().json(PartnerGenderResponse {
            visible: reveal.gender.is_some(),
            gender: reveal.gender,
            reason: reveal.visibility.reason(),
        }),
        Err(e) => match_error_response(&e),
    }
}
