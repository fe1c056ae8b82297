use serde::{Deserialize, Serialize};
use crate::models::domain::{Gender, Pairing, PairingId, UserId};

/// Response for the find match endpoint
///
/// `pairing` is `None` when no partner is available right now.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindMatchResponse {
    pub matched: bool,
    pub pairing: Option<Pairing>,
    #[serde(rename = "partnerId")]
    pub partner_id: Option<UserId>,
    #[serde(rename = "yourAnonId")]
    pub your_anon_id: Option<String>,
    #[serde(rename = "partnerAnonId")]
    pub partner_anon_id: Option<String>,
    pub score: Option<u32>,
    pub summary: Option<String>,
    pub message: String,
}

/// Response for stop/block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairingClosedResponse {
    #[serde(rename = "pairingId")]
    pub pairing_id: PairingId,
    #[serde(rename = "partnerId")]
    pub partner_id: UserId,
    #[serde(rename = "notifyPartner")]
    pub notify_partner: bool,
}

/// Match history listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    pub pairings: Vec<Pairing>,
    pub count: usize,
}

/// Result of the gender visibility gate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerGenderResponse {
    pub visible: bool,
    pub gender: Option<Gender>,
    pub reason: String,
}

/// Sweep result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepResponse {
    pub ended: u64,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
