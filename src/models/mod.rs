// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Block, CandidateFilter, Gender, Message, NewPairing, Pairing, PairingId, PairingStatus,
    Profile, Role, ScoredCandidate, SubscriptionTier, User, UserId, UserStatus,
};
pub use requests::{
    HistoryQuery, RegisterUserRequest, SaveProfileRequest, SendMessageRequest, UserActionRequest,
    UserQuery,
};
pub use responses::{
    ErrorResponse, FindMatchResponse, HealthResponse, HistoryResponse, PairingClosedResponse,
    PartnerGenderResponse, SweepResponse,
};
