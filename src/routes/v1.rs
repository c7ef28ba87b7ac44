pub mod access;
pub mod chats;
pub mod matches;
pub mod pairs;
pub mod referrals;
pub mod verification;
pub mod websocket;

use crate::app_state::AppState;
use axum::Router;

pub fn v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/access", access::access_routes())
        .nest("/verification", verification::verification_routes())
        .nest("/referrals", referrals::referral_routes())
        .nest("/pairs", pairs::pair_routes())
        .nest("/matches", matches::match_routes())
        .nest("/chats", chats::chat_routes())
        .merge(websocket::websocket_routes())
}
