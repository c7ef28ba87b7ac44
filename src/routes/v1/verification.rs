use crate::app_state::AppState;
use crate::handlers::v1::verification;
use axum::{routing::post, Router};

pub fn verification_routes() -> Router<AppState> {
    Router::new()
        .route("/send", post(verification::send_code)) // /api/v1/verification/send
        .route("/verify", post(verification::verify_code))
}
