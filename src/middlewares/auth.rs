use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use tower_sessions::Session;

use crate::models::sessions::PairSession;

pub async fn pair_auth_middleware(
    session: Session,
    req: Request,
    next: Next,
) -> Result<Response, (StatusCode, String)> {
    // Check if the session has a pair session
    match session.get::<PairSession>("pair").await {
        Ok(Some(_pair_session)) => {
            // Pair member is authenticated, continue
            Ok(next.run(req).await)
        }
        Ok(None) => {
            // No pair session found
            Err((StatusCode::UNAUTHORIZED, "Unauthorized".to_string()))
        }
        Err(e) => {
            // Session error
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
