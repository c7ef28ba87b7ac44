use crate::app_state::AppState;
use crate::handlers::v1::access;
use axum::{routing::get, routing::post, Router};

pub fn access_routes() -> Router<AppState> {
    Router::new()
        .route("/request", post(access::request_access)) // /api/v1/access/request
        .route("/respond", get(access::respond_access)) // link target from the support email
}
