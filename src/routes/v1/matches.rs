use crate::app_state::AppState;
use crate::handlers::v1::matches;
use crate::middlewares::auth::pair_auth_middleware;
use axum::{middleware, routing::get, routing::post, Router};

pub fn match_routes() -> Router<AppState> {
    Router::new()
        .route("/like", post(matches::like))
        .route("/", get(matches::get_matches))
        .route_layer(middleware::from_fn(pair_auth_middleware))
}
