use crate::app_state::AppState;
use crate::handlers::v1::pairs;
use crate::middlewares::auth::pair_auth_middleware;
use axum::{middleware, routing::get, routing::post, Router};

pub fn pair_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(pairs::signup)) // /api/v1/pairs/signup
        .route("/join", post(pairs::join))
        .route(
            "/candidates",
            get(pairs::candidates).route_layer(middleware::from_fn(pair_auth_middleware)),
        )
        .route(
            "/{pair_id}",
            get(pairs::get_pair_by_id).route_layer(middleware::from_fn(pair_auth_middleware)),
        )
}
