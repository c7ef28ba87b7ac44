use crate::app_state::AppState;
use crate::handlers::v1::referrals;
use crate::middlewares::auth::pair_auth_middleware;
use axum::{middleware, routing::post, Router};

pub fn referral_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/invite",
            post(referrals::invite_partner)
                .route_layer(middleware::from_fn(pair_auth_middleware)),
        )
        .route("/validate", post(referrals::validate_code))
}
