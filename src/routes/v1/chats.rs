use crate::app_state::AppState;
use crate::handlers::v1::chats;
use crate::middlewares::auth::pair_auth_middleware;
use axum::{middleware, routing::get, Router};

pub fn chat_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/{match_id}/messages",
            get(chats::get_messages).post(chats::send_message),
        )
        .route_layer(middleware::from_fn(pair_auth_middleware))
}
