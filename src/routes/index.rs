use crate::app_state::AppState;
use axum::{routing::get, Router};

pub fn index_route() -> Router<AppState> {
    Router::new().route("/", get(|| async { "Inntro API" }))
}
