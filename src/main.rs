mod app_state;
mod db;
mod error;
mod handlers;
mod middlewares;
mod models;
mod queries;
mod routes;
mod utils;
mod websocket;

use tower_sessions::{cookie::time::Duration, Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

#[tokio::main]
async fn main() {
    let pool = match db::connect_to_db().await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Error connecting to database: {}", e);
            std::process::exit(1);
        }
    };

    let session_store = PostgresStore::new(pool.clone());
    if let Err(e) = session_store.migrate().await {
        eprintln!("Error preparing session store: {}", e);
        std::process::exit(1);
    }
    let session_layer = SessionManagerLayer::new(session_store)
        .with_expiry(Expiry::OnInactivity(Duration::days(30)));

    let state = app_state::AppState {
        db_pool: pool,
        chat_sockets: websocket::manager::ChatSocketManager::new(),
    };
    let app = routes::create_routes().layer(session_layer).with_state(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
