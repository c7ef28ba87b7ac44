use crate::websocket::manager::ChatSocketManager;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: sqlx::PgPool,
    pub chat_sockets: ChatSocketManager,
}
