use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

/*
id UUID PRIMARY KEY,
email TEXT NOT NULL,
university TEXT,
instagram TEXT,
status request_status NOT NULL DEFAULT 'pending',
approval_token UUID NOT NULL UNIQUE,
created_at TIMESTAMPTZ NOT NULL DEFAULT now()
 */
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct AccessRequest {
    pub id: Uuid,
    pub email: String,
    pub university: Option<String>,
    pub instagram: Option<String>,
    pub status: RequestStatus,
    pub approval_token: Uuid,
    pub created_at: DateTime<Utc>,
}
