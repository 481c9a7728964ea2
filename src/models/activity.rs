// src/models/activity.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Linha de auditoria gravada pelo middleware de atividade
// (quem fez, o quê, onde e com qual resultado).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserActivityLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    #[schema(example = "POST")]
    pub method: String,
    #[schema(example = "/api/stock/movements")]
    pub path: String,
    pub status_code: i32,
    pub created_at: DateTime<Utc>,
}
