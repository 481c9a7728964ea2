// src/models/demand.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Ciclo de vida persistido da demanda. O resultado da aprovação NÃO fica
// aqui: ele é derivado varrendo os registros de aprovação (ver
// ApprovalOutcome e DemandService::derive_outcome).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "demand_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DemandStatus {
    Draft,
    Submitted,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "demand_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DemandPriority {
    Low,
    Normal,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "approval_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

// Resultado geral derivado dos registros de aprovação.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalOutcome {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Demand {
    pub id: Uuid,
    #[schema(ignore)]
    pub company_id: Uuid,
    pub department_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    // Formato: TAL-{código da empresa}-{ano}-{seq:04}
    #[schema(example = "TAL-TLS-2026-0042")]
    pub demand_number: String,
    pub title: String,
    pub description: Option<String>,
    pub status: DemandStatus,
    pub priority: DemandPriority,
    pub requested_by: Option<Uuid>,
    pub needed_by: Option<NaiveDate>,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DemandItem {
    pub id: Uuid,
    pub demand_id: Uuid,
    pub stock_item_id: Option<Uuid>,
    pub name: String,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub estimated_price: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Um registro por nível de aprovação, ordenado por sort_order.
// As linhas são independentes entre si (não há trava sequencial).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DemandApproval {
    pub id: Uuid,
    pub demand_id: Uuid,
    pub approver_id: Uuid,
    pub sort_order: i32,
    pub is_required: bool,
    pub status: ApprovalStatus,
    pub approval_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DemandComment {
    pub id: Uuid,
    pub demand_id: Uuid,
    pub user_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

// Payload completo devolvido em GET /api/demands/{id}.
// `approval_outcome` é calculado na hora, nunca armazenado.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DemandDetail {
    pub demand: Demand,
    pub items: Vec<DemandItem>,
    pub approvals: Vec<DemandApproval>,
    pub comments: Vec<DemandComment>,
    pub approval_outcome: ApprovalOutcome,
}
