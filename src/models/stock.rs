// src/models/stock.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "stock_movement_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    In,
    Out,
    Transfer,
    Adjustment,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockCategory {
    pub id: Uuid,
    #[schema(ignore)]
    pub company_id: Uuid,
    pub parent_id: Option<Uuid>,
    #[schema(example = "Elétrica")]
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockLocation {
    pub id: Uuid,
    #[schema(ignore)]
    pub company_id: Uuid,
    #[schema(example = "Depósito Central")]
    pub name: String,
    pub code: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    pub id: Uuid,
    #[schema(ignore)]
    pub company_id: Uuid,
    pub category_id: Option<Uuid>,
    #[schema(example = "CIM-50")]
    pub code: String,
    #[schema(example = "Cimento CP-II 50kg")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "saco")]
    pub unit: Option<String>,
    // Abaixo deste valor um StockAlert é gerado.
    pub minimum_quantity: Decimal,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Saldo materializado por (item, local).
// Invariante: available_quantity = current_quantity - reserved_quantity,
// mantida a cada escrita de movimentação.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockBalance {
    pub id: Uuid,
    #[schema(ignore)]
    pub company_id: Uuid,
    pub item_id: Uuid,
    pub location_id: Uuid,
    pub current_quantity: Decimal,
    pub reserved_quantity: Decimal,
    pub available_quantity: Decimal,
    pub last_movement_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

// Lançamento imutável do livro-razão. TRANSFER carrega o local de destino.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: Uuid,
    #[schema(ignore)]
    pub company_id: Uuid,
    pub item_id: Uuid,
    pub location_id: Uuid,
    pub target_location_id: Option<Uuid>,
    pub movement_type: MovementType,
    pub quantity: Decimal,
    pub unit_cost: Option<Decimal>,
    pub lot_number: Option<String>,
    pub document_number: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockLot {
    pub id: Uuid,
    #[schema(ignore)]
    pub company_id: Uuid,
    pub item_id: Uuid,
    pub location_id: Uuid,
    pub lot_number: String,
    pub quantity: Decimal,
    pub expiration_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockAlert {
    pub id: Uuid,
    #[schema(ignore)]
    pub company_id: Uuid,
    pub item_id: Uuid,
    pub location_id: Uuid,
    pub message: String,
    pub current_quantity: Decimal,
    pub minimum_quantity: Decimal,
    pub is_resolved: bool,
    pub created_at: DateTime<Utc>,
}
