// src/handlers/stock.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::{
        error::AppError,
        pagination::{PageParams, Paginated},
        response::Envelope,
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        company::CompanyContext,
        rbac::{PermStockRead, PermStockWrite, RequirePermission},
    },
    models::stock::{
        MovementType, StockBalance, StockCategory, StockItem, StockLocation, StockMovement,
    },
    services::stock_service::NewMovement,
};

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Categorias
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryPayload {
    pub parent_id: Option<Uuid>,
    #[validate(length(min = 1, message = "O nome da categoria é obrigatório."))]
    #[schema(example = "Elétrica")]
    pub name: String,
}

#[utoipa::path(
    post,
    path = "/api/stock/categories",
    tag = "Stock",
    request_body = CreateCategoryPayload,
    responses((status = 201, description = "Categoria criada", body = StockCategory)),
    params(("x-company-id" = Uuid, Header, description = "ID da empresa")),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermStockWrite>,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let category = app_state
        .stock_repo
        .create_category(company.0, payload.parent_id, &payload.name)
        .await?;
    Ok((StatusCode::CREATED, Envelope::ok(category)))
}

#[utoipa::path(
    get,
    path = "/api/stock/categories",
    tag = "Stock",
    responses((status = 200, description = "Categorias ativas")),
    params(("x-company-id" = Uuid, Header, description = "ID da empresa")),
    security(("api_jwt" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermStockRead>,
) -> Result<impl IntoResponse, AppError> {
    let categories = app_state.stock_repo.list_categories(company.0).await?;
    Ok(Envelope::ok(categories))
}

// ---
// Locais
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocationPayload {
    #[validate(length(min = 1, message = "O nome do local é obrigatório."))]
    #[schema(example = "Depósito Central")]
    pub name: String,
    pub code: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/stock/locations",
    tag = "Stock",
    request_body = CreateLocationPayload,
    responses((status = 201, description = "Local criado", body = StockLocation)),
    params(("x-company-id" = Uuid, Header, description = "ID da empresa")),
    security(("api_jwt" = []))
)]
pub async fn create_location(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermStockWrite>,
    Json(payload): Json<CreateLocationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let location = app_state
        .stock_repo
        .create_location(company.0, &payload.name, payload.code.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Envelope::ok(location)))
}

#[utoipa::path(
    get,
    path = "/api/stock/locations",
    tag = "Stock",
    responses((status = 200, description = "Locais ativos")),
    params(("x-company-id" = Uuid, Header, description = "ID da empresa")),
    security(("api_jwt" = []))
)]
pub async fn list_locations(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermStockRead>,
) -> Result<impl IntoResponse, AppError> {
    let locations = app_state.stock_repo.list_locations(company.0).await?;
    Ok(Envelope::ok(locations))
}

// ---
// Itens
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemPayload {
    pub category_id: Option<Uuid>,
    #[validate(length(min = 1, message = "O código é obrigatório."))]
    #[schema(example = "CIM-50")]
    pub code: String,
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Cimento CP-II 50kg")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "saco")]
    pub unit: Option<String>,
    // Abaixo deste valor a movimentação gera um StockAlert.
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub minimum_quantity: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemPayload {
    pub category_id: Option<Uuid>,
    #[validate(length(min = 1, message = "O nome não pode ser vazio."))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub minimum_quantity: Option<Decimal>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ItemListQuery {
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
}

#[utoipa::path(
    post,
    path = "/api/stock/items",
    tag = "Stock",
    request_body = CreateItemPayload,
    responses((status = 201, description = "Item criado", body = StockItem)),
    params(("x-company-id" = Uuid, Header, description = "ID da empresa")),
    security(("api_jwt" = []))
)]
pub async fn create_item(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    company: CompanyContext,
    _guard: RequirePermission<PermStockWrite>,
    Json(payload): Json<CreateItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let item = app_state
        .stock_repo
        .create_item(
            company.0,
            user.id,
            payload.category_id,
            &payload.code,
            &payload.name,
            payload.description.as_deref(),
            payload.unit.as_deref(),
            payload.minimum_quantity,
        )
        .await?;
    Ok((StatusCode::CREATED, Envelope::ok(item)))
}

#[utoipa::path(
    get,
    path = "/api/stock/items",
    tag = "Stock",
    params(
        ItemListQuery,
        PageParams,
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    responses((status = 200, description = "Itens ativos, paginados")),
    security(("api_jwt" = []))
)]
pub async fn list_items(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermStockRead>,
    Query(filter): Query<ItemListQuery>,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let (items, total) = app_state
        .stock_repo
        .list_items(company.0, filter.search.as_deref(), filter.category_id, &page)
        .await?;
    Ok(Envelope::ok(Paginated::new(items, total, &page)))
}

#[utoipa::path(
    get,
    path = "/api/stock/items/{id}",
    tag = "Stock",
    responses((status = 200, description = "Item de estoque", body = StockItem)),
    params(
        ("id" = Uuid, Path, description = "ID do item"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_item(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermStockRead>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let item = app_state
        .stock_repo
        .find_item(id, company.0)
        .await?
        .ok_or(AppError::NotFound("Item de estoque"))?;
    Ok(Envelope::ok(item))
}

#[utoipa::path(
    put,
    path = "/api/stock/items/{id}",
    tag = "Stock",
    request_body = UpdateItemPayload,
    responses((status = 200, description = "Item atualizado", body = StockItem)),
    params(
        ("id" = Uuid, Path, description = "ID do item"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_item(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    company: CompanyContext,
    _guard: RequirePermission<PermStockWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let item = app_state
        .stock_repo
        .update_item(
            id,
            company.0,
            user.id,
            payload.category_id,
            payload.name.as_deref(),
            payload.description.as_deref(),
            payload.unit.as_deref(),
            payload.minimum_quantity,
        )
        .await?;
    Ok(Envelope::ok(item))
}

#[utoipa::path(
    delete,
    path = "/api/stock/items/{id}",
    tag = "Stock",
    responses((status = 200, description = "Item desativado")),
    params(
        ("id" = Uuid, Path, description = "ID do item"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_item(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermStockWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.stock_repo.soft_delete_item(id, company.0).await?;
    Ok(Envelope::with_message("Item desativado.", ()))
}

// ---
// Movimentações
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovementPayload {
    pub item_id: Uuid,
    pub location_id: Uuid,
    // Obrigatório apenas para TRANSFER.
    pub target_location_id: Option<Uuid>,
    #[schema(example = "IN")]
    pub movement_type: MovementType,
    pub quantity: Decimal,
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub unit_cost: Decimal,
    pub lot_number: Option<String>,
    pub expiration_date: Option<NaiveDate>,
    pub document_number: Option<String>,
    pub notes: Option<String>,
}

// Resposta composta: o lançamento gravado e o saldo resultante na origem.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovementResult {
    pub movement: StockMovement,
    pub balance: StockBalance,
}

#[utoipa::path(
    post,
    path = "/api/stock/movements",
    tag = "Stock",
    request_body = CreateMovementPayload,
    responses(
        (status = 201, description = "Movimentação registrada e saldo atualizado", body = MovementResult),
        (status = 422, description = "Quantidade inválida ou estoque insuficiente")
    ),
    params(("x-company-id" = Uuid, Header, description = "ID da empresa")),
    security(("api_jwt" = []))
)]
pub async fn create_movement(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    company: CompanyContext,
    _guard: RequirePermission<PermStockWrite>,
    Json(payload): Json<CreateMovementPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let unit_cost = if payload.unit_cost > Decimal::ZERO {
        Some(payload.unit_cost)
    } else {
        None
    };

    let (movement, balance) = app_state
        .stock_service
        .register_movement(
            company.0,
            user.id,
            NewMovement {
                item_id: payload.item_id,
                location_id: payload.location_id,
                target_location_id: payload.target_location_id,
                movement_type: payload.movement_type,
                quantity: payload.quantity,
                unit_cost,
                lot_number: payload.lot_number,
                expiration_date: payload.expiration_date,
                document_number: payload.document_number,
                notes: payload.notes,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Envelope::ok(MovementResult { movement, balance }),
    ))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct MovementListQuery {
    pub item_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
}

#[utoipa::path(
    get,
    path = "/api/stock/movements",
    tag = "Stock",
    params(
        MovementListQuery,
        PageParams,
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    responses((status = 200, description = "Movimentações, mais recentes primeiro")),
    security(("api_jwt" = []))
)]
pub async fn list_movements(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermStockRead>,
    Query(filter): Query<MovementListQuery>,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let (movements, total) = app_state
        .stock_repo
        .list_movements(company.0, filter.item_id, filter.location_id, &page)
        .await?;
    Ok(Envelope::ok(Paginated::new(movements, total, &page)))
}

// ---
// Saldos, lotes e alertas
// ---

#[utoipa::path(
    get,
    path = "/api/stock/balances",
    tag = "Stock",
    params(
        MovementListQuery,
        PageParams,
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    responses((status = 200, description = "Saldos por (item, local)")),
    security(("api_jwt" = []))
)]
pub async fn list_balances(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermStockRead>,
    Query(filter): Query<MovementListQuery>,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let (balances, total) = app_state
        .stock_repo
        .list_balances(company.0, filter.item_id, filter.location_id, &page)
        .await?;
    Ok(Envelope::ok(Paginated::new(balances, total, &page)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct LotListQuery {
    pub item_id: Option<Uuid>,
}

#[utoipa::path(
    get,
    path = "/api/stock/lots",
    tag = "Stock",
    params(
        LotListQuery,
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    responses((status = 200, description = "Lotes, mais antigos primeiro")),
    security(("api_jwt" = []))
)]
pub async fn list_lots(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermStockRead>,
    Query(filter): Query<LotListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let lots = app_state.stock_repo.list_lots(company.0, filter.item_id).await?;
    Ok(Envelope::ok(lots))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AlertListQuery {
    // true = apenas alertas ainda não resolvidos.
    pub only_unresolved: Option<bool>,
}

#[utoipa::path(
    get,
    path = "/api/stock/alerts",
    tag = "Stock",
    params(
        AlertListQuery,
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    responses((status = 200, description = "Alertas de estoque mínimo")),
    security(("api_jwt" = []))
)]
pub async fn list_alerts(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermStockRead>,
    Query(filter): Query<AlertListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let alerts = app_state
        .stock_repo
        .list_alerts(company.0, filter.only_unresolved.unwrap_or(true))
        .await?;
    Ok(Envelope::ok(alerts))
}

#[utoipa::path(
    put,
    path = "/api/stock/alerts/{id}/resolve",
    tag = "Stock",
    responses((status = 200, description = "Alerta marcado como resolvido")),
    params(
        ("id" = Uuid, Path, description = "ID do alerta"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn resolve_alert(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermStockWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.stock_repo.resolve_alert(id, company.0).await?;
    Ok(Envelope::with_message("Alerta resolvido.", ()))
}
