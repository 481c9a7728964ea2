// src/handlers/suppliers.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        pagination::{PageParams, Paginated},
        response::Envelope,
    },
    config::AppState,
    middleware::{
        company::CompanyContext,
        rbac::{PermSupplierRead, PermSupplierWrite, RequirePermission},
    },
    models::supplier::Supplier,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupplierPayload {
    #[validate(length(min = 1, message = "O nome do fornecedor é obrigatório."))]
    #[schema(example = "Madeireira São José Ltda")]
    pub name: String,
    pub tax_number: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSupplierPayload {
    #[validate(length(min = 1, message = "O nome não pode ser vazio."))]
    pub name: Option<String>,
    pub tax_number: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SupplierListQuery {
    pub search: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/suppliers",
    tag = "Suppliers",
    request_body = CreateSupplierPayload,
    responses((status = 201, description = "Fornecedor criado e vinculado à empresa", body = Supplier)),
    params(("x-company-id" = Uuid, Header, description = "ID da empresa")),
    security(("api_jwt" = []))
)]
pub async fn create_supplier(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermSupplierWrite>,
    Json(payload): Json<CreateSupplierPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let supplier = app_state
        .supplier_repo
        .create(
            company.0,
            &payload.name,
            payload.tax_number.as_deref(),
            payload.email.as_deref(),
            payload.phone.as_deref(),
            payload.address.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Envelope::ok(supplier)))
}

#[utoipa::path(
    get,
    path = "/api/suppliers",
    tag = "Suppliers",
    params(
        SupplierListQuery,
        PageParams,
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    responses((status = 200, description = "Fornecedores vinculados, paginados")),
    security(("api_jwt" = []))
)]
pub async fn list_suppliers(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermSupplierRead>,
    Query(filter): Query<SupplierListQuery>,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let (suppliers, total) = app_state
        .supplier_repo
        .list(company.0, filter.search.as_deref(), &page)
        .await?;
    Ok(Envelope::ok(Paginated::new(suppliers, total, &page)))
}

#[utoipa::path(
    get,
    path = "/api/suppliers/{id}",
    tag = "Suppliers",
    responses((status = 200, description = "Fornecedor", body = Supplier)),
    params(
        ("id" = Uuid, Path, description = "ID do fornecedor"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_supplier(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermSupplierRead>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let supplier = app_state
        .supplier_repo
        .find(id, company.0)
        .await?
        .ok_or(AppError::NotFound("Fornecedor"))?;
    Ok(Envelope::ok(supplier))
}

#[utoipa::path(
    put,
    path = "/api/suppliers/{id}",
    tag = "Suppliers",
    request_body = UpdateSupplierPayload,
    responses((status = 200, description = "Fornecedor atualizado", body = Supplier)),
    params(
        ("id" = Uuid, Path, description = "ID do fornecedor"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_supplier(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermSupplierWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSupplierPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let supplier = app_state
        .supplier_repo
        .update(
            id,
            company.0,
            payload.name.as_deref(),
            payload.tax_number.as_deref(),
            payload.email.as_deref(),
            payload.phone.as_deref(),
            payload.address.as_deref(),
        )
        .await?;
    Ok(Envelope::ok(supplier))
}

#[utoipa::path(
    delete,
    path = "/api/suppliers/{id}",
    tag = "Suppliers",
    responses((status = 200, description = "Fornecedor desativado")),
    params(
        ("id" = Uuid, Path, description = "ID do fornecedor"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_supplier(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermSupplierWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.supplier_repo.soft_delete(id, company.0).await?;
    Ok(Envelope::with_message("Fornecedor desativado.", ()))
}

// Vincula um fornecedor já existente (criado por outra empresa) à empresa
// que chama. O cadastro mestre é compartilhado.
#[utoipa::path(
    post,
    path = "/api/suppliers/{id}/link",
    tag = "Suppliers",
    responses((status = 200, description = "Fornecedor vinculado à empresa")),
    params(
        ("id" = Uuid, Path, description = "ID do fornecedor"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn link_supplier(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermSupplierWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.supplier_repo.link_company(id, company.0).await?;
    Ok(Envelope::with_message("Fornecedor vinculado.", ()))
}
