// src/handlers/rbac.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, response::Envelope},
    config::AppState,
    middleware::{
        company::CompanyContext,
        rbac::{PermPersonnelWrite, RequirePermission},
    },
    models::rbac::Role,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRolePayload {
    #[validate(length(min = 1, message = "O nome do cargo é obrigatório."))]
    #[schema(example = "Comprador")]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetRolePermissionsPayload {
    // Slugs no formato dominio:acao (ex.: "demand:approve").
    pub slugs: Vec<String>,
}

#[utoipa::path(
    post,
    path = "/api/roles",
    tag = "RBAC",
    request_body = CreateRolePayload,
    responses((status = 201, description = "Cargo criado", body = Role)),
    params(("x-company-id" = Uuid, Header, description = "ID da empresa")),
    security(("api_jwt" = []))
)]
pub async fn create_role(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermPersonnelWrite>,
    Json(payload): Json<CreateRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let role = app_state
        .rbac_repo
        .create_role(
            &app_state.db_pool,
            company.0,
            &payload.name,
            payload.description.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Envelope::ok(role)))
}

#[utoipa::path(
    get,
    path = "/api/roles",
    tag = "RBAC",
    responses((status = 200, description = "Cargos da empresa")),
    params(("x-company-id" = Uuid, Header, description = "ID da empresa")),
    security(("api_jwt" = []))
)]
pub async fn list_roles(
    State(app_state): State<AppState>,
    company: CompanyContext,
) -> Result<impl IntoResponse, AppError> {
    let roles = app_state.rbac_repo.list_roles(company.0).await?;
    Ok(Envelope::ok(roles))
}

// O catálogo de permissões é global (semeado por migração), não por empresa.
#[utoipa::path(
    get,
    path = "/api/permissions",
    tag = "RBAC",
    responses((status = 200, description = "Catálogo de permissões")),
    security(("api_jwt" = []))
)]
pub async fn list_permissions(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let permissions = app_state.rbac_repo.list_permissions().await?;
    Ok(Envelope::ok(permissions))
}

#[utoipa::path(
    put,
    path = "/api/roles/{id}/permissions",
    tag = "RBAC",
    request_body = SetRolePermissionsPayload,
    responses((status = 200, description = "Permissões do cargo substituídas")),
    params(
        ("id" = Uuid, Path, description = "ID do cargo"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_role_permissions(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermPersonnelWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetRolePermissionsPayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .rbac_repo
        .set_role_permissions(id, company.0, &payload.slugs)
        .await?;
    Ok(Envelope::with_message("Permissões do cargo atualizadas.", ()))
}
