// src/handlers/personnel.rs

use axum::{
    Json,
    extract::{Path, Query, State},
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
        rbac::{PermPersonnelRead, PermPersonnelWrite, RequirePermission},
    },
    models::auth::User,
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    // Filtra por nome ou e-mail (ILIKE).
    pub search: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Personnel",
    params(
        UserListQuery,
        PageParams,
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    responses((status = 200, description = "Usuários ativos da empresa, paginados")),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermPersonnelRead>,
    Query(filter): Query<UserListQuery>,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let (users, total) = app_state
        .user_repo
        .list(company.0, filter.search.as_deref(), &page)
        .await?;
    Ok(Envelope::ok(Paginated::new(users, total, &page)))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Personnel",
    responses((status = 200, description = "Usuário", body = User)),
    params(
        ("id" = Uuid, Path, description = "ID do usuário"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_user(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermPersonnelRead>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state
        .user_repo
        .find_by_id(id)
        .await?
        .filter(|u| u.company_id == company.0)
        .ok_or(AppError::NotFound("Usuário"))?;
    Ok(Envelope::ok(user))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    pub department_id: Option<Uuid>,
    #[validate(length(min = 1, message = "O nome não pode ser vazio."))]
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Personnel",
    request_body = UpdateUserPayload,
    responses((status = 200, description = "Usuário atualizado", body = User)),
    params(
        ("id" = Uuid, Path, description = "ID do usuário"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermPersonnelWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = app_state
        .user_repo
        .update(
            id,
            company.0,
            payload.department_id,
            payload.full_name.as_deref(),
            payload.phone.as_deref(),
        )
        .await?;
    Ok(Envelope::ok(user))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Personnel",
    responses((status = 200, description = "Usuário desativado")),
    params(
        ("id" = Uuid, Path, description = "ID do usuário"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermPersonnelWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.user_repo.soft_delete(id, company.0).await?;
    Ok(Envelope::with_message("Usuário desativado.", ()))
}

// ---
// Cargos do usuário
// ---

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignRolePayload {
    pub role_id: Uuid,
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/roles",
    tag = "Personnel",
    responses((status = 200, description = "Cargos do usuário")),
    params(
        ("id" = Uuid, Path, description = "ID do usuário"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_user_roles(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermPersonnelRead>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    // Confirma que o usuário pertence à empresa antes de listar.
    app_state
        .user_repo
        .find_by_id(id)
        .await?
        .filter(|u| u.company_id == company.0)
        .ok_or(AppError::NotFound("Usuário"))?;

    let roles = app_state.user_repo.roles_of_user(id).await?;
    Ok(Envelope::ok(roles))
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/roles",
    tag = "Personnel",
    request_body = AssignRolePayload,
    responses((status = 200, description = "Cargo atribuído")),
    params(
        ("id" = Uuid, Path, description = "ID do usuário"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_role(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermPersonnelWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .user_repo
        .find_by_id(id)
        .await?
        .filter(|u| u.company_id == company.0)
        .ok_or(AppError::NotFound("Usuário"))?;

    app_state
        .user_repo
        .assign_role(id, payload.role_id)
        .await?;
    Ok(Envelope::with_message("Cargo atribuído.", ()))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}/roles/{role_id}",
    tag = "Personnel",
    responses((status = 200, description = "Cargo removido")),
    params(
        ("id" = Uuid, Path, description = "ID do usuário"),
        ("role_id" = Uuid, Path, description = "ID do cargo"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_role(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermPersonnelWrite>,
    Path((id, role_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .user_repo
        .find_by_id(id)
        .await?
        .filter(|u| u.company_id == company.0)
        .ok_or(AppError::NotFound("Usuário"))?;

    app_state.user_repo.remove_role(id, role_id).await?;
    Ok(Envelope::with_message("Cargo removido.", ()))
}
