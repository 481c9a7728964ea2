// src/handlers/tenancy.rs

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
    models::tenancy::{Company, Department},
};

// ---
// Empresa
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompanyPayload {
    #[validate(length(min = 1, message = "O nome não pode ser vazio."))]
    pub name: Option<String>,
    pub tax_number: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/company",
    tag = "Tenancy",
    responses((status = 200, description = "Dados da empresa do usuário", body = Company)),
    params(("x-company-id" = Uuid, Header, description = "ID da empresa")),
    security(("api_jwt" = []))
)]
pub async fn get_company(
    State(app_state): State<AppState>,
    company: CompanyContext,
) -> Result<impl IntoResponse, AppError> {
    let found = app_state
        .tenancy_repo
        .find_company(company.0)
        .await?
        .ok_or(AppError::NotFound("Empresa"))?;
    Ok(Envelope::ok(found))
}

#[utoipa::path(
    put,
    path = "/api/company",
    tag = "Tenancy",
    request_body = UpdateCompanyPayload,
    responses((status = 200, description = "Empresa atualizada", body = Company)),
    params(("x-company-id" = Uuid, Header, description = "ID da empresa")),
    security(("api_jwt" = []))
)]
pub async fn update_company(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermPersonnelWrite>,
    Json(payload): Json<UpdateCompanyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let updated = app_state
        .tenancy_repo
        .update_company(
            company.0,
            payload.name.as_deref(),
            payload.tax_number.as_deref(),
        )
        .await?;
    Ok(Envelope::ok(updated))
}

// ---
// Departamentos
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepartmentPayload {
    #[validate(length(min = 1, message = "O nome do departamento é obrigatório."))]
    #[schema(example = "Suprimentos")]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDepartmentPayload {
    #[validate(length(min = 1, message = "O nome não pode ser vazio."))]
    pub name: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/departments",
    tag = "Tenancy",
    request_body = CreateDepartmentPayload,
    responses((status = 201, description = "Departamento criado", body = Department)),
    params(("x-company-id" = Uuid, Header, description = "ID da empresa")),
    security(("api_jwt" = []))
)]
pub async fn create_department(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermPersonnelWrite>,
    Json(payload): Json<CreateDepartmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let department = app_state
        .tenancy_repo
        .create_department(company.0, &payload.name)
        .await?;
    Ok((StatusCode::CREATED, Envelope::ok(department)))
}

#[utoipa::path(
    get,
    path = "/api/departments",
    tag = "Tenancy",
    responses((status = 200, description = "Departamentos ativos da empresa")),
    params(("x-company-id" = Uuid, Header, description = "ID da empresa")),
    security(("api_jwt" = []))
)]
pub async fn list_departments(
    State(app_state): State<AppState>,
    company: CompanyContext,
) -> Result<impl IntoResponse, AppError> {
    let departments = app_state.tenancy_repo.list_departments(company.0).await?;
    Ok(Envelope::ok(departments))
}

#[utoipa::path(
    get,
    path = "/api/departments/{id}",
    tag = "Tenancy",
    responses((status = 200, description = "Departamento", body = Department)),
    params(
        ("id" = Uuid, Path, description = "ID do departamento"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_department(
    State(app_state): State<AppState>,
    company: CompanyContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let department = app_state
        .tenancy_repo
        .find_department(id, company.0)
        .await?
        .ok_or(AppError::NotFound("Departamento"))?;
    Ok(Envelope::ok(department))
}

#[utoipa::path(
    put,
    path = "/api/departments/{id}",
    tag = "Tenancy",
    request_body = UpdateDepartmentPayload,
    responses((status = 200, description = "Departamento atualizado", body = Department)),
    params(
        ("id" = Uuid, Path, description = "ID do departamento"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_department(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermPersonnelWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDepartmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let department = app_state
        .tenancy_repo
        .update_department(id, company.0, payload.name.as_deref())
        .await?;
    Ok(Envelope::ok(department))
}

#[utoipa::path(
    delete,
    path = "/api/departments/{id}",
    tag = "Tenancy",
    responses((status = 200, description = "Departamento desativado")),
    params(
        ("id" = Uuid, Path, description = "ID do departamento"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_department(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermPersonnelWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .tenancy_repo
        .soft_delete_department(id, company.0)
        .await?;
    Ok(Envelope::with_message("Departamento desativado.", ()))
}
