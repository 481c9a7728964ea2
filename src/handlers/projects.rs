// src/handlers/projects.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
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
        auth::AuthenticatedUser,
        company::CompanyContext,
        rbac::{PermProjectRead, PermProjectWrite, RequirePermission},
    },
    models::project::{Process, Project, ProjectAddress, ProjectTask, TaskItem, TaskStatus},
};

// ---
// Projetos
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectPayload {
    #[validate(length(min = 1, message = "O nome do projeto é obrigatório."))]
    #[schema(example = "Residencial Aurora")]
    pub name: String,
    pub code: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectPayload {
    #[validate(length(min = 1, message = "O nome não pode ser vazio."))]
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListQuery {
    pub search: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "Projects",
    request_body = CreateProjectPayload,
    responses((status = 201, description = "Projeto criado", body = Project)),
    params(("x-company-id" = Uuid, Header, description = "ID da empresa")),
    security(("api_jwt" = []))
)]
pub async fn create_project(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    company: CompanyContext,
    _guard: RequirePermission<PermProjectWrite>,
    Json(payload): Json<CreateProjectPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let project = app_state
        .project_repo
        .create_project(
            company.0,
            user.id,
            &payload.name,
            payload.code.as_deref(),
            payload.description.as_deref(),
            payload.start_date,
            payload.end_date,
        )
        .await?;
    Ok((StatusCode::CREATED, Envelope::ok(project)))
}

#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "Projects",
    params(
        ProjectListQuery,
        PageParams,
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    responses((status = 200, description = "Projetos ativos, paginados")),
    security(("api_jwt" = []))
)]
pub async fn list_projects(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermProjectRead>,
    Query(filter): Query<ProjectListQuery>,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let (projects, total) = app_state
        .project_repo
        .list_projects(company.0, filter.search.as_deref(), &page)
        .await?;
    Ok(Envelope::ok(Paginated::new(projects, total, &page)))
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    tag = "Projects",
    responses((status = 200, description = "Projeto", body = Project)),
    params(
        ("id" = Uuid, Path, description = "ID do projeto"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_project(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermProjectRead>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let project = app_state
        .project_repo
        .find_project(id, company.0)
        .await?
        .ok_or(AppError::NotFound("Projeto"))?;
    Ok(Envelope::ok(project))
}

#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    tag = "Projects",
    request_body = UpdateProjectPayload,
    responses((status = 200, description = "Projeto atualizado", body = Project)),
    params(
        ("id" = Uuid, Path, description = "ID do projeto"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_project(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    company: CompanyContext,
    _guard: RequirePermission<PermProjectWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProjectPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let project = app_state
        .project_repo
        .update_project(
            id,
            company.0,
            user.id,
            payload.name.as_deref(),
            payload.code.as_deref(),
            payload.description.as_deref(),
            payload.start_date,
            payload.end_date,
        )
        .await?;
    Ok(Envelope::ok(project))
}

#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    tag = "Projects",
    responses((status = 200, description = "Projeto desativado")),
    params(
        ("id" = Uuid, Path, description = "ID do projeto"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_project(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermProjectWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .project_repo
        .soft_delete_project(id, company.0)
        .await?;
    Ok(Envelope::with_message("Projeto desativado.", ()))
}

// ---
// Endereços do projeto
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddAddressPayload {
    #[validate(length(min = 1, message = "O endereço é obrigatório."))]
    pub address_line: String,
    pub city: Option<String>,
    pub country: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/projects/{id}/addresses",
    tag = "Projects",
    request_body = AddAddressPayload,
    responses((status = 201, description = "Endereço adicionado", body = ProjectAddress)),
    params(
        ("id" = Uuid, Path, description = "ID do projeto"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_address(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermProjectWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddAddressPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    // O projeto precisa existir na empresa antes de ganhar filhos.
    app_state
        .project_repo
        .find_project(id, company.0)
        .await?
        .ok_or(AppError::NotFound("Projeto"))?;

    let address = app_state
        .project_repo
        .add_address(
            id,
            &payload.address_line,
            payload.city.as_deref(),
            payload.country.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Envelope::ok(address)))
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}/addresses",
    tag = "Projects",
    responses((status = 200, description = "Endereços do projeto")),
    params(
        ("id" = Uuid, Path, description = "ID do projeto"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_addresses(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermProjectRead>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .project_repo
        .find_project(id, company.0)
        .await?
        .ok_or(AppError::NotFound("Projeto"))?;

    let addresses = app_state.project_repo.list_addresses(id).await?;
    Ok(Envelope::ok(addresses))
}

#[utoipa::path(
    delete,
    path = "/api/projects/{id}/addresses/{address_id}",
    tag = "Projects",
    responses((status = 200, description = "Endereço removido")),
    params(
        ("id" = Uuid, Path, description = "ID do projeto"),
        ("address_id" = Uuid, Path, description = "ID do endereço"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_address(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermProjectWrite>,
    Path((id, address_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .project_repo
        .find_project(id, company.0)
        .await?
        .ok_or(AppError::NotFound("Projeto"))?;

    app_state.project_repo.delete_address(address_id, id).await?;
    Ok(Envelope::with_message("Endereço removido.", ()))
}

// ---
// Processos e itens de tarefa (modelos reutilizáveis)
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProcessPayload {
    pub parent_process_id: Option<Uuid>,
    #[validate(length(min = 1, message = "O nome do processo é obrigatório."))]
    #[schema(example = "Fundação")]
    pub name: String,
    pub description: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/processes",
    tag = "Projects",
    request_body = CreateProcessPayload,
    responses((status = 201, description = "Processo criado", body = Process)),
    params(("x-company-id" = Uuid, Header, description = "ID da empresa")),
    security(("api_jwt" = []))
)]
pub async fn create_process(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermProjectWrite>,
    Json(payload): Json<CreateProcessPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let process = app_state
        .project_repo
        .create_process(
            company.0,
            payload.parent_process_id,
            &payload.name,
            payload.description.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Envelope::ok(process)))
}

#[utoipa::path(
    get,
    path = "/api/processes",
    tag = "Projects",
    responses((status = 200, description = "Processos ativos da empresa")),
    params(("x-company-id" = Uuid, Header, description = "ID da empresa")),
    security(("api_jwt" = []))
)]
pub async fn list_processes(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermProjectRead>,
) -> Result<impl IntoResponse, AppError> {
    let processes = app_state.project_repo.list_processes(company.0).await?;
    Ok(Envelope::ok(processes))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskItemPayload {
    pub process_id: Uuid,
    #[validate(length(min = 1, message = "O nome do item é obrigatório."))]
    #[schema(example = "Concretagem da laje")]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct TaskItemListQuery {
    pub process_id: Option<Uuid>,
}

#[utoipa::path(
    post,
    path = "/api/task-items",
    tag = "Projects",
    request_body = CreateTaskItemPayload,
    responses((status = 201, description = "Item de tarefa criado", body = TaskItem)),
    params(("x-company-id" = Uuid, Header, description = "ID da empresa")),
    security(("api_jwt" = []))
)]
pub async fn create_task_item(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermProjectWrite>,
    Json(payload): Json<CreateTaskItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let item = app_state
        .project_repo
        .create_task_item(
            company.0,
            payload.process_id,
            &payload.name,
            payload.description.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Envelope::ok(item)))
}

#[utoipa::path(
    get,
    path = "/api/task-items",
    tag = "Projects",
    params(
        TaskItemListQuery,
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    responses((status = 200, description = "Itens de tarefa ativos")),
    security(("api_jwt" = []))
)]
pub async fn list_task_items(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermProjectRead>,
    Query(filter): Query<TaskItemListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let items = app_state
        .project_repo
        .list_task_items(company.0, filter.process_id)
        .await?;
    Ok(Envelope::ok(items))
}

// ---
// Tarefas do projeto
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskPayload {
    pub process_id: Option<Uuid>,
    pub task_item_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    #[validate(length(min = 1, message = "O título da tarefa é obrigatório."))]
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskPayload {
    pub assignee_id: Option<Uuid>,
    #[validate(length(min = 1, message = "O título não pode ser vazio."))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<NaiveDate>,
}

#[utoipa::path(
    post,
    path = "/api/projects/{id}/tasks",
    tag = "Projects",
    request_body = CreateTaskPayload,
    responses((status = 201, description = "Tarefa criada", body = ProjectTask)),
    params(
        ("id" = Uuid, Path, description = "ID do projeto"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_task(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermProjectWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateTaskPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    app_state
        .project_repo
        .find_project(id, company.0)
        .await?
        .ok_or(AppError::NotFound("Projeto"))?;

    let task = app_state
        .project_repo
        .create_task(
            company.0,
            id,
            payload.process_id,
            payload.task_item_id,
            payload.assignee_id,
            &payload.title,
            payload.description.as_deref(),
            payload.due_date,
        )
        .await?;
    Ok((StatusCode::CREATED, Envelope::ok(task)))
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}/tasks",
    tag = "Projects",
    params(
        PageParams,
        ("id" = Uuid, Path, description = "ID do projeto"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    responses((status = 200, description = "Tarefas ativas do projeto, paginadas")),
    security(("api_jwt" = []))
)]
pub async fn list_tasks(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermProjectRead>,
    Path(id): Path<Uuid>,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let (tasks, total) = app_state
        .project_repo
        .list_tasks(company.0, id, &page)
        .await?;
    Ok(Envelope::ok(Paginated::new(tasks, total, &page)))
}

#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    tag = "Projects",
    responses((status = 200, description = "Tarefa", body = ProjectTask)),
    params(
        ("id" = Uuid, Path, description = "ID da tarefa"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_task(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermProjectRead>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let task = app_state
        .project_repo
        .find_task(id, company.0)
        .await?
        .ok_or(AppError::NotFound("Tarefa"))?;
    Ok(Envelope::ok(task))
}

#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    tag = "Projects",
    request_body = UpdateTaskPayload,
    responses((status = 200, description = "Tarefa atualizada", body = ProjectTask)),
    params(
        ("id" = Uuid, Path, description = "ID da tarefa"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_task(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermProjectWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTaskPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let task = app_state
        .project_repo
        .update_task(
            id,
            company.0,
            payload.assignee_id,
            payload.title.as_deref(),
            payload.description.as_deref(),
            payload.status,
            payload.due_date,
        )
        .await?;
    Ok(Envelope::ok(task))
}

#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    tag = "Projects",
    responses((status = 200, description = "Tarefa desativada")),
    params(
        ("id" = Uuid, Path, description = "ID da tarefa"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_task(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermProjectWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .project_repo
        .soft_delete_task(id, company.0)
        .await?;
    Ok(Envelope::with_message("Tarefa desativada.", ()))
}
