// src/handlers/demands.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
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
        rbac::{PermDemandApprove, PermDemandRead, PermDemandWrite, RequirePermission},
    },
    models::auth::User,
    models::demand::{
        ApprovalStatus, Demand, DemandApproval, DemandComment, DemandDetail, DemandItem,
        DemandPriority, DemandStatus,
    },
    services::demand_service::NewDemand,
};

// ---
// Demandas
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDemandPayload {
    pub department_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    #[validate(length(min = 1, message = "O título da demanda é obrigatório."))]
    pub title: String,
    pub description: Option<String>,
    #[schema(example = "NORMAL")]
    pub priority: Option<DemandPriority>,
    pub needed_by: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDemandPayload {
    #[validate(length(min = 1, message = "O título não pode ser vazio."))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<DemandPriority>,
    pub needed_by: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DemandListQuery {
    #[param(example = "SUBMITTED")]
    pub status: Option<DemandStatus>,
    pub project_id: Option<Uuid>,
    pub search: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/demands",
    tag = "Demands",
    request_body = CreateDemandPayload,
    responses((status = 201, description = "Demanda criada em rascunho, com número gerado", body = Demand)),
    params(("x-company-id" = Uuid, Header, description = "ID da empresa")),
    security(("api_jwt" = []))
)]
pub async fn create_demand(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    company: CompanyContext,
    _guard: RequirePermission<PermDemandWrite>,
    Json(payload): Json<CreateDemandPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let demand = app_state
        .demand_service
        .create_demand(
            company.0,
            &user,
            NewDemand {
                department_id: payload.department_id,
                project_id: payload.project_id,
                title: payload.title,
                description: payload.description,
                priority: payload.priority,
                needed_by: payload.needed_by,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Envelope::ok(demand)))
}

#[utoipa::path(
    get,
    path = "/api/demands",
    tag = "Demands",
    params(
        DemandListQuery,
        PageParams,
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    responses((status = 200, description = "Demandas ativas, paginadas")),
    security(("api_jwt" = []))
)]
pub async fn list_demands(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermDemandRead>,
    Query(filter): Query<DemandListQuery>,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let (demands, total) = app_state
        .demand_repo
        .list(
            company.0,
            filter.status,
            filter.project_id,
            filter.search.as_deref(),
            &page,
        )
        .await?;
    Ok(Envelope::ok(Paginated::new(demands, total, &page)))
}

#[utoipa::path(
    get,
    path = "/api/demands/{id}",
    tag = "Demands",
    responses((status = 200, description = "Detalhe com itens, aprovações, comentários e resultado derivado", body = DemandDetail)),
    params(
        ("id" = Uuid, Path, description = "ID da demanda"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_demand(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermDemandRead>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state.demand_service.detail(id, company.0).await?;
    Ok(Envelope::ok(detail))
}

#[utoipa::path(
    put,
    path = "/api/demands/{id}",
    tag = "Demands",
    request_body = UpdateDemandPayload,
    responses((status = 200, description = "Demanda atualizada", body = Demand)),
    params(
        ("id" = Uuid, Path, description = "ID da demanda"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_demand(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    company: CompanyContext,
    _guard: RequirePermission<PermDemandWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDemandPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let demand = app_state
        .demand_repo
        .update(
            id,
            company.0,
            user.id,
            payload.title.as_deref(),
            payload.description.as_deref(),
            payload.priority,
            payload.needed_by,
        )
        .await?;
    Ok(Envelope::ok(demand))
}

#[utoipa::path(
    post,
    path = "/api/demands/{id}/submit",
    tag = "Demands",
    responses(
        (status = 200, description = "Demanda enviada para aprovação", body = Demand),
        (status = 422, description = "Demanda fora de rascunho ou sem itens")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da demanda"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn submit_demand(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    company: CompanyContext,
    _guard: RequirePermission<PermDemandWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let demand = app_state.demand_service.submit(id, company.0, &user).await?;
    Ok(Envelope::with_message("Demanda enviada para aprovação.", demand))
}

#[utoipa::path(
    post,
    path = "/api/demands/{id}/cancel",
    tag = "Demands",
    responses((status = 200, description = "Demanda cancelada", body = Demand)),
    params(
        ("id" = Uuid, Path, description = "ID da demanda"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_demand(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    company: CompanyContext,
    _guard: RequirePermission<PermDemandWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let demand = app_state
        .demand_repo
        .find(id, company.0)
        .await?
        .ok_or(AppError::NotFound("Demanda"))?;

    if demand.status == DemandStatus::Cancelled {
        return Err(AppError::Conflict("A demanda já está cancelada.".to_string()));
    }

    let demand = app_state
        .demand_repo
        .set_status(id, company.0, DemandStatus::Cancelled, user.id)
        .await?;
    Ok(Envelope::with_message("Demanda cancelada.", demand))
}

#[utoipa::path(
    delete,
    path = "/api/demands/{id}",
    tag = "Demands",
    responses((status = 200, description = "Demanda desativada")),
    params(
        ("id" = Uuid, Path, description = "ID da demanda"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_demand(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermDemandWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.demand_repo.soft_delete(id, company.0).await?;
    Ok(Envelope::with_message("Demanda desativada.", ()))
}

// ---
// Itens (só mudam enquanto a demanda está em rascunho)
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddDemandItemPayload {
    pub stock_item_id: Option<Uuid>,
    #[validate(length(min = 1, message = "O nome do item é obrigatório."))]
    pub name: String,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub estimated_price: Option<Decimal>,
    pub notes: Option<String>,
}

async fn draft_demand(
    app_state: &AppState,
    id: Uuid,
    company_id: Uuid,
) -> Result<Demand, AppError> {
    let demand = app_state
        .demand_repo
        .find(id, company_id)
        .await?
        .ok_or(AppError::NotFound("Demanda"))?;
    if demand.status != DemandStatus::Draft {
        return Err(AppError::BusinessRule(
            "Os itens só podem ser alterados enquanto a demanda está em rascunho.".to_string(),
        ));
    }
    Ok(demand)
}

#[utoipa::path(
    post,
    path = "/api/demands/{id}/items",
    tag = "Demands",
    request_body = AddDemandItemPayload,
    responses((status = 201, description = "Item adicionado", body = DemandItem)),
    params(
        ("id" = Uuid, Path, description = "ID da demanda"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_demand_item(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermDemandWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddDemandItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    if payload.quantity <= Decimal::ZERO {
        return Err(AppError::BusinessRule(
            "A quantidade do item deve ser positiva.".to_string(),
        ));
    }

    draft_demand(&app_state, id, company.0).await?;

    let item = app_state
        .demand_repo
        .add_item(
            id,
            payload.stock_item_id,
            &payload.name,
            payload.quantity,
            payload.unit.as_deref(),
            payload.estimated_price,
            payload.notes.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Envelope::ok(item)))
}

#[utoipa::path(
    delete,
    path = "/api/demands/{id}/items/{item_id}",
    tag = "Demands",
    responses((status = 200, description = "Item removido")),
    params(
        ("id" = Uuid, Path, description = "ID da demanda"),
        ("item_id" = Uuid, Path, description = "ID do item"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_demand_item(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermDemandWrite>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    draft_demand(&app_state, id, company.0).await?;
    app_state.demand_repo.delete_item(item_id, id).await?;
    Ok(Envelope::with_message("Item removido.", ()))
}

// ---
// Aprovações
// ---

// Níveis são obrigatórios por padrão, igual ao default da coluna.
fn default_is_required() -> bool {
    true
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddApprovalPayload {
    pub approver_id: Uuid,
    #[schema(example = 1)]
    pub sort_order: i32,
    #[serde(default = "default_is_required")]
    #[schema(default = true)]
    pub is_required: bool,
}

// O FK só prova que o aprovador existe em algum tenant; aqui garantimos
// que ele é da empresa da demanda.
fn approver_in_company(approver: Option<User>, company_id: Uuid) -> Result<User, AppError> {
    approver
        .filter(|u| u.company_id == company_id)
        .ok_or(AppError::NotFound("Aprovador"))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecideApprovalPayload {
    #[schema(example = "APPROVED")]
    pub decision: ApprovalStatus,
    pub notes: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/demands/{id}/approvals",
    tag = "Demands",
    request_body = AddApprovalPayload,
    responses((status = 201, description = "Nível de aprovação adicionado", body = DemandApproval)),
    params(
        ("id" = Uuid, Path, description = "ID da demanda"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_approval(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermDemandWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddApprovalPayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .demand_repo
        .find(id, company.0)
        .await?
        .ok_or(AppError::NotFound("Demanda"))?;

    let approver = app_state.user_repo.find_by_id(payload.approver_id).await?;
    let approver = approver_in_company(approver, company.0)?;

    let approval = app_state
        .demand_repo
        .add_approval(id, approver.id, payload.sort_order, payload.is_required)
        .await?;
    Ok((StatusCode::CREATED, Envelope::ok(approval)))
}

// Decide um registro de aprovação. Só o aprovador designado pode decidir,
// e cada registro é decidido uma única vez.
#[utoipa::path(
    post,
    path = "/api/demands/{id}/approvals/{approval_id}/decide",
    tag = "Demands",
    request_body = DecideApprovalPayload,
    responses(
        (status = 200, description = "Registro decidido", body = DemandApproval),
        (status = 403, description = "O registro pertence a outro aprovador"),
        (status = 409, description = "Registro já decidido")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da demanda"),
        ("approval_id" = Uuid, Path, description = "ID do registro de aprovação"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn decide_approval(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    company: CompanyContext,
    _guard: RequirePermission<PermDemandApprove>,
    Path((id, approval_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<DecideApprovalPayload>,
) -> Result<impl IntoResponse, AppError> {
    let approval = app_state
        .demand_service
        .decide_approval(
            id,
            approval_id,
            company.0,
            &user,
            payload.decision,
            payload.notes.as_deref(),
        )
        .await?;
    Ok(Envelope::ok(approval))
}

// ---
// Comentários
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentPayload {
    #[validate(length(min = 1, message = "O comentário não pode ser vazio."))]
    pub body: String,
}

#[utoipa::path(
    post,
    path = "/api/demands/{id}/comments",
    tag = "Demands",
    request_body = AddCommentPayload,
    responses((status = 201, description = "Comentário adicionado", body = DemandComment)),
    params(
        ("id" = Uuid, Path, description = "ID da demanda"),
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_comment(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    company: CompanyContext,
    _guard: RequirePermission<PermDemandRead>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddCommentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    app_state
        .demand_repo
        .find(id, company.0)
        .await?
        .ok_or(AppError::NotFound("Demanda"))?;

    let comment = app_state
        .demand_repo
        .add_comment(id, user.id, &payload.body)
        .await?;
    Ok((StatusCode::CREATED, Envelope::ok(comment)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usuario(company_id: Uuid) -> User {
        let now = chrono::Utc::now();
        User {
            id: Uuid::new_v4(),
            company_id,
            department_id: None,
            email: "aprovador@ipe.com.br".to_string(),
            password_hash: "hash".to_string(),
            full_name: "Aprovador".to_string(),
            phone: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn aprovador_de_outra_empresa_e_rejeitado() {
        let company_id = Uuid::new_v4();
        let outro = usuario(Uuid::new_v4());
        let result = approver_in_company(Some(outro), company_id);
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let result = approver_in_company(None, company_id);
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn aprovador_da_mesma_empresa_e_aceito() {
        let company_id = Uuid::new_v4();
        let aprovador = usuario(company_id);
        let id = aprovador.id;
        let result = approver_in_company(Some(aprovador), company_id).unwrap();
        assert_eq!(result.id, id);
    }

    #[test]
    fn nivel_de_aprovacao_e_obrigatorio_por_padrao() {
        let json = format!(
            r#"{{"approverId": "{}", "sortOrder": 1}}"#,
            Uuid::new_v4()
        );
        let payload: AddApprovalPayload = serde_json::from_str(&json).unwrap();
        assert!(payload.is_required);

        let json = format!(
            r#"{{"approverId": "{}", "sortOrder": 1, "isRequired": false}}"#,
            Uuid::new_v4()
        );
        let payload: AddApprovalPayload = serde_json::from_str(&json).unwrap();
        assert!(!payload.is_required);
    }
}
