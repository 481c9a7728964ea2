// src/handlers/activity.rs

use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{PageParams, Paginated},
        response::Envelope,
    },
    config::AppState,
    middleware::{
        company::CompanyContext,
        rbac::{PermPersonnelRead, RequirePermission},
    },
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ActivityListQuery {
    pub user_id: Option<Uuid>,
}

#[utoipa::path(
    get,
    path = "/api/activity",
    tag = "Activity",
    params(
        ActivityListQuery,
        PageParams,
        ("x-company-id" = Uuid, Header, description = "ID da empresa")
    ),
    responses((status = 200, description = "Trilha de auditoria, mais recente primeiro")),
    security(("api_jwt" = []))
)]
pub async fn list_activity(
    State(app_state): State<AppState>,
    company: CompanyContext,
    _guard: RequirePermission<PermPersonnelRead>,
    Query(filter): Query<ActivityListQuery>,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let (logs, total) = app_state
        .activity_repo
        .list(company.0, filter.user_id, &page)
        .await?;
    Ok(Envelope::ok(Paginated::new(logs, total, &page)))
}
