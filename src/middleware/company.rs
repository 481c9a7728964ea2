// src/middleware/company.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::User};

// O nome do nosso cabeçalho HTTP customizado
pub const COMPANY_ID_HEADER: &str = "x-company-id";

// Extrator do contexto de empresa. Lê o X-Company-Id e confere que o
// usuário autenticado pertence àquela empresa; tudo que vem depois pode
// confiar no escopo.
#[derive(Debug, Clone, Copy)]
pub struct CompanyContext(pub Uuid);

pub(crate) fn company_id_from_parts(parts: &Parts) -> Result<Uuid, AppError> {
    let value = parts
        .headers
        .get(COMPANY_ID_HEADER)
        .ok_or_else(|| AppError::BusinessRule("O cabeçalho X-Company-Id é obrigatório.".to_string()))?;

    let value_str = value.to_str().map_err(|_| {
        AppError::BusinessRule("Cabeçalho X-Company-Id contém caracteres inválidos.".to_string())
    })?;

    Uuid::parse_str(value_str).map_err(|_| {
        AppError::BusinessRule("Cabeçalho X-Company-Id inválido (não é um UUID).".to_string())
    })
}

impl<S> FromRequestParts<S> for CompanyContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let company_id = company_id_from_parts(parts)?;

        // O auth_guard precisa ter rodado antes.
        let user = parts
            .extensions
            .get::<User>()
            .ok_or(AppError::InvalidToken)?;

        if user.company_id != company_id {
            return Err(AppError::Forbidden(
                "Você não pertence a esta empresa.".to_string(),
            ));
        }

        Ok(CompanyContext(company_id))
    }
}
