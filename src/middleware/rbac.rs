// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::AppError, config::AppState, middleware::company::company_id_from_parts,
    models::auth::User,
};

/// 1. O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    fn slug() -> &'static str;
}

/// 2. O Extractor (Guardião)
pub struct RequirePermission<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        // A. Extrai Usuário (o auth_guard já rodou)
        let user = parts
            .extensions
            .get::<User>()
            .cloned()
            .ok_or(AppError::InvalidToken)?;

        // B. Extrai a empresa do cabeçalho
        let company_id = company_id_from_parts(parts)?;

        // C. Verifica no banco
        let required_perm = T::slug();
        let has_permission = app_state
            .rbac_repo
            .user_has_permission(user.id, company_id, required_perm)
            .await?;

        if !has_permission {
            return Err(AppError::Forbidden(format!(
                "Você precisa da permissão '{}' para realizar esta ação.",
                required_perm
            )));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

pub struct PermProjectRead;
impl PermissionDef for PermProjectRead {
    fn slug() -> &'static str {
        "project:read"
    }
}

pub struct PermProjectWrite;
impl PermissionDef for PermProjectWrite {
    fn slug() -> &'static str {
        "project:write"
    }
}

pub struct PermStockRead;
impl PermissionDef for PermStockRead {
    fn slug() -> &'static str {
        "stock:read"
    }
}

pub struct PermStockWrite;
impl PermissionDef for PermStockWrite {
    fn slug() -> &'static str {
        "stock:write"
    }
}

pub struct PermSupplierRead;
impl PermissionDef for PermSupplierRead {
    fn slug() -> &'static str {
        "supplier:read"
    }
}

pub struct PermSupplierWrite;
impl PermissionDef for PermSupplierWrite {
    fn slug() -> &'static str {
        "supplier:write"
    }
}

pub struct PermDemandRead;
impl PermissionDef for PermDemandRead {
    fn slug() -> &'static str {
        "demand:read"
    }
}

pub struct PermDemandWrite;
impl PermissionDef for PermDemandWrite {
    fn slug() -> &'static str {
        "demand:write"
    }
}

pub struct PermDemandApprove;
impl PermissionDef for PermDemandApprove {
    fn slug() -> &'static str {
        "demand:approve"
    }
}

pub struct PermPersonnelRead;
impl PermissionDef for PermPersonnelRead {
    fn slug() -> &'static str {
        "personnel:read"
    }
}

pub struct PermPersonnelWrite;
impl PermissionDef for PermPersonnelWrite {
    fn slug() -> &'static str {
        "personnel:write"
    }
}
