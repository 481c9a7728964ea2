// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{RbacRepository, TenancyRepository, UserRepository},
    models::auth::{Claims, RegisterPayload, User},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    tenancy_repo: TenancyRepository,
    rbac_repo: RbacRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        tenancy_repo: TenancyRepository,
        rbac_repo: RbacRepository,
        jwt_secret: String,
        pool: PgPool,
    ) -> Self {
        Self {
            user_repo,
            tenancy_repo,
            rbac_repo,
            jwt_secret,
            pool,
        }
    }

    /// Registro bootstrap: empresa + primeiro usuário + cargo Administrador
    /// com todas as permissões, tudo na MESMA transação. Se qualquer passo
    /// falhar, nada fica pela metade.
    pub async fn register(&self, payload: &RegisterPayload) -> Result<String, AppError> {
        // O hashing é pesado; roda fora da transação, em thread separada.
        let password_clone = payload.password.clone();
        let hashed_password =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let mut tx = self.pool.begin().await?;

        let company = self
            .tenancy_repo
            .create_company(&mut *tx, &payload.company_name, &payload.company_code, None)
            .await?;

        let user = self
            .user_repo
            .create_user(
                &mut *tx,
                company.id,
                None,
                &payload.email,
                &hashed_password,
                &payload.full_name,
                None,
            )
            .await?;

        let admin_role = self
            .rbac_repo
            .create_role(&mut *tx, company.id, "Administrador", Some("Acesso total"))
            .await?;

        self.rbac_repo
            .grant_all_permissions(&mut *tx, admin_role.id)
            .await?;

        self.user_repo
            .assign_role_tx(&mut *tx, user.id, admin_role.id)
            .await?;

        tx.commit().await?;

        tracing::info!("🏢 Empresa '{}' registrada (admin: {})", company.name, user.email);

        self.create_token(user.id)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AppError::InvalidCredentials);
        }

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em uma thread separada
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(user.id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AppError::InvalidToken)
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // O create_token/decode não dependem do banco; dá para testar o ciclo
    // do JWT com um segredo fixo.
    #[test]
    fn token_carrega_o_id_do_usuario() {
        let secret = "segredo-de-teste";
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            exp: (now + chrono::Duration::days(1)).timestamp() as usize,
            iat: now.timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
        .unwrap();

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(secret.as_ref()),
            &Validation::default(),
        )
        .unwrap();

        assert_eq!(decoded.claims.sub, user_id);
    }

    #[test]
    fn token_expirado_e_rejeitado() {
        let secret = "segredo-de-teste";
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::new_v4(),
            exp: (now - chrono::Duration::hours(2)).timestamp() as usize,
            iat: (now - chrono::Duration::days(1)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
        .unwrap();

        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(secret.as_ref()),
            &Validation::default(),
        );
        assert!(result.is_err());
    }
}
