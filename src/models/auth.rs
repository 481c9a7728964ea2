// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Representa um usuário vindo do banco de dados.
// Um usuário pertence a exatamente uma empresa (e opcionalmente a um
// departamento dela).
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub company_id: Uuid,
    pub department_id: Option<Uuid>,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    pub full_name: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Registro bootstrap: cria a empresa e o primeiro usuário (administrador)
// na mesma transação.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    #[validate(length(min = 1, message = "O nome da empresa é obrigatório."))]
    pub company_name: String,

    // Código curto da empresa, usado na numeração de demandas.
    #[validate(length(min = 2, max = 8, message = "O código da empresa deve ter entre 2 e 8 caracteres."))]
    pub company_code: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,

    #[validate(length(min = 1, message = "O nome completo é obrigatório."))]
    pub full_name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registro_valido() -> RegisterPayload {
        RegisterPayload {
            company_name: "Construtora Ipê".to_string(),
            company_code: "IPE".to_string(),
            email: "admin@ipe.com.br".to_string(),
            password: "segredo123".to_string(),
            full_name: "Ana Souza".to_string(),
        }
    }

    #[test]
    fn registro_valido_passa_na_validacao() {
        assert!(registro_valido().validate().is_ok());
    }

    #[test]
    fn email_invalido_e_rejeitado() {
        let mut payload = registro_valido();
        payload.email = "nao-e-um-email".to_string();
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn senha_curta_e_rejeitada() {
        let mut payload = registro_valido();
        payload.password = "12345".to_string();
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn codigo_da_empresa_tem_limites_de_tamanho() {
        let mut payload = registro_valido();
        payload.company_code = "X".to_string();
        assert!(payload.validate().is_err());

        payload.company_code = "MUITOLONGO".to_string();
        assert!(payload.validate().is_err());
    }
}
