// src/db/tenancy_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::tenancy::{Company, Department},
};

#[derive(Clone)]
pub struct TenancyRepository {
    pool: PgPool,
}

impl TenancyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Cria a empresa. Participa da transação de registro.
    pub async fn create_company<'e, E>(
        &self,
        executor: E,
        name: &str,
        code: &str,
        tax_number: Option<&str>,
    ) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (name, code, tax_number)
            VALUES ($1, upper($2), $3)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(code)
        .bind(tax_number)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!("O código de empresa '{}' já está em uso.", code));
                }
            }
            e.into()
        })
    }

    pub async fn find_company(&self, id: Uuid) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(company)
    }

    pub async fn update_company(
        &self,
        id: Uuid,
        name: Option<&str>,
        tax_number: Option<&str>,
    ) -> Result<Company, AppError> {
        sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies SET
                name = COALESCE($2, name),
                tax_number = COALESCE($3, tax_number),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(tax_number)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Empresa"))
    }

    // ---
    // Departamentos
    // ---

    pub async fn create_department(
        &self,
        company_id: Uuid,
        name: &str,
    ) -> Result<Department, AppError> {
        sqlx::query_as::<_, Department>(
            r#"
            INSERT INTO departments (company_id, name)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!("O departamento '{}' já existe.", name));
                }
            }
            e.into()
        })
    }

    pub async fn list_departments(&self, company_id: Uuid) -> Result<Vec<Department>, AppError> {
        let departments = sqlx::query_as::<_, Department>(
            "SELECT * FROM departments WHERE company_id = $1 AND is_active = TRUE ORDER BY name ASC",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(departments)
    }

    pub async fn find_department(
        &self,
        id: Uuid,
        company_id: Uuid,
    ) -> Result<Option<Department>, AppError> {
        let department = sqlx::query_as::<_, Department>(
            "SELECT * FROM departments WHERE id = $1 AND company_id = $2",
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(department)
    }

    pub async fn update_department(
        &self,
        id: Uuid,
        company_id: Uuid,
        name: Option<&str>,
    ) -> Result<Department, AppError> {
        sqlx::query_as::<_, Department>(
            r#"
            UPDATE departments SET
                name = COALESCE($3, name),
                updated_at = now()
            WHERE id = $1 AND company_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(company_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Departamento"))
    }

    pub async fn soft_delete_department(&self, id: Uuid, company_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE departments SET is_active = FALSE, updated_at = now() WHERE id = $1 AND company_id = $2",
        )
        .bind(id)
        .bind(company_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Departamento"));
        }
        Ok(())
    }
}
