// src/db/rbac_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::rbac::{Permission, Role},
};

#[derive(Clone)]
pub struct RbacRepository {
    pool: PgPool,
}

impl RbacRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_role<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Role, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO roles (company_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(name)
        .bind(description)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!("O cargo '{}' já existe.", name));
                }
            }
            e.into()
        })
    }

    pub async fn list_roles(&self, company_id: Uuid) -> Result<Vec<Role>, AppError> {
        let roles = sqlx::query_as::<_, Role>(
            "SELECT * FROM roles WHERE company_id = $1 ORDER BY name ASC",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(roles)
    }

    pub async fn list_permissions(&self) -> Result<Vec<Permission>, AppError> {
        let permissions =
            sqlx::query_as::<_, Permission>("SELECT * FROM permissions ORDER BY slug ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(permissions)
    }

    /// Substitui o conjunto de permissões do cargo pelos slugs informados.
    pub async fn set_role_permissions(
        &self,
        role_id: Uuid,
        company_id: Uuid,
        slugs: &[String],
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let owned: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM roles WHERE id = $1 AND company_id = $2",
        )
        .bind(role_id)
        .bind(company_id)
        .fetch_optional(&mut *tx)
        .await?;
        if owned.is_none() {
            return Err(AppError::NotFound("Cargo"));
        }

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, permission_id)
            SELECT $1, p.id FROM permissions p WHERE p.slug = ANY($2)
            "#,
        )
        .bind(role_id)
        .bind(slugs)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Concede todas as permissões conhecidas a um cargo (bootstrap do admin).
    pub async fn grant_all_permissions<'e, E>(
        &self,
        executor: E,
        role_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, permission_id)
            SELECT $1, id FROM permissions
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(role_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn user_has_permission(
        &self,
        user_id: Uuid,
        company_id: Uuid,
        slug: &str,
    ) -> Result<bool, AppError> {
        let found: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT 1 FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id AND r.company_id = $2
            JOIN role_permissions rp ON rp.role_id = r.id
            JOIN permissions p ON p.id = rp.permission_id
            WHERE ur.user_id = $1 AND p.slug = $3
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(company_id)
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(found.is_some())
    }
}
