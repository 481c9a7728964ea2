// src/db/activity_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError, common::pagination::PageParams, models::activity::UserActivityLog,
};

#[derive(Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        user_id: Option<Uuid>,
        company_id: Option<Uuid>,
        method: &str,
        path: &str,
        status_code: i32,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO user_activity_logs (user_id, company_id, method, path, status_code)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(company_id)
        .bind(method)
        .bind(path)
        .bind(status_code)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list(
        &self,
        company_id: Uuid,
        user_id: Option<Uuid>,
        page: &PageParams,
    ) -> Result<(Vec<UserActivityLog>, i64), AppError> {
        let logs = sqlx::query_as::<_, UserActivityLog>(
            r#"
            SELECT * FROM user_activity_logs
            WHERE company_id = $1 AND ($2::uuid IS NULL OR user_id = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(company_id)
        .bind(user_id)
        .bind(page.page_size())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_activity_logs WHERE company_id = $1 AND ($2::uuid IS NULL OR user_id = $2)",
        )
        .bind(company_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((logs, total))
    }
}
