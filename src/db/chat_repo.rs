// src/db/chat_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError, common::pagination::PageParams, models::chat::ChatMessage,
};

#[derive(Clone)]
pub struct ChatRepository {
    pool: PgPool,
}

impl ChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_message(
        &self,
        company_id: Uuid,
        task_id: Uuid,
        user_id: Uuid,
        body: &str,
    ) -> Result<ChatMessage, AppError> {
        let message = sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO chat_messages (company_id, task_id, user_id, body)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(task_id)
        .bind(user_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;
        Ok(message)
    }

    /// Histórico da tarefa, do mais antigo para o mais novo dentro da página.
    pub async fn list_by_task(
        &self,
        company_id: Uuid,
        task_id: Uuid,
        page: &PageParams,
    ) -> Result<(Vec<ChatMessage>, i64), AppError> {
        let messages = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT * FROM (
                SELECT * FROM chat_messages
                WHERE company_id = $1 AND task_id = $2
                ORDER BY created_at DESC
                LIMIT $3 OFFSET $4
            ) pagina
            ORDER BY created_at ASC
            "#,
        )
        .bind(company_id)
        .bind(task_id)
        .bind(page.page_size())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM chat_messages WHERE company_id = $1 AND task_id = $2",
        )
        .bind(company_id)
        .bind(task_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((messages, total))
    }
}
