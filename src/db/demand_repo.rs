// src/db/demand_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    common::pagination::PageParams,
    models::demand::{
        ApprovalStatus, Demand, DemandApproval, DemandComment, DemandItem, DemandPriority,
        DemandStatus,
    },
};

#[derive(Clone)]
pub struct DemandRepository {
    pool: PgPool,
}

impl DemandRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Avança o contador (empresa, ano) e devolve a nova sequência.
    /// UPSERT atômico: duas requisições concorrentes nunca recebem o mesmo
    /// número.
    pub async fn next_sequence<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        year: i32,
    ) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let seq: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO demand_counters (company_id, year, last_seq)
            VALUES ($1, $2, 1)
            ON CONFLICT (company_id, year)
            DO UPDATE SET last_seq = demand_counters.last_seq + 1
            RETURNING last_seq
            "#,
        )
        .bind(company_id)
        .bind(year)
        .fetch_one(executor)
        .await?;
        Ok(seq)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_demand<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        demand_number: &str,
        department_id: Option<Uuid>,
        project_id: Option<Uuid>,
        title: &str,
        description: Option<&str>,
        priority: DemandPriority,
        requested_by: Uuid,
        needed_by: Option<chrono::NaiveDate>,
    ) -> Result<Demand, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Demand>(
            r#"
            INSERT INTO demands
                (company_id, demand_number, department_id, project_id, title, description,
                 priority, requested_by, needed_by, created_by, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $8, $8)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(demand_number)
        .bind(department_id)
        .bind(project_id)
        .bind(title)
        .bind(description)
        .bind(priority)
        .bind(requested_by)
        .bind(needed_by)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!(
                        "O número de demanda '{}' já existe.",
                        demand_number
                    ));
                }
            }
            e.into()
        })
    }

    pub async fn list(
        &self,
        company_id: Uuid,
        status: Option<DemandStatus>,
        project_id: Option<Uuid>,
        search: Option<&str>,
        page: &PageParams,
    ) -> Result<(Vec<Demand>, i64), AppError> {
        let demands = sqlx::query_as::<_, Demand>(
            r#"
            SELECT * FROM demands
            WHERE company_id = $1
              AND is_active = TRUE
              AND ($2::demand_status IS NULL OR status = $2)
              AND ($3::uuid IS NULL OR project_id = $3)
              AND ($4::text IS NULL OR title ILIKE '%' || $4 || '%' OR demand_number ILIKE '%' || $4 || '%')
            ORDER BY created_at DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(company_id)
        .bind(status)
        .bind(project_id)
        .bind(search)
        .bind(page.page_size())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM demands
            WHERE company_id = $1
              AND is_active = TRUE
              AND ($2::demand_status IS NULL OR status = $2)
              AND ($3::uuid IS NULL OR project_id = $3)
              AND ($4::text IS NULL OR title ILIKE '%' || $4 || '%' OR demand_number ILIKE '%' || $4 || '%')
            "#,
        )
        .bind(company_id)
        .bind(status)
        .bind(project_id)
        .bind(search)
        .fetch_one(&self.pool)
        .await?;

        Ok((demands, total))
    }

    pub async fn find(&self, id: Uuid, company_id: Uuid) -> Result<Option<Demand>, AppError> {
        let demand = sqlx::query_as::<_, Demand>(
            "SELECT * FROM demands WHERE id = $1 AND company_id = $2",
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(demand)
    }

    pub async fn update(
        &self,
        id: Uuid,
        company_id: Uuid,
        updated_by: Uuid,
        title: Option<&str>,
        description: Option<&str>,
        priority: Option<DemandPriority>,
        needed_by: Option<chrono::NaiveDate>,
    ) -> Result<Demand, AppError> {
        sqlx::query_as::<_, Demand>(
            r#"
            UPDATE demands SET
                title = COALESCE($4, title),
                description = COALESCE($5, description),
                priority = COALESCE($6, priority),
                needed_by = COALESCE($7, needed_by),
                updated_by = $3,
                updated_at = now()
            WHERE id = $1 AND company_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(company_id)
        .bind(updated_by)
        .bind(title)
        .bind(description)
        .bind(priority)
        .bind(needed_by)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Demanda"))
    }

    pub async fn set_status(
        &self,
        id: Uuid,
        company_id: Uuid,
        status: DemandStatus,
        updated_by: Uuid,
    ) -> Result<Demand, AppError> {
        sqlx::query_as::<_, Demand>(
            r#"
            UPDATE demands SET status = $3, updated_by = $4, updated_at = now()
            WHERE id = $1 AND company_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(company_id)
        .bind(status)
        .bind(updated_by)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Demanda"))
    }

    pub async fn soft_delete(&self, id: Uuid, company_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE demands SET is_active = FALSE, updated_at = now() WHERE id = $1 AND company_id = $2",
        )
        .bind(id)
        .bind(company_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Demanda"));
        }
        Ok(())
    }

    // ---
    // Itens
    // ---

    pub async fn add_item(
        &self,
        demand_id: Uuid,
        stock_item_id: Option<Uuid>,
        name: &str,
        quantity: Decimal,
        unit: Option<&str>,
        estimated_price: Option<Decimal>,
        notes: Option<&str>,
    ) -> Result<DemandItem, AppError> {
        let item = sqlx::query_as::<_, DemandItem>(
            r#"
            INSERT INTO demand_items
                (demand_id, stock_item_id, name, quantity, unit, estimated_price, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(demand_id)
        .bind(stock_item_id)
        .bind(name)
        .bind(quantity)
        .bind(unit)
        .bind(estimated_price)
        .bind(notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(item)
    }

    pub async fn list_items(&self, demand_id: Uuid) -> Result<Vec<DemandItem>, AppError> {
        let items = sqlx::query_as::<_, DemandItem>(
            "SELECT * FROM demand_items WHERE demand_id = $1 ORDER BY created_at ASC",
        )
        .bind(demand_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn count_items(&self, demand_id: Uuid) -> Result<i64, AppError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM demand_items WHERE demand_id = $1")
                .bind(demand_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(total)
    }

    pub async fn delete_item(&self, id: Uuid, demand_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM demand_items WHERE id = $1 AND demand_id = $2")
            .bind(id)
            .bind(demand_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Item da demanda"));
        }
        Ok(())
    }

    // ---
    // Aprovações
    // ---

    pub async fn add_approval(
        &self,
        demand_id: Uuid,
        approver_id: Uuid,
        sort_order: i32,
        is_required: bool,
    ) -> Result<DemandApproval, AppError> {
        sqlx::query_as::<_, DemandApproval>(
            r#"
            INSERT INTO demand_approvals (demand_id, approver_id, sort_order, is_required)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(demand_id)
        .bind(approver_id)
        .bind(sort_order)
        .bind(is_required)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!(
                        "Já existe um nível de aprovação {} nesta demanda.",
                        sort_order
                    ));
                }
            }
            e.into()
        })
    }

    pub async fn list_approvals(&self, demand_id: Uuid) -> Result<Vec<DemandApproval>, AppError> {
        let approvals = sqlx::query_as::<_, DemandApproval>(
            "SELECT * FROM demand_approvals WHERE demand_id = $1 ORDER BY sort_order ASC",
        )
        .bind(demand_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(approvals)
    }

    pub async fn find_approval(
        &self,
        id: Uuid,
        demand_id: Uuid,
    ) -> Result<Option<DemandApproval>, AppError> {
        let approval = sqlx::query_as::<_, DemandApproval>(
            "SELECT * FROM demand_approvals WHERE id = $1 AND demand_id = $2",
        )
        .bind(id)
        .bind(demand_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(approval)
    }

    /// Decide UM registro: grava status e data apenas nessa linha.
    /// Nenhuma outra linha é tocada (não há gating sequencial).
    pub async fn decide_approval(
        &self,
        id: Uuid,
        demand_id: Uuid,
        status: ApprovalStatus,
        notes: Option<&str>,
    ) -> Result<DemandApproval, AppError> {
        sqlx::query_as::<_, DemandApproval>(
            r#"
            UPDATE demand_approvals SET
                status = $3,
                approval_date = now(),
                notes = COALESCE($4, notes)
            WHERE id = $1 AND demand_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(demand_id)
        .bind(status)
        .bind(notes)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Registro de aprovação"))
    }

    // ---
    // Comentários (append-only)
    // ---

    pub async fn add_comment(
        &self,
        demand_id: Uuid,
        user_id: Uuid,
        body: &str,
    ) -> Result<DemandComment, AppError> {
        let comment = sqlx::query_as::<_, DemandComment>(
            r#"
            INSERT INTO demand_comments (demand_id, user_id, body)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(demand_id)
        .bind(user_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;
        Ok(comment)
    }

    pub async fn list_comments(&self, demand_id: Uuid) -> Result<Vec<DemandComment>, AppError> {
        let comments = sqlx::query_as::<_, DemandComment>(
            "SELECT * FROM demand_comments WHERE demand_id = $1 ORDER BY created_at ASC",
        )
        .bind(demand_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }
}
