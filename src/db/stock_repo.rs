// src/db/stock_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    common::pagination::PageParams,
    models::stock::{
        MovementType, StockAlert, StockBalance, StockCategory, StockItem, StockLocation,
        StockLot, StockMovement,
    },
};

#[derive(Clone)]
pub struct StockRepository {
    pool: PgPool,
}

impl StockRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Cadastro: categorias, locais e itens
    // ---

    pub async fn create_category(
        &self,
        company_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> Result<StockCategory, AppError> {
        sqlx::query_as::<_, StockCategory>(
            r#"
            INSERT INTO stock_categories (company_id, parent_id, name)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(parent_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!("A categoria '{}' já existe.", name));
                }
            }
            e.into()
        })
    }

    pub async fn list_categories(&self, company_id: Uuid) -> Result<Vec<StockCategory>, AppError> {
        let categories = sqlx::query_as::<_, StockCategory>(
            "SELECT * FROM stock_categories WHERE company_id = $1 AND is_active = TRUE ORDER BY name ASC",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    pub async fn create_location(
        &self,
        company_id: Uuid,
        name: &str,
        code: Option<&str>,
    ) -> Result<StockLocation, AppError> {
        sqlx::query_as::<_, StockLocation>(
            r#"
            INSERT INTO stock_locations (company_id, name, code)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(name)
        .bind(code)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!("O local '{}' já existe.", name));
                }
            }
            e.into()
        })
    }

    /// Versão com executor, usada na transação de movimentação para
    /// garantir que o local pertence à empresa.
    pub async fn find_location_tx<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        company_id: Uuid,
    ) -> Result<Option<StockLocation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let location = sqlx::query_as::<_, StockLocation>(
            "SELECT * FROM stock_locations WHERE id = $1 AND company_id = $2",
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(executor)
        .await?;
        Ok(location)
    }

    pub async fn list_locations(&self, company_id: Uuid) -> Result<Vec<StockLocation>, AppError> {
        let locations = sqlx::query_as::<_, StockLocation>(
            "SELECT * FROM stock_locations WHERE company_id = $1 AND is_active = TRUE ORDER BY name ASC",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(locations)
    }

    pub async fn create_item(
        &self,
        company_id: Uuid,
        created_by: Uuid,
        category_id: Option<Uuid>,
        code: &str,
        name: &str,
        description: Option<&str>,
        unit: Option<&str>,
        minimum_quantity: Decimal,
    ) -> Result<StockItem, AppError> {
        sqlx::query_as::<_, StockItem>(
            r#"
            INSERT INTO stock_items
                (company_id, category_id, code, name, description, unit, minimum_quantity, created_by, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(category_id)
        .bind(code)
        .bind(name)
        .bind(description)
        .bind(unit)
        .bind(minimum_quantity)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!("O código de item '{}' já existe.", code));
                }
            }
            e.into()
        })
    }

    pub async fn list_items(
        &self,
        company_id: Uuid,
        search: Option<&str>,
        category_id: Option<Uuid>,
        page: &PageParams,
    ) -> Result<(Vec<StockItem>, i64), AppError> {
        let items = sqlx::query_as::<_, StockItem>(
            r#"
            SELECT * FROM stock_items
            WHERE company_id = $1
              AND is_active = TRUE
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%' OR code ILIKE '%' || $2 || '%')
              AND ($3::uuid IS NULL OR category_id = $3)
            ORDER BY name ASC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(company_id)
        .bind(search)
        .bind(category_id)
        .bind(page.page_size())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM stock_items
            WHERE company_id = $1
              AND is_active = TRUE
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%' OR code ILIKE '%' || $2 || '%')
              AND ($3::uuid IS NULL OR category_id = $3)
            "#,
        )
        .bind(company_id)
        .bind(search)
        .bind(category_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((items, total))
    }

    pub async fn find_item(
        &self,
        id: Uuid,
        company_id: Uuid,
    ) -> Result<Option<StockItem>, AppError> {
        let item = sqlx::query_as::<_, StockItem>(
            "SELECT * FROM stock_items WHERE id = $1 AND company_id = $2",
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    /// Versão com executor, usada dentro da transação de movimentação
    /// (precisamos do minimum_quantity para decidir o alerta).
    pub async fn find_item_tx<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        company_id: Uuid,
    ) -> Result<Option<StockItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, StockItem>(
            "SELECT * FROM stock_items WHERE id = $1 AND company_id = $2",
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(executor)
        .await?;
        Ok(item)
    }

    pub async fn update_item(
        &self,
        id: Uuid,
        company_id: Uuid,
        updated_by: Uuid,
        category_id: Option<Uuid>,
        name: Option<&str>,
        description: Option<&str>,
        unit: Option<&str>,
        minimum_quantity: Option<Decimal>,
    ) -> Result<StockItem, AppError> {
        sqlx::query_as::<_, StockItem>(
            r#"
            UPDATE stock_items SET
                category_id = COALESCE($4, category_id),
                name = COALESCE($5, name),
                description = COALESCE($6, description),
                unit = COALESCE($7, unit),
                minimum_quantity = COALESCE($8, minimum_quantity),
                updated_by = $3,
                updated_at = now()
            WHERE id = $1 AND company_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(company_id)
        .bind(updated_by)
        .bind(category_id)
        .bind(name)
        .bind(description)
        .bind(unit)
        .bind(minimum_quantity)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Item de estoque"))
    }

    pub async fn soft_delete_item(&self, id: Uuid, company_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE stock_items SET is_active = FALSE, updated_at = now() WHERE id = $1 AND company_id = $2",
        )
        .bind(id)
        .bind(company_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Item de estoque"));
        }
        Ok(())
    }

    // ---
    // Saldos (escritas sempre dentro da transação da movimentação)
    // ---

    /// Busca o saldo com FOR UPDATE, travando a linha até o fim da transação.
    pub async fn get_balance_for_update<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        item_id: Uuid,
        location_id: Uuid,
    ) -> Result<Option<StockBalance>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let balance = sqlx::query_as::<_, StockBalance>(
            r#"
            SELECT * FROM stock_balances
            WHERE company_id = $1 AND item_id = $2 AND location_id = $3
            FOR UPDATE
            "#,
        )
        .bind(company_id)
        .bind(item_id)
        .bind(location_id)
        .fetch_optional(executor)
        .await?;
        Ok(balance)
    }

    /// UPSERT do saldo: cria a linha (item, local) se não existir e aplica o
    /// delta. A invariante available = current - reserved é recalculada na
    /// própria query, nunca em código separado.
    pub async fn apply_balance_delta<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        item_id: Uuid,
        location_id: Uuid,
        quantity_delta: Decimal,
    ) -> Result<StockBalance, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let balance = sqlx::query_as::<_, StockBalance>(
            r#"
            INSERT INTO stock_balances
                (company_id, item_id, location_id, current_quantity, reserved_quantity,
                 available_quantity, last_movement_at, updated_at)
            VALUES ($1, $2, $3, $4, 0, $4, now(), now())
            ON CONFLICT (company_id, item_id, location_id)
            DO UPDATE SET
                current_quantity = stock_balances.current_quantity + $4,
                available_quantity = stock_balances.current_quantity + $4 - stock_balances.reserved_quantity,
                last_movement_at = now(),
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(item_id)
        .bind(location_id)
        .bind(quantity_delta)
        .fetch_one(executor)
        .await?;
        Ok(balance)
    }

    pub async fn list_balances(
        &self,
        company_id: Uuid,
        item_id: Option<Uuid>,
        location_id: Option<Uuid>,
        page: &PageParams,
    ) -> Result<(Vec<StockBalance>, i64), AppError> {
        let balances = sqlx::query_as::<_, StockBalance>(
            r#"
            SELECT * FROM stock_balances
            WHERE company_id = $1
              AND ($2::uuid IS NULL OR item_id = $2)
              AND ($3::uuid IS NULL OR location_id = $3)
            ORDER BY updated_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(company_id)
        .bind(item_id)
        .bind(location_id)
        .bind(page.page_size())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM stock_balances
            WHERE company_id = $1
              AND ($2::uuid IS NULL OR item_id = $2)
              AND ($3::uuid IS NULL OR location_id = $3)
            "#,
        )
        .bind(company_id)
        .bind(item_id)
        .bind(location_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((balances, total))
    }

    // ---
    // Movimentações (livro-razão imutável)
    // ---

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_movement<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        item_id: Uuid,
        location_id: Uuid,
        target_location_id: Option<Uuid>,
        movement_type: MovementType,
        quantity: Decimal,
        unit_cost: Option<Decimal>,
        lot_number: Option<&str>,
        document_number: Option<&str>,
        notes: Option<&str>,
        created_by: Uuid,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movement = sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO stock_movements
                (company_id, item_id, location_id, target_location_id, movement_type,
                 quantity, unit_cost, lot_number, document_number, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(item_id)
        .bind(location_id)
        .bind(target_location_id)
        .bind(movement_type)
        .bind(quantity)
        .bind(unit_cost)
        .bind(lot_number)
        .bind(document_number)
        .bind(notes)
        .bind(created_by)
        .fetch_one(executor)
        .await?;
        Ok(movement)
    }

    pub async fn list_movements(
        &self,
        company_id: Uuid,
        item_id: Option<Uuid>,
        location_id: Option<Uuid>,
        page: &PageParams,
    ) -> Result<(Vec<StockMovement>, i64), AppError> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT * FROM stock_movements
            WHERE company_id = $1
              AND ($2::uuid IS NULL OR item_id = $2)
              AND ($3::uuid IS NULL OR location_id = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(company_id)
        .bind(item_id)
        .bind(location_id)
        .bind(page.page_size())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM stock_movements
            WHERE company_id = $1
              AND ($2::uuid IS NULL OR item_id = $2)
              AND ($3::uuid IS NULL OR location_id = $3)
            "#,
        )
        .bind(company_id)
        .bind(item_id)
        .bind(location_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((movements, total))
    }

    // ---
    // Lotes
    // ---

    /// UPSERT do lote: soma o delta na quantidade (negativo consome).
    pub async fn apply_lot_delta<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        item_id: Uuid,
        location_id: Uuid,
        lot_number: &str,
        quantity_delta: Decimal,
        expiration_date: Option<chrono::NaiveDate>,
    ) -> Result<StockLot, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lot = sqlx::query_as::<_, StockLot>(
            r#"
            INSERT INTO stock_lots
                (company_id, item_id, location_id, lot_number, quantity, expiration_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (company_id, item_id, location_id, lot_number)
            DO UPDATE SET
                quantity = stock_lots.quantity + $5,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(item_id)
        .bind(location_id)
        .bind(lot_number)
        .bind(quantity_delta)
        .bind(expiration_date)
        .fetch_one(executor)
        .await?;
        Ok(lot)
    }

    /// Lotes com saldo positivo, do mais antigo para o mais novo (FIFO).
    pub async fn lots_for_consumption<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        item_id: Uuid,
        location_id: Uuid,
    ) -> Result<Vec<StockLot>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lots = sqlx::query_as::<_, StockLot>(
            r#"
            SELECT * FROM stock_lots
            WHERE company_id = $1 AND item_id = $2 AND location_id = $3 AND quantity > 0
            ORDER BY created_at ASC
            FOR UPDATE
            "#,
        )
        .bind(company_id)
        .bind(item_id)
        .bind(location_id)
        .fetch_all(executor)
        .await?;
        Ok(lots)
    }

    pub async fn list_lots(
        &self,
        company_id: Uuid,
        item_id: Option<Uuid>,
    ) -> Result<Vec<StockLot>, AppError> {
        let lots = sqlx::query_as::<_, StockLot>(
            r#"
            SELECT * FROM stock_lots
            WHERE company_id = $1 AND ($2::uuid IS NULL OR item_id = $2)
            ORDER BY created_at ASC
            "#,
        )
        .bind(company_id)
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lots)
    }

    // ---
    // Alertas
    // ---

    pub async fn insert_alert<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        item_id: Uuid,
        location_id: Uuid,
        message: &str,
        current_quantity: Decimal,
        minimum_quantity: Decimal,
    ) -> Result<StockAlert, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let alert = sqlx::query_as::<_, StockAlert>(
            r#"
            INSERT INTO stock_alerts
                (company_id, item_id, location_id, message, current_quantity, minimum_quantity)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(item_id)
        .bind(location_id)
        .bind(message)
        .bind(current_quantity)
        .bind(minimum_quantity)
        .fetch_one(executor)
        .await?;
        Ok(alert)
    }

    pub async fn list_alerts(
        &self,
        company_id: Uuid,
        only_unresolved: bool,
    ) -> Result<Vec<StockAlert>, AppError> {
        let alerts = sqlx::query_as::<_, StockAlert>(
            r#"
            SELECT * FROM stock_alerts
            WHERE company_id = $1 AND ($2 = FALSE OR is_resolved = FALSE)
            ORDER BY created_at DESC
            "#,
        )
        .bind(company_id)
        .bind(only_unresolved)
        .fetch_all(&self.pool)
        .await?;
        Ok(alerts)
    }

    pub async fn resolve_alert(&self, id: Uuid, company_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE stock_alerts SET is_resolved = TRUE WHERE id = $1 AND company_id = $2",
        )
        .bind(id)
        .bind(company_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Alerta"));
        }
        Ok(())
    }
}
