// src/db/supplier_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError, common::pagination::PageParams, models::supplier::Supplier,
};

#[derive(Clone)]
pub struct SupplierRepository {
    pool: PgPool,
}

impl SupplierRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Cria o fornecedor já vinculado à empresa que o cadastrou
    /// (o cadastro é global, o vínculo é N:N).
    pub async fn create(
        &self,
        company_id: Uuid,
        name: &str,
        tax_number: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<Supplier, AppError> {
        let mut tx = self.pool.begin().await?;

        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (name, tax_number, email, phone, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(tax_number)
        .bind(email)
        .bind(phone)
        .bind(address)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO supplier_companies (supplier_id, company_id) VALUES ($1, $2)")
            .bind(supplier.id)
            .bind(company_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(supplier)
    }

    pub async fn list(
        &self,
        company_id: Uuid,
        search: Option<&str>,
        page: &PageParams,
    ) -> Result<(Vec<Supplier>, i64), AppError> {
        let suppliers = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT s.* FROM suppliers s
            JOIN supplier_companies sc ON sc.supplier_id = s.id
            WHERE sc.company_id = $1
              AND s.is_active = TRUE
              AND ($2::text IS NULL OR s.name ILIKE '%' || $2 || '%')
            ORDER BY s.name ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(company_id)
        .bind(search)
        .bind(page.page_size())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM suppliers s
            JOIN supplier_companies sc ON sc.supplier_id = s.id
            WHERE sc.company_id = $1
              AND s.is_active = TRUE
              AND ($2::text IS NULL OR s.name ILIKE '%' || $2 || '%')
            "#,
        )
        .bind(company_id)
        .bind(search)
        .fetch_one(&self.pool)
        .await?;

        Ok((suppliers, total))
    }

    /// Busca direta por id exige o vínculo com a empresa, mas ignora is_active.
    pub async fn find(&self, id: Uuid, company_id: Uuid) -> Result<Option<Supplier>, AppError> {
        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT s.* FROM suppliers s
            JOIN supplier_companies sc ON sc.supplier_id = s.id
            WHERE s.id = $1 AND sc.company_id = $2
            "#,
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(supplier)
    }

    pub async fn update(
        &self,
        id: Uuid,
        company_id: Uuid,
        name: Option<&str>,
        tax_number: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<Supplier, AppError> {
        sqlx::query_as::<_, Supplier>(
            r#"
            UPDATE suppliers s SET
                name = COALESCE($3, s.name),
                tax_number = COALESCE($4, s.tax_number),
                email = COALESCE($5, s.email),
                phone = COALESCE($6, s.phone),
                address = COALESCE($7, s.address),
                updated_at = now()
            FROM supplier_companies sc
            WHERE s.id = $1 AND sc.supplier_id = s.id AND sc.company_id = $2
            RETURNING s.*
            "#,
        )
        .bind(id)
        .bind(company_id)
        .bind(name)
        .bind(tax_number)
        .bind(email)
        .bind(phone)
        .bind(address)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Fornecedor"))
    }

    pub async fn soft_delete(&self, id: Uuid, company_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE suppliers s SET is_active = FALSE, updated_at = now()
            FROM supplier_companies sc
            WHERE s.id = $1 AND sc.supplier_id = s.id AND sc.company_id = $2
            "#,
        )
        .bind(id)
        .bind(company_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Fornecedor"));
        }
        Ok(())
    }

    /// Vincula um fornecedor existente a outra empresa.
    pub async fn link_company(&self, supplier_id: Uuid, company_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO supplier_companies (supplier_id, company_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(supplier_id)
        .bind(company_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
