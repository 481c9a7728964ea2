// src/db/project_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    common::pagination::PageParams,
    models::project::{Process, Project, ProjectAddress, ProjectTask, TaskItem, TaskStatus},
};

#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Projetos
    // ---

    pub async fn create_project(
        &self,
        company_id: Uuid,
        created_by: Uuid,
        name: &str,
        code: Option<&str>,
        description: Option<&str>,
        start_date: Option<chrono::NaiveDate>,
        end_date: Option<chrono::NaiveDate>,
    ) -> Result<Project, AppError> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (company_id, name, code, description, start_date, end_date, created_by, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(name)
        .bind(code)
        .bind(description)
        .bind(start_date)
        .bind(end_date)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(project)
    }

    pub async fn list_projects(
        &self,
        company_id: Uuid,
        search: Option<&str>,
        page: &PageParams,
    ) -> Result<(Vec<Project>, i64), AppError> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT * FROM projects
            WHERE company_id = $1
              AND is_active = TRUE
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
            ORDER BY created_at DESC
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
            SELECT COUNT(*) FROM projects
            WHERE company_id = $1
              AND is_active = TRUE
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
            "#,
        )
        .bind(company_id)
        .bind(search)
        .fetch_one(&self.pool)
        .await?;

        Ok((projects, total))
    }

    pub async fn find_project(
        &self,
        id: Uuid,
        company_id: Uuid,
    ) -> Result<Option<Project>, AppError> {
        let project = sqlx::query_as::<_, Project>(
            "SELECT * FROM projects WHERE id = $1 AND company_id = $2",
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(project)
    }

    pub async fn update_project(
        &self,
        id: Uuid,
        company_id: Uuid,
        updated_by: Uuid,
        name: Option<&str>,
        code: Option<&str>,
        description: Option<&str>,
        start_date: Option<chrono::NaiveDate>,
        end_date: Option<chrono::NaiveDate>,
    ) -> Result<Project, AppError> {
        sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects SET
                name = COALESCE($4, name),
                code = COALESCE($5, code),
                description = COALESCE($6, description),
                start_date = COALESCE($7, start_date),
                end_date = COALESCE($8, end_date),
                updated_by = $3,
                updated_at = now()
            WHERE id = $1 AND company_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(company_id)
        .bind(updated_by)
        .bind(name)
        .bind(code)
        .bind(description)
        .bind(start_date)
        .bind(end_date)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Projeto"))
    }

    pub async fn soft_delete_project(&self, id: Uuid, company_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE projects SET is_active = FALSE, updated_at = now() WHERE id = $1 AND company_id = $2",
        )
        .bind(id)
        .bind(company_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Projeto"));
        }
        Ok(())
    }

    // ---
    // Endereços (filhos do projeto, exclusão física)
    // ---

    pub async fn add_address(
        &self,
        project_id: Uuid,
        address_line: &str,
        city: Option<&str>,
        country: Option<&str>,
    ) -> Result<ProjectAddress, AppError> {
        let address = sqlx::query_as::<_, ProjectAddress>(
            r#"
            INSERT INTO project_addresses (project_id, address_line, city, country)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(project_id)
        .bind(address_line)
        .bind(city)
        .bind(country)
        .fetch_one(&self.pool)
        .await?;
        Ok(address)
    }

    pub async fn list_addresses(&self, project_id: Uuid) -> Result<Vec<ProjectAddress>, AppError> {
        let addresses = sqlx::query_as::<_, ProjectAddress>(
            "SELECT * FROM project_addresses WHERE project_id = $1 ORDER BY created_at ASC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(addresses)
    }

    pub async fn delete_address(&self, id: Uuid, project_id: Uuid) -> Result<(), AppError> {
        let result =
            sqlx::query("DELETE FROM project_addresses WHERE id = $1 AND project_id = $2")
                .bind(id)
                .bind(project_id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Endereço"));
        }
        Ok(())
    }

    // ---
    // Processos e Itens de Tarefa (modelos reutilizáveis)
    // ---

    pub async fn create_process(
        &self,
        company_id: Uuid,
        parent_process_id: Option<Uuid>,
        name: &str,
        description: Option<&str>,
    ) -> Result<Process, AppError> {
        let process = sqlx::query_as::<_, Process>(
            r#"
            INSERT INTO processes (company_id, parent_process_id, name, description)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(parent_process_id)
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;
        Ok(process)
    }

    pub async fn list_processes(&self, company_id: Uuid) -> Result<Vec<Process>, AppError> {
        let processes = sqlx::query_as::<_, Process>(
            "SELECT * FROM processes WHERE company_id = $1 AND is_active = TRUE ORDER BY name ASC",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(processes)
    }

    pub async fn create_task_item(
        &self,
        company_id: Uuid,
        process_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<TaskItem, AppError> {
        let item = sqlx::query_as::<_, TaskItem>(
            r#"
            INSERT INTO task_items (company_id, process_id, name, description)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(process_id)
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;
        Ok(item)
    }

    pub async fn list_task_items(
        &self,
        company_id: Uuid,
        process_id: Option<Uuid>,
    ) -> Result<Vec<TaskItem>, AppError> {
        let items = sqlx::query_as::<_, TaskItem>(
            r#"
            SELECT * FROM task_items
            WHERE company_id = $1
              AND is_active = TRUE
              AND ($2::uuid IS NULL OR process_id = $2)
            ORDER BY name ASC
            "#,
        )
        .bind(company_id)
        .bind(process_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    // ---
    // Tarefas do Projeto
    // ---

    pub async fn create_task(
        &self,
        company_id: Uuid,
        project_id: Uuid,
        process_id: Option<Uuid>,
        task_item_id: Option<Uuid>,
        assignee_id: Option<Uuid>,
        title: &str,
        description: Option<&str>,
        due_date: Option<chrono::NaiveDate>,
    ) -> Result<ProjectTask, AppError> {
        let task = sqlx::query_as::<_, ProjectTask>(
            r#"
            INSERT INTO project_tasks
                (company_id, project_id, process_id, task_item_id, assignee_id, title, description, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(project_id)
        .bind(process_id)
        .bind(task_item_id)
        .bind(assignee_id)
        .bind(title)
        .bind(description)
        .bind(due_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(task)
    }

    pub async fn list_tasks(
        &self,
        company_id: Uuid,
        project_id: Uuid,
        page: &PageParams,
    ) -> Result<(Vec<ProjectTask>, i64), AppError> {
        let tasks = sqlx::query_as::<_, ProjectTask>(
            r#"
            SELECT * FROM project_tasks
            WHERE company_id = $1 AND project_id = $2 AND is_active = TRUE
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(company_id)
        .bind(project_id)
        .bind(page.page_size())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM project_tasks WHERE company_id = $1 AND project_id = $2 AND is_active = TRUE",
        )
        .bind(company_id)
        .bind(project_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((tasks, total))
    }

    pub async fn find_task(
        &self,
        id: Uuid,
        company_id: Uuid,
    ) -> Result<Option<ProjectTask>, AppError> {
        let task = sqlx::query_as::<_, ProjectTask>(
            "SELECT * FROM project_tasks WHERE id = $1 AND company_id = $2",
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    pub async fn update_task(
        &self,
        id: Uuid,
        company_id: Uuid,
        assignee_id: Option<Uuid>,
        title: Option<&str>,
        description: Option<&str>,
        status: Option<TaskStatus>,
        due_date: Option<chrono::NaiveDate>,
    ) -> Result<ProjectTask, AppError> {
        sqlx::query_as::<_, ProjectTask>(
            r#"
            UPDATE project_tasks SET
                assignee_id = COALESCE($3, assignee_id),
                title = COALESCE($4, title),
                description = COALESCE($5, description),
                status = COALESCE($6, status),
                due_date = COALESCE($7, due_date),
                updated_at = now()
            WHERE id = $1 AND company_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(company_id)
        .bind(assignee_id)
        .bind(title)
        .bind(description)
        .bind(status)
        .bind(due_date)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Tarefa"))
    }

    pub async fn soft_delete_task(&self, id: Uuid, company_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE project_tasks SET is_active = FALSE, updated_at = now() WHERE id = $1 AND company_id = $2",
        )
        .bind(id)
        .bind(company_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Tarefa"));
        }
        Ok(())
    }
}
