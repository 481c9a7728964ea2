//src/main.rs

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use std::env;
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod chat;
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::{activity::activity_logger, auth::auth_guard};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas públicas: registro, login e o handshake do chat (o token vai na
    // query string, validado pelo próprio handler).
    let public_routes = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/chat-hub", get(handlers::chat::chat_hub));

    // Todas as rotas abaixo exigem Bearer token. A ordem das camadas
    // importa: auth_guard roda primeiro (é a mais externa) e pendura o
    // User que o activity_logger e os extratores consomem.
    let protected_routes = Router::new()
        // --- Usuário e empresa ---
        .route("/api/users/me", get(handlers::auth::get_me))
        .route(
            "/api/company",
            get(handlers::tenancy::get_company).put(handlers::tenancy::update_company),
        )
        .route(
            "/api/departments",
            post(handlers::tenancy::create_department).get(handlers::tenancy::list_departments),
        )
        .route(
            "/api/departments/{id}",
            get(handlers::tenancy::get_department)
                .put(handlers::tenancy::update_department)
                .delete(handlers::tenancy::delete_department),
        )
        // --- Pessoal ---
        .route("/api/users", get(handlers::personnel::list_users))
        .route(
            "/api/users/{id}",
            get(handlers::personnel::get_user)
                .put(handlers::personnel::update_user)
                .delete(handlers::personnel::delete_user),
        )
        .route(
            "/api/users/{id}/roles",
            get(handlers::personnel::list_user_roles).post(handlers::personnel::assign_role),
        )
        .route(
            "/api/users/{id}/roles/{role_id}",
            delete(handlers::personnel::remove_role),
        )
        // --- RBAC ---
        .route(
            "/api/roles",
            post(handlers::rbac::create_role).get(handlers::rbac::list_roles),
        )
        .route(
            "/api/roles/{id}/permissions",
            put(handlers::rbac::set_role_permissions),
        )
        .route("/api/permissions", get(handlers::rbac::list_permissions))
        // --- Projetos ---
        .route(
            "/api/projects",
            post(handlers::projects::create_project).get(handlers::projects::list_projects),
        )
        .route(
            "/api/projects/{id}",
            get(handlers::projects::get_project)
                .put(handlers::projects::update_project)
                .delete(handlers::projects::delete_project),
        )
        .route(
            "/api/projects/{id}/addresses",
            post(handlers::projects::add_address).get(handlers::projects::list_addresses),
        )
        .route(
            "/api/projects/{id}/addresses/{address_id}",
            delete(handlers::projects::delete_address),
        )
        .route(
            "/api/projects/{id}/tasks",
            post(handlers::projects::create_task).get(handlers::projects::list_tasks),
        )
        .route(
            "/api/processes",
            post(handlers::projects::create_process).get(handlers::projects::list_processes),
        )
        .route(
            "/api/task-items",
            post(handlers::projects::create_task_item).get(handlers::projects::list_task_items),
        )
        .route(
            "/api/tasks/{id}",
            get(handlers::projects::get_task)
                .put(handlers::projects::update_task)
                .delete(handlers::projects::delete_task),
        )
        .route("/api/tasks/{id}/messages", get(handlers::chat::list_messages))
        // --- Estoque ---
        .route(
            "/api/stock/categories",
            post(handlers::stock::create_category).get(handlers::stock::list_categories),
        )
        .route(
            "/api/stock/locations",
            post(handlers::stock::create_location).get(handlers::stock::list_locations),
        )
        .route(
            "/api/stock/items",
            post(handlers::stock::create_item).get(handlers::stock::list_items),
        )
        .route(
            "/api/stock/items/{id}",
            get(handlers::stock::get_item)
                .put(handlers::stock::update_item)
                .delete(handlers::stock::delete_item),
        )
        .route(
            "/api/stock/movements",
            post(handlers::stock::create_movement).get(handlers::stock::list_movements),
        )
        .route("/api/stock/balances", get(handlers::stock::list_balances))
        .route("/api/stock/lots", get(handlers::stock::list_lots))
        .route("/api/stock/alerts", get(handlers::stock::list_alerts))
        .route(
            "/api/stock/alerts/{id}/resolve",
            put(handlers::stock::resolve_alert),
        )
        // --- Fornecedores ---
        .route(
            "/api/suppliers",
            post(handlers::suppliers::create_supplier).get(handlers::suppliers::list_suppliers),
        )
        .route(
            "/api/suppliers/{id}",
            get(handlers::suppliers::get_supplier)
                .put(handlers::suppliers::update_supplier)
                .delete(handlers::suppliers::delete_supplier),
        )
        .route(
            "/api/suppliers/{id}/link",
            post(handlers::suppliers::link_supplier),
        )
        // --- Demandas ---
        .route(
            "/api/demands",
            post(handlers::demands::create_demand).get(handlers::demands::list_demands),
        )
        .route(
            "/api/demands/{id}",
            get(handlers::demands::get_demand)
                .put(handlers::demands::update_demand)
                .delete(handlers::demands::delete_demand),
        )
        .route("/api/demands/{id}/submit", post(handlers::demands::submit_demand))
        .route("/api/demands/{id}/cancel", post(handlers::demands::cancel_demand))
        .route("/api/demands/{id}/items", post(handlers::demands::add_demand_item))
        .route(
            "/api/demands/{id}/items/{item_id}",
            delete(handlers::demands::delete_demand_item),
        )
        .route(
            "/api/demands/{id}/approvals",
            post(handlers::demands::add_approval),
        )
        .route(
            "/api/demands/{id}/approvals/{approval_id}/decide",
            post(handlers::demands::decide_approval),
        )
        .route(
            "/api/demands/{id}/comments",
            post(handlers::demands::add_comment),
        )
        // --- Auditoria ---
        .route("/api/activity", get(handlers::activity::list_activity))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            activity_logger,
        ))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    let addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
