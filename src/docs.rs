// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Tenancy ---
        handlers::tenancy::get_company,
        handlers::tenancy::update_company,
        handlers::tenancy::create_department,
        handlers::tenancy::list_departments,
        handlers::tenancy::get_department,
        handlers::tenancy::update_department,
        handlers::tenancy::delete_department,

        // --- Personnel ---
        handlers::personnel::list_users,
        handlers::personnel::get_user,
        handlers::personnel::update_user,
        handlers::personnel::delete_user,
        handlers::personnel::list_user_roles,
        handlers::personnel::assign_role,
        handlers::personnel::remove_role,

        // --- RBAC ---
        handlers::rbac::create_role,
        handlers::rbac::list_roles,
        handlers::rbac::list_permissions,
        handlers::rbac::set_role_permissions,

        // --- Projects ---
        handlers::projects::create_project,
        handlers::projects::list_projects,
        handlers::projects::get_project,
        handlers::projects::update_project,
        handlers::projects::delete_project,
        handlers::projects::add_address,
        handlers::projects::list_addresses,
        handlers::projects::delete_address,
        handlers::projects::create_process,
        handlers::projects::list_processes,
        handlers::projects::create_task_item,
        handlers::projects::list_task_items,
        handlers::projects::create_task,
        handlers::projects::list_tasks,
        handlers::projects::get_task,
        handlers::projects::update_task,
        handlers::projects::delete_task,

        // --- Stock ---
        handlers::stock::create_category,
        handlers::stock::list_categories,
        handlers::stock::create_location,
        handlers::stock::list_locations,
        handlers::stock::create_item,
        handlers::stock::list_items,
        handlers::stock::get_item,
        handlers::stock::update_item,
        handlers::stock::delete_item,
        handlers::stock::create_movement,
        handlers::stock::list_movements,
        handlers::stock::list_balances,
        handlers::stock::list_lots,
        handlers::stock::list_alerts,
        handlers::stock::resolve_alert,

        // --- Suppliers ---
        handlers::suppliers::create_supplier,
        handlers::suppliers::list_suppliers,
        handlers::suppliers::get_supplier,
        handlers::suppliers::update_supplier,
        handlers::suppliers::delete_supplier,
        handlers::suppliers::link_supplier,

        // --- Demands ---
        handlers::demands::create_demand,
        handlers::demands::list_demands,
        handlers::demands::get_demand,
        handlers::demands::update_demand,
        handlers::demands::submit_demand,
        handlers::demands::cancel_demand,
        handlers::demands::delete_demand,
        handlers::demands::add_demand_item,
        handlers::demands::delete_demand_item,
        handlers::demands::add_approval,
        handlers::demands::decide_approval,
        handlers::demands::add_comment,

        // --- Chat / Activity ---
        handlers::chat::list_messages,
        handlers::activity::list_activity,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterPayload,
            models::auth::LoginPayload,
            models::auth::AuthResponse,

            // --- Tenancy ---
            models::tenancy::Company,
            models::tenancy::Department,
            handlers::tenancy::UpdateCompanyPayload,
            handlers::tenancy::CreateDepartmentPayload,
            handlers::tenancy::UpdateDepartmentPayload,

            // --- Personnel / RBAC ---
            models::rbac::Role,
            models::rbac::Permission,
            handlers::personnel::UpdateUserPayload,
            handlers::personnel::AssignRolePayload,
            handlers::rbac::CreateRolePayload,
            handlers::rbac::SetRolePermissionsPayload,

            // --- Projects ---
            models::project::TaskStatus,
            models::project::Project,
            models::project::ProjectAddress,
            models::project::Process,
            models::project::TaskItem,
            models::project::ProjectTask,
            handlers::projects::CreateProjectPayload,
            handlers::projects::UpdateProjectPayload,
            handlers::projects::AddAddressPayload,
            handlers::projects::CreateProcessPayload,
            handlers::projects::CreateTaskItemPayload,
            handlers::projects::CreateTaskPayload,
            handlers::projects::UpdateTaskPayload,

            // --- Stock ---
            models::stock::MovementType,
            models::stock::StockCategory,
            models::stock::StockLocation,
            models::stock::StockItem,
            models::stock::StockBalance,
            models::stock::StockMovement,
            models::stock::StockLot,
            models::stock::StockAlert,
            handlers::stock::CreateCategoryPayload,
            handlers::stock::CreateLocationPayload,
            handlers::stock::CreateItemPayload,
            handlers::stock::UpdateItemPayload,
            handlers::stock::CreateMovementPayload,
            handlers::stock::MovementResult,

            // --- Suppliers ---
            models::supplier::Supplier,
            handlers::suppliers::CreateSupplierPayload,
            handlers::suppliers::UpdateSupplierPayload,

            // --- Demands ---
            models::demand::DemandStatus,
            models::demand::DemandPriority,
            models::demand::ApprovalStatus,
            models::demand::ApprovalOutcome,
            models::demand::Demand,
            models::demand::DemandItem,
            models::demand::DemandApproval,
            models::demand::DemandComment,
            models::demand::DemandDetail,
            handlers::demands::CreateDemandPayload,
            handlers::demands::UpdateDemandPayload,
            handlers::demands::AddDemandItemPayload,
            handlers::demands::AddApprovalPayload,
            handlers::demands::DecideApprovalPayload,
            handlers::demands::AddCommentPayload,

            // --- Chat / Activity ---
            models::chat::ChatMessage,
            models::activity::UserActivityLog,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e registro bootstrap"),
        (name = "Tenancy", description = "Empresa e departamentos"),
        (name = "Personnel", description = "Usuários e seus cargos"),
        (name = "RBAC", description = "Cargos e permissões"),
        (name = "Projects", description = "Projetos, processos e tarefas"),
        (name = "Stock", description = "Estoque: itens, movimentações, saldos, lotes e alertas"),
        (name = "Suppliers", description = "Cadastro mestre de fornecedores"),
        (name = "Demands", description = "Demandas de compra e aprovações"),
        (name = "Chat", description = "Histórico de chat por tarefa"),
        (name = "Activity", description = "Trilha de auditoria")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
