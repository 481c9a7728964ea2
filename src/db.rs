pub mod activity_repo;
pub mod chat_repo;
pub mod demand_repo;
pub mod project_repo;
pub mod rbac_repo;
pub mod stock_repo;
pub mod supplier_repo;
pub mod tenancy_repo;
pub mod user_repo;

pub use activity_repo::ActivityRepository;
pub use chat_repo::ChatRepository;
pub use demand_repo::DemandRepository;
pub use project_repo::ProjectRepository;
pub use rbac_repo::RbacRepository;
pub use stock_repo::StockRepository;
pub use supplier_repo::SupplierRepository;
pub use tenancy_repo::TenancyRepository;
pub use user_repo::UserRepository;
