// src/config.rs

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, time::Duration};

use crate::{
    chat::hub::ChatHub,
    db::{
        ActivityRepository, ChatRepository, DemandRepository, ProjectRepository, RbacRepository,
        StockRepository, SupplierRepository, TenancyRepository, UserRepository,
    },
    services::{auth::AuthService, demand_service::DemandService, stock_service::StockService},
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,

    // Repositórios (acesso a dados)
    pub user_repo: UserRepository,
    pub tenancy_repo: TenancyRepository,
    pub rbac_repo: RbacRepository,
    pub project_repo: ProjectRepository,
    pub stock_repo: StockRepository,
    pub supplier_repo: SupplierRepository,
    pub demand_repo: DemandRepository,
    pub chat_repo: ChatRepository,
    pub activity_repo: ActivityRepository,

    // Serviços (regras de negócio com transação)
    pub auth_service: AuthService,
    pub stock_service: StockService,
    pub demand_service: DemandService,

    // Hub de chat em memória (um canal por tarefa)
    pub chat_hub: ChatHub,
}

impl AppState {
    // A assinatura retorna um Result: se o banco não subir, o main decide.
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")?;

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let tenancy_repo = TenancyRepository::new(db_pool.clone());
        let rbac_repo = RbacRepository::new(db_pool.clone());
        let project_repo = ProjectRepository::new(db_pool.clone());
        let stock_repo = StockRepository::new(db_pool.clone());
        let supplier_repo = SupplierRepository::new(db_pool.clone());
        let demand_repo = DemandRepository::new(db_pool.clone());
        let chat_repo = ChatRepository::new(db_pool.clone());
        let activity_repo = ActivityRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            tenancy_repo.clone(),
            rbac_repo.clone(),
            jwt_secret.clone(),
            db_pool.clone(),
        );
        let stock_service = StockService::new(stock_repo.clone(), db_pool.clone());
        let demand_service = DemandService::new(
            demand_repo.clone(),
            tenancy_repo.clone(),
            db_pool.clone(),
        );

        Ok(Self {
            db_pool,
            jwt_secret,
            user_repo,
            tenancy_repo,
            rbac_repo,
            project_repo,
            stock_repo,
            supplier_repo,
            demand_repo,
            chat_repo,
            activity_repo,
            auth_service,
            stock_service,
            demand_service,
            chat_hub: ChatHub::new(),
        })
    }
}
