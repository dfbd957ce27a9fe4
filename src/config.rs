// src/config.rs

use std::{env, time::Duration};

use chrono_tz::Tz;
use sqlx::{PgPool, postgres::PgPoolOptions};
use uuid::Uuid;

use crate::{
    db::{AuthorizedEmailRepository, LeadRepository, UserRepository},
    services::{
        admin_service::AdminService, auth_service::AuthService,
        dashboard_service::DashboardService, lead_service::LeadService, mailer::Mailer,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    // Conta do negócio que recebe os leads do site público
    pub lead_owner_id: Uuid,
    pub auth_service: AuthService,
    pub lead_service: LeadService,
    pub dashboard_service: DashboardService,
    pub admin_service: AdminService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");
        let lead_owner_id: Uuid = env::var("LEAD_OWNER_ID")
            .expect("LEAD_OWNER_ID deve ser definido")
            .parse()
            .expect("LEAD_OWNER_ID deve ser um UUID válido");

        // Fuso do negócio: define o que é "mesmo dia" nos gráficos
        let business_tz: Tz = env::var("BUSINESS_TZ")
            .unwrap_or_else(|_| "America/Sao_Paulo".to_string())
            .parse()
            .expect("BUSINESS_TZ deve ser um fuso IANA válido");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let lead_repo = LeadRepository::new(db_pool.clone());
        let authorized_repo = AuthorizedEmailRepository::new(db_pool.clone());

        let mailer = Mailer::new(
            env::var("MAIL_API_URL").ok(),
            env::var("MAIL_API_KEY").unwrap_or_default(),
            env::var("MAIL_FROM").unwrap_or_else(|_| "SOS Multas <nao-responda@sosmultas.com.br>".to_string()),
            env::var("APP_URL").unwrap_or_else(|_| "https://sosmultasportoalegre.com.br".to_string()),
        );

        let auth_service = AuthService::new(
            user_repo.clone(),
            authorized_repo.clone(),
            jwt_secret.clone(),
        );
        let lead_service = LeadService::new(lead_repo.clone());
        let dashboard_service = DashboardService::new(lead_repo, business_tz);
        let admin_service = AdminService::new(authorized_repo, user_repo, mailer);

        Ok(Self {
            db_pool,
            lead_owner_id,
            auth_service,
            lead_service,
            dashboard_service,
            admin_service,
        })
    }
}
