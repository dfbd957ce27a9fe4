//src/main.rs

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, patch, post},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::{auth_guard, full_access_guard};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas públicas: login e a captação do site
    let auth_routes = Router::new().route("/login", post(handlers::auth::login));

    let public_lead_routes = Router::new().route("/", post(handlers::leads::create_lead));

    // Rotas do usuário logado. Ficam fora do full_access_guard de propósito:
    // quem entrou com senha provisória precisa conseguir trocá-la.
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/change-password", post(handlers::auth::change_password))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let lead_routes = Router::new()
        .route("/", get(handlers::leads::list_leads))
        .route("/{id}", patch(handlers::leads::update_lead))
        .route("/{id}/status", patch(handlers::leads::move_lead))
        .layer(axum_middleware::from_fn(full_access_guard))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let dashboard_routes = Router::new()
        .route("/metrics", get(handlers::dashboard::get_metrics))
        .route("/leads-chart", get(handlers::dashboard::get_leads_chart))
        .route(
            "/conversions-chart",
            get(handlers::dashboard::get_conversions_chart),
        )
        .route("/monthly-chart", get(handlers::dashboard::get_monthly_chart))
        .layer(axum_middleware::from_fn(full_access_guard))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let admin_routes = Router::new()
        .route(
            "/authorized-emails",
            get(handlers::admin::list_authorized_emails)
                .post(handlers::admin::add_authorized_email),
        )
        .route(
            "/authorized-emails/{id}",
            patch(handlers::admin::set_authorized_email_active)
                .delete(handlers::admin::delete_authorized_email),
        )
        .route(
            "/authorized-emails/{id}/invite",
            post(handlers::admin::invite_authorized_email),
        )
        .layer(axum_middleware::from_fn(full_access_guard))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let app = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/dashboard", dashboard_routes)
        .nest("/api/admin", admin_routes)
        // A captação (POST) é pública; o quadro (GET/PATCH) é protegido.
        .nest("/api/leads", public_lead_routes.merge(lead_routes))
        .with_state(app_state);

    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
