// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::change_password,
        handlers::auth::get_me,

        // --- Leads ---
        handlers::leads::create_lead,
        handlers::leads::list_leads,
        handlers::leads::move_lead,
        handlers::leads::update_lead,

        // --- Dashboard ---
        handlers::dashboard::get_metrics,
        handlers::dashboard::get_leads_chart,
        handlers::dashboard::get_conversions_chart,
        handlers::dashboard::get_monthly_chart,

        // --- Admin ---
        handlers::admin::list_authorized_emails,
        handlers::admin::add_authorized_email,
        handlers::admin::set_authorized_email_active,
        handlers::admin::delete_authorized_email,
        handlers::admin::invite_authorized_email,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::Role,
            models::auth::AuthorizedEmail,
            models::auth::LoginPayload,
            models::auth::ChangePasswordPayload,
            models::auth::AuthResponse,

            // --- Leads ---
            models::lead::LeadStatus,
            models::lead::ViolationType,
            models::lead::PaymentMethod,
            models::lead::Urgency,
            models::lead::Lead,
            models::lead::LeadChanges,

            // --- Dashboard ---
            models::dashboard::Period,
            models::dashboard::PeriodTotals,
            models::dashboard::DashboardMetrics,
            models::dashboard::StatusCountEntry,
            models::dashboard::DailyActivityEntry,
            models::dashboard::WeeklyEntry,
            models::dashboard::MonthlyEntry,
            models::dashboard::LeadsChartSeries,

            // --- Payloads ---
            handlers::leads::CreateLeadPayload,
            handlers::leads::MoveLeadPayload,
            handlers::leads::BoardResponse,
            handlers::admin::AddAuthorizedEmailPayload,
            handlers::admin::SetActivePayload,
        )
    ),
    tags(
        (name = "Auth", description = "Login e troca de senha"),
        (name = "Leads", description = "Captação do site e funil comercial"),
        (name = "Dashboard", description = "Indicadores e Gráficos Gerenciais"),
        (name = "Admin", description = "E-mails autorizados e convites")
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
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
