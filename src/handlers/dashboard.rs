// src/handlers/dashboard.rs

use axum::{Json, extract::{Query, State}};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::dashboard::{
        DailyActivityEntry, DashboardMetrics, LeadsChartSeries, MonthlyEntry, RangeQuery,
    },
};

// GET /api/dashboard/metrics
#[utoipa::path(
    get,
    path = "/api/dashboard/metrics",
    tag = "Dashboard",
    params(RangeQuery),
    responses(
        (status = 200, description = "Totais do período, comparativo e funil", body = DashboardMetrics),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_metrics(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<RangeQuery>,
) -> Result<Json<DashboardMetrics>, AppError> {
    let metrics = app_state.dashboard_service.metrics(user.id, &query).await?;
    Ok(Json(metrics))
}

// GET /api/dashboard/leads-chart
#[utoipa::path(
    get,
    path = "/api/dashboard/leads-chart",
    tag = "Dashboard",
    params(RangeQuery),
    responses(
        (status = 200, description = "Série diária, ou semanal acima de 30 dias", body = LeadsChartSeries),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_leads_chart(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<RangeQuery>,
) -> Result<Json<LeadsChartSeries>, AppError> {
    let series = app_state
        .dashboard_service
        .leads_chart(user.id, &query)
        .await?;
    Ok(Json(series))
}

// GET /api/dashboard/conversions-chart
#[utoipa::path(
    get,
    path = "/api/dashboard/conversions-chart",
    tag = "Dashboard",
    params(RangeQuery),
    responses(
        (status = 200, description = "Leads x conversões por dia", body = [DailyActivityEntry]),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_conversions_chart(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<DailyActivityEntry>>, AppError> {
    let series = app_state
        .dashboard_service
        .conversions_chart(user.id, &query)
        .await?;
    Ok(Json(series))
}

// GET /api/dashboard/monthly-chart
#[utoipa::path(
    get,
    path = "/api/dashboard/monthly-chart",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Leads por mês nos últimos 6 meses", body = [MonthlyEntry]),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_monthly_chart(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<MonthlyEntry>>, AppError> {
    let series = app_state.dashboard_service.monthly_chart(user.id).await?;
    Ok(Json(series))
}
