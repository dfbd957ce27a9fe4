// src/models/dashboard.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::lead::LeadStatus;

// Período pré-definido do dashboard. "custom" exige startDate/endDate;
// se faltar uma das datas, caímos no padrão de 30 dias (sem erro).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub enum Period {
    #[serde(rename = "7")]
    Days7,
    #[serde(rename = "30")]
    Days30,
    #[serde(rename = "90")]
    Days90,
    #[serde(rename = "custom")]
    Custom,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RangeQuery {
    /// "7", "30" (padrão), "90" ou "custom"
    pub period: Option<Period>,
    /// Início do período customizado (inclusivo)
    pub start_date: Option<NaiveDate>,
    /// Fim do período customizado (inclusivo)
    pub end_date: Option<NaiveDate>,
}

// Totais de um período (os cards do topo)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeriodTotals {
    pub total_leads: i64,
    pub total_clients: i64,
    #[schema(value_type = f64, example = 4500.0)]
    pub total_revenue: Decimal,
    // Sempre em [0, 100]; 0 quando não houve leads no período
    pub conversion_rate: f64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub current: PeriodTotals,
    pub previous: PeriodTotals,
    // Crescimento percentual vs período anterior; 0 quando o anterior foi 0
    pub leads_growth: f64,
    pub clients_growth: f64,
    pub revenue_growth: f64,
    pub status_counts: Vec<StatusCountEntry>,
    pub range_start: NaiveDate,
    pub range_end: NaiveDate,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCountEntry {
    pub status: LeadStatus,
    pub count: i64,
}

// Um ponto do gráfico "Leads x Conversões por Dia"
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyActivityEntry {
    pub date: NaiveDate,
    pub leads: i64,
    pub conversions: i64,
}

// Uma janela do gráfico semanal ("Semana 1", "Semana 2", ...)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyEntry {
    #[schema(example = "Semana 1")]
    pub label: String,
    pub leads: i64,
}

// Um mês do gráfico dos últimos 6 meses
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyEntry {
    #[schema(example = "2026-03")]
    pub month: String,
    pub leads: i64,
}

// Série do gráfico de leads: diária em períodos curtos,
// semanal quando o intervalo passa de 30 dias
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", untagged)]
pub enum LeadsChartSeries {
    Daily(Vec<DailyActivityEntry>),
    Weekly(Vec<WeeklyEntry>),
}
