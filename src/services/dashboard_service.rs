// src/services/dashboard_service.rs
//
// Camada fina do dashboard: carrega a coleção da conta e delega a
// matemática para as funções puras de `analytics`.

use chrono::Utc;
use chrono_tz::Tz;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::LeadRepository,
    models::dashboard::{DashboardMetrics, DailyActivityEntry, LeadsChartSeries, MonthlyEntry, RangeQuery, Period},
    services::analytics,
};

#[derive(Clone)]
pub struct DashboardService {
    repo: LeadRepository,
    business_tz: Tz,
}

impl DashboardService {
    pub fn new(repo: LeadRepository, business_tz: Tz) -> Self {
        Self { repo, business_tz }
    }

    fn resolve(&self, query: &RangeQuery) -> (chrono::DateTime<Utc>, chrono::DateTime<Utc>) {
        analytics::resolve_range(
            query.period.unwrap_or(Period::Days30),
            query.start_date,
            query.end_date,
            Utc::now(),
            self.business_tz,
        )
    }

    pub async fn metrics(
        &self,
        owner_id: Uuid,
        query: &RangeQuery,
    ) -> Result<DashboardMetrics, AppError> {
        let leads = self.repo.list_by_owner(owner_id).await?;
        let (start, end) = self.resolve(query);
        Ok(analytics::build_metrics(&leads, start, end, self.business_tz))
    }

    /// Série do gráfico de leads: diária, ou semanal quando o intervalo
    /// passa de 30 dias.
    pub async fn leads_chart(
        &self,
        owner_id: Uuid,
        query: &RangeQuery,
    ) -> Result<LeadsChartSeries, AppError> {
        let leads = self.repo.list_by_owner(owner_id).await?;
        let (start, end) = self.resolve(query);
        Ok(analytics::leads_chart(&leads, start, end, self.business_tz))
    }

    /// "Leads x Conversões por Dia": sempre diária.
    pub async fn conversions_chart(
        &self,
        owner_id: Uuid,
        query: &RangeQuery,
    ) -> Result<Vec<DailyActivityEntry>, AppError> {
        let leads = self.repo.list_by_owner(owner_id).await?;
        let (start, end) = self.resolve(query);
        Ok(analytics::bucket_by_day(&leads, start, end, self.business_tz))
    }

    /// Leads por mês nos últimos 6 meses-calendário.
    pub async fn monthly_chart(&self, owner_id: Uuid) -> Result<Vec<MonthlyEntry>, AppError> {
        let leads = self.repo.list_by_owner(owner_id).await?;
        Ok(analytics::bucket_by_month(&leads, Utc::now(), self.business_tz))
    }
}
