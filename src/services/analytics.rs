// src/services/analytics.rs
//
// O motor de agregação do dashboard: funções puras sobre a coleção de
// leads da conta. Toda comparação de "mesmo dia" / "mesmo mês" usa o
// calendário no fuso do negócio, não aritmética de horas.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::models::{
    dashboard::{
        DailyActivityEntry, DashboardMetrics, LeadsChartSeries, MonthlyEntry, Period,
        PeriodTotals, StatusCountEntry, WeeklyEntry,
    },
    lead::{Lead, LeadStatus},
};

/// Acima deste intervalo o gráfico de leads passa de diário para semanal
const WEEKLY_THRESHOLD_DAYS: i64 = 30;
/// Fallback quando o período customizado vem incompleto
const DEFAULT_PERIOD_DAYS: i64 = 30;
/// Meses exibidos no gráfico mensal
const TRAILING_MONTHS: u32 = 6;

/// Resolve o período selecionado em um intervalo [start, end] inclusivo.
///
/// Períodos fixos terminam em `now`. No customizado, as datas do chamador
/// entram verbatim (dia inteiro no fuso do negócio); se faltar uma delas,
/// caímos nos 30 dias padrão em vez de retornar erro. `start <= end` não é
/// validado: um intervalo invertido só produz séries vazias.
pub fn resolve_range(
    period: Period,
    custom_start: Option<NaiveDate>,
    custom_end: Option<NaiveDate>,
    now: DateTime<Utc>,
    tz: Tz,
) -> (DateTime<Utc>, DateTime<Utc>) {
    if period == Period::Custom {
        if let (Some(start), Some(end)) = (custom_start, custom_end) {
            let start = tz
                .from_local_datetime(&start.and_hms_opt(0, 0, 0).unwrap())
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or(now);
            // Meia-noite do dia seguinte menos 1ns: cobre o último dia
            // inteiro, inclusive o sub-segundo final, sem mudar de data
            let end = tz
                .from_local_datetime(&(end + Duration::days(1)).and_hms_opt(0, 0, 0).unwrap())
                .earliest()
                .map(|dt| dt.with_timezone(&Utc) - Duration::nanoseconds(1))
                .unwrap_or(now);
            return (start, end);
        }
        return (now - Duration::days(DEFAULT_PERIOD_DAYS), now);
    }

    let days = match period {
        Period::Days7 => 7,
        Period::Days30 => 30,
        Period::Days90 => 90,
        Period::Custom => unreachable!(),
    };
    (now - Duration::days(days), now)
}

fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

fn in_range(instant: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    instant >= start && instant <= end
}

fn is_conversion(lead: &Lead) -> bool {
    lead.status == LeadStatus::Cliente && lead.conversion_date.is_some()
}

/// Série diária: uma entrada por dia-calendário de `start` a `end`
/// (inclusivo), contando leads criados e conversões naquele dia.
pub fn bucket_by_day(
    leads: &[Lead],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    tz: Tz,
) -> Vec<DailyActivityEntry> {
    let start_day = local_date(start, tz);
    let end_day = local_date(end, tz);

    start_day
        .iter_days()
        .take_while(|day| *day <= end_day)
        .map(|day| {
            let created = leads
                .iter()
                .filter(|l| local_date(l.created_at, tz) == day)
                .count() as i64;
            let conversions = leads
                .iter()
                .filter(|l| {
                    is_conversion(l)
                        && l.conversion_date
                            .is_some_and(|conv| local_date(conv, tz) == day)
                })
                .count() as i64;

            DailyActivityEntry {
                date: day,
                leads: created,
                conversions,
            }
        })
        .collect()
}

/// Série semanal: janelas consecutivas de 7 dias a partir de `start`,
/// a última pode ser curta. Conta criações por janela (limites inclusivos).
pub fn bucket_by_week(
    leads: &[Lead],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    tz: Tz,
) -> Vec<WeeklyEntry> {
    let start_day = local_date(start, tz);
    let end_day = local_date(end, tz);

    let mut entries = Vec::new();
    let mut window_start = start_day;
    let mut index = 1;
    while window_start <= end_day {
        let window_end = (window_start + Duration::days(6)).min(end_day);
        let count = leads
            .iter()
            .filter(|l| {
                let day = local_date(l.created_at, tz);
                day >= window_start && day <= window_end
            })
            .count() as i64;

        entries.push(WeeklyEntry {
            label: format!("Semana {}", index),
            leads: count,
        });

        window_start += Duration::days(7);
        index += 1;
    }
    entries
}

/// Gráfico mensal: os 6 meses-calendário que terminam no mês atual,
/// comparando ano/mês (não dias corridos).
pub fn bucket_by_month(leads: &[Lead], now: DateTime<Utc>, tz: Tz) -> Vec<MonthlyEntry> {
    let today = local_date(now, tz);

    (0..TRAILING_MONTHS)
        .rev()
        .map(|back| {
            // Aritmética de meses: volta `back` meses a partir do atual
            let months_since_zero = today.year() * 12 + today.month0() as i32 - back as i32;
            let year = months_since_zero.div_euclid(12);
            let month = months_since_zero.rem_euclid(12) as u32 + 1;

            let count = leads
                .iter()
                .filter(|l| {
                    let day = local_date(l.created_at, tz);
                    day.year() == year && day.month() == month
                })
                .count() as i64;

            MonthlyEntry {
                month: format!("{:04}-{:02}", year, month),
                leads: count,
            }
        })
        .collect()
}

/// Escolhe a granularidade do gráfico de leads pelo tamanho do intervalo.
pub fn leads_chart(
    leads: &[Lead],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    tz: Tz,
) -> LeadsChartSeries {
    let span_days = (local_date(end, tz) - local_date(start, tz)).num_days();
    if span_days > WEEKLY_THRESHOLD_DAYS {
        LeadsChartSeries::Weekly(bucket_by_week(leads, start, end, tz))
    } else {
        LeadsChartSeries::Daily(bucket_by_day(leads, start, end, tz))
    }
}

/// Totais de um período: leads criados, conversões (status "cliente" com
/// conversion_date dentro do intervalo), receita e taxa de conversão.
pub fn compute_totals(leads: &[Lead], start: DateTime<Utc>, end: DateTime<Utc>) -> PeriodTotals {
    let total_leads = leads
        .iter()
        .filter(|l| in_range(l.created_at, start, end))
        .count() as i64;

    let clients: Vec<&Lead> = leads
        .iter()
        .filter(|l| {
            is_conversion(l)
                && l.conversion_date
                    .is_some_and(|conv| in_range(conv, start, end))
        })
        .collect();

    let total_revenue = clients
        .iter()
        .fold(Decimal::ZERO, |acc, l| acc + l.amount.unwrap_or(Decimal::ZERO));

    let total_clients = clients.len() as i64;

    // Nunca divide por zero: sem leads no período, a taxa é 0
    let conversion_rate = if total_leads > 0 {
        (total_clients as f64 / total_leads as f64) * 100.0
    } else {
        0.0
    };

    PeriodTotals {
        total_leads,
        total_clients,
        total_revenue,
        conversion_rate,
    }
}

/// Crescimento percentual vs período anterior.
/// Anterior igual a zero => 0, independentemente do valor atual.
pub fn growth_percent(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    (current - previous) / previous * 100.0
}

/// Janela imediatamente anterior, com o mesmo comprimento:
/// previous_end = start - 1 dia; previous_start = previous_end - N dias.
pub fn previous_window(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let span = end - start;
    let period_days = Duration::days((span.num_seconds() as f64 / 86_400.0).ceil() as i64);
    let previous_end = start - Duration::days(1);
    let previous_start = previous_end - period_days;
    (previous_start, previous_end)
}

/// Contagem por etapa do funil, sobre os leads criados no período.
pub fn status_counts(
    leads: &[Lead],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<StatusCountEntry> {
    const ALL: [LeadStatus; 6] = [
        LeadStatus::NovoLead,
        LeadStatus::ContatoRealizado,
        LeadStatus::DocumentosRecebidos,
        LeadStatus::ContratoAssinado,
        LeadStatus::Cliente,
        LeadStatus::NaoCliente,
    ];

    ALL.iter()
        .map(|status| StatusCountEntry {
            status: *status,
            count: leads
                .iter()
                .filter(|l| l.status == *status && in_range(l.created_at, start, end))
                .count() as i64,
        })
        .collect()
}

/// Monta o payload completo de métricas: período atual, anterior e deltas.
pub fn build_metrics(
    leads: &[Lead],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    tz: Tz,
) -> DashboardMetrics {
    let current = compute_totals(leads, start, end);
    let (prev_start, prev_end) = previous_window(start, end);
    let previous = compute_totals(leads, prev_start, prev_end);

    let leads_growth = growth_percent(current.total_leads as f64, previous.total_leads as f64);
    let clients_growth =
        growth_percent(current.total_clients as f64, previous.total_clients as f64);
    let revenue_growth = growth_percent(
        current.total_revenue.to_f64().unwrap_or(0.0),
        previous.total_revenue.to_f64().unwrap_or(0.0),
    );

    let status_counts = status_counts(leads, start, end);

    DashboardMetrics {
        current,
        previous,
        leads_growth,
        clients_growth,
        revenue_growth,
        status_counts,
        range_start: local_date(start, tz),
        range_end: local_date(end, tz),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lead::sample_lead;
    use chrono_tz::UTC;

    fn lead_created(at: DateTime<Utc>) -> Lead {
        sample_lead(at)
    }

    fn client_converted(created: DateTime<Utc>, converted: DateTime<Utc>, amount: i64) -> Lead {
        let mut lead = lead_created(created);
        lead.status = LeadStatus::Cliente;
        lead.conversion_date = Some(converted);
        lead.amount = Some(Decimal::from(amount));
        lead
    }

    fn instant(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn daily_buckets_cover_every_calendar_day() {
        let leads = vec![
            lead_created(instant(2024, 1, 1)),
            lead_created(instant(2024, 1, 1)),
            lead_created(instant(2024, 1, 1)),
            lead_created(instant(2024, 1, 2)),
        ];

        let series = bucket_by_day(
            &leads,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 3, 23, 59, 59).unwrap(),
            UTC,
        );

        assert_eq!(series.len(), 3);
        assert_eq!(series[0].leads, 3);
        assert_eq!(series[1].leads, 1);
        assert_eq!(series[2].leads, 0);
    }

    #[test]
    fn conversions_require_client_status_and_date() {
        let converted = client_converted(instant(2024, 1, 1), instant(2024, 1, 2), 1000);
        // Convertida no passado, mas já saiu de "cliente": não conta
        let mut regressed = client_converted(instant(2024, 1, 1), instant(2024, 1, 2), 500);
        regressed.status = LeadStatus::ContatoRealizado;

        let series = bucket_by_day(
            &[converted, regressed],
            instant(2024, 1, 2),
            instant(2024, 1, 2),
            UTC,
        );

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].conversions, 1);
    }

    #[test]
    fn weekly_buckets_partition_with_short_tail() {
        let leads = vec![
            lead_created(instant(2024, 1, 1)),
            lead_created(instant(2024, 1, 7)),
            lead_created(instant(2024, 1, 8)),
            lead_created(instant(2024, 1, 16)),
        ];

        let series = bucket_by_week(&leads, instant(2024, 1, 1), instant(2024, 1, 16), UTC);

        assert_eq!(series.len(), 3);
        assert_eq!(series[0].label, "Semana 1");
        assert_eq!(series[0].leads, 2); // 01 a 07
        assert_eq!(series[1].leads, 1); // 08 a 14
        assert_eq!(series[2].leads, 1); // 15 a 16 (janela curta)
    }

    #[test]
    fn monthly_buckets_use_calendar_month_equality() {
        let leads = vec![
            lead_created(instant(2026, 3, 31)),
            lead_created(instant(2026, 8, 1)),
            lead_created(instant(2026, 8, 30)),
            lead_created(instant(2025, 8, 30)), // ano errado, não conta
        ];

        let series = bucket_by_month(&leads, instant(2026, 8, 30), UTC);

        assert_eq!(series.len(), 6);
        assert_eq!(series[0].month, "2026-03");
        assert_eq!(series[0].leads, 1);
        assert_eq!(series[5].month, "2026-08");
        assert_eq!(series[5].leads, 2);
    }

    #[test]
    fn conversion_rate_is_zero_without_leads() {
        let totals = compute_totals(&[], instant(2024, 1, 1), instant(2024, 1, 31));
        assert_eq!(totals.total_leads, 0);
        assert_eq!(totals.conversion_rate, 0.0);
    }

    #[test]
    fn conversion_rate_stays_within_bounds() {
        let leads = vec![
            client_converted(instant(2024, 1, 2), instant(2024, 1, 3), 1500),
            lead_created(instant(2024, 1, 4)),
        ];
        let totals = compute_totals(&leads, instant(2024, 1, 1), instant(2024, 1, 31));

        assert_eq!(totals.total_leads, 2);
        assert_eq!(totals.total_clients, 1);
        assert_eq!(totals.total_revenue, Decimal::from(1500));
        assert!(totals.conversion_rate >= 0.0 && totals.conversion_rate <= 100.0);
        assert_eq!(totals.conversion_rate, 50.0);
    }

    #[test]
    fn missing_amount_counts_as_zero_revenue() {
        let mut client = client_converted(instant(2024, 1, 2), instant(2024, 1, 3), 0);
        client.amount = None;

        let totals = compute_totals(&[client], instant(2024, 1, 1), instant(2024, 1, 31));
        assert_eq!(totals.total_clients, 1);
        assert_eq!(totals.total_revenue, Decimal::ZERO);
    }

    #[test]
    fn growth_is_zero_when_previous_is_zero() {
        assert_eq!(growth_percent(10.0, 0.0), 0.0);
        assert_eq!(growth_percent(0.0, 0.0), 0.0);
        assert_eq!(growth_percent(150.0, 100.0), 50.0);
        assert_eq!(growth_percent(50.0, 100.0), -50.0);
    }

    #[test]
    fn previous_window_precedes_current_with_same_length() {
        let start = instant(2024, 2, 1);
        let end = instant(2024, 2, 8);
        let (prev_start, prev_end) = previous_window(start, end);

        assert_eq!(prev_end, start - Duration::days(1));
        assert_eq!(prev_start, prev_end - Duration::days(7));
    }

    #[test]
    fn custom_range_falls_back_without_both_dates() {
        let now = instant(2024, 6, 15);
        let (start, end) =
            resolve_range(Period::Custom, Some(instant(2024, 6, 1).date_naive()), None, now, UTC);

        assert_eq!(end, now);
        assert_eq!(start, now - Duration::days(30));
    }

    #[test]
    fn custom_range_uses_caller_dates_verbatim() {
        let now = instant(2024, 6, 15);
        let (start, end) = resolve_range(
            Period::Custom,
            NaiveDate::from_ymd_opt(2024, 1, 1),
            NaiveDate::from_ymd_opt(2024, 1, 3),
            now,
            UTC,
        );

        assert_eq!(start, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(
            end,
            Utc.with_ymd_and_hms(2024, 1, 4, 0, 0, 0).unwrap() - Duration::nanoseconds(1)
        );
        // O fim continua no dia 3 para o bucketing diário
        assert_eq!(end.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    }

    #[test]
    fn custom_range_counts_the_final_subsecond_of_the_end_day() {
        let last_moment = Utc.with_ymd_and_hms(2024, 1, 3, 23, 59, 59).unwrap()
            + Duration::milliseconds(500);
        let leads = vec![lead_created(last_moment)];

        let (start, end) = resolve_range(
            Period::Custom,
            NaiveDate::from_ymd_opt(2024, 1, 1),
            NaiveDate::from_ymd_opt(2024, 1, 3),
            instant(2024, 6, 15),
            UTC,
        );

        let totals = compute_totals(&leads, start, end);
        assert_eq!(totals.total_leads, 1);

        let series = bucket_by_day(&leads, start, end, UTC);
        assert_eq!(series.len(), 3);
        assert_eq!(series[2].leads, 1);
    }
}
