// src/services/pipeline.rs
//
// A máquina de estados do funil, centralizada em uma função pura.
// Todos os pontos de entrada (drag-and-drop, dropdown, modal) passam por
// aqui, então as regras de conversion_date, rejection_reason e
// last_moved_at são aplicadas exatamente uma vez.

use chrono::{DateTime, Duration, Utc};

use crate::models::lead::{Lead, LeadStatus, STALE_TAG};

/// Dias parado na mesma etapa até ganhar a tag "Frio"
pub const STALE_AFTER_DAYS: i64 = 7;
/// Dias parado em "Novo Lead" até entrar no alerta de follow-up
pub const FOLLOW_UP_AFTER_DAYS: i64 = 3;

// O conjunto de campos que uma transição altera, aplicado em um único
// UPDATE pelo repositório.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadTransition {
    pub status: LeadStatus,
    pub last_moved_at: DateTime<Utc>,
    // Some apenas na PRIMEIRA chegada em "cliente"; o repositório usa
    // COALESCE, então None preserva o valor já gravado.
    pub conversion_date: Option<DateTime<Utc>>,
    // Gravado verbatim ao mover para "nao-cliente"; None limpa o campo
    // em qualquer outra etapa.
    pub rejection_reason: Option<String>,
}

/// Calcula o efeito de mover `lead` para `new_status`.
///
/// Retorna `None` quando o destino é a etapa atual: mover para o mesmo
/// status é um no-op (nem `last_moved_at` muda), não um erro.
///
/// Nenhuma transição é proibida: o funil aceita pular etapas e voltar
/// atrás, inclusive sair de "cliente".
pub fn apply_transition(
    lead: &Lead,
    new_status: LeadStatus,
    rejection_reason: Option<String>,
    now: DateTime<Utc>,
) -> Option<LeadTransition> {
    if new_status == lead.status {
        return None;
    }

    let conversion_date = if new_status == LeadStatus::Cliente && lead.conversion_date.is_none() {
        Some(now)
    } else {
        None
    };

    let rejection_reason = if new_status == LeadStatus::NaoCliente {
        // A UI oferece a lista fixa de motivos, mas o chamador pode
        // não informar nenhum
        rejection_reason
    } else {
        None
    };

    Some(LeadTransition {
        status: new_status,
        last_moved_at: now,
        conversion_date,
        rejection_reason,
    })
}

fn days_in_status(lead: &Lead, now: DateTime<Utc>) -> Duration {
    now - lead.moved_or_created_at()
}

/// O lead deve ganhar a tag "Frio" neste passe de normalização?
/// Checa a presença antes de sugerir, então o passe é idempotente.
pub fn needs_stale_tag(lead: &Lead, now: DateTime<Utc>) -> bool {
    let already_tagged = lead
        .tags
        .as_deref()
        .is_some_and(|tags| tags.iter().any(|t| t == STALE_TAG));

    !already_tagged && days_in_status(lead, now) >= Duration::days(STALE_AFTER_DAYS)
}

/// Lead novo parado há 3+ dias: entra no aviso agregado de follow-up.
/// Visão derivada em tempo de leitura, nada é gravado.
pub fn needs_follow_up(lead: &Lead, now: DateTime<Utc>) -> bool {
    lead.status == LeadStatus::NovoLead
        && days_in_status(lead, now) >= Duration::days(FOLLOW_UP_AFTER_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lead::sample_lead;
    use chrono::TimeZone;

    fn lead_at(status: LeadStatus, created_at: DateTime<Utc>) -> Lead {
        let mut lead = sample_lead(created_at);
        lead.status = status;
        lead
    }

    fn instant(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn moving_to_same_status_is_a_noop() {
        let lead = lead_at(LeadStatus::NovoLead, instant(2026, 1, 1));
        let result = apply_transition(&lead, LeadStatus::NovoLead, None, instant(2026, 1, 5));
        assert!(result.is_none());
    }

    #[test]
    fn first_move_to_client_captures_conversion_date() {
        let lead = lead_at(LeadStatus::ContratoAssinado, instant(2026, 1, 1));
        let now = instant(2026, 1, 10);
        let t = apply_transition(&lead, LeadStatus::Cliente, None, now).unwrap();

        assert_eq!(t.status, LeadStatus::Cliente);
        assert_eq!(t.last_moved_at, now);
        assert_eq!(t.conversion_date, Some(now));
    }

    #[test]
    fn returning_to_client_keeps_original_conversion_date() {
        let mut lead = lead_at(LeadStatus::ContatoRealizado, instant(2026, 1, 1));
        lead.conversion_date = Some(instant(2026, 1, 5));

        let t = apply_transition(&lead, LeadStatus::Cliente, None, instant(2026, 2, 1)).unwrap();

        // None aqui significa "preserva o valor do banco" (COALESCE no UPDATE)
        assert_eq!(t.conversion_date, None);
    }

    #[test]
    fn moving_to_non_client_stores_rejection_reason() {
        let lead = lead_at(LeadStatus::NovoLead, instant(2026, 1, 1));
        let t = apply_transition(
            &lead,
            LeadStatus::NaoCliente,
            Some("Valor muito alto".to_string()),
            instant(2026, 1, 2),
        )
        .unwrap();

        assert_eq!(t.rejection_reason.as_deref(), Some("Valor muito alto"));
    }

    #[test]
    fn moving_to_non_client_without_reason_leaves_it_unset() {
        let lead = lead_at(LeadStatus::NovoLead, instant(2026, 1, 1));
        let t =
            apply_transition(&lead, LeadStatus::NaoCliente, None, instant(2026, 1, 2)).unwrap();
        assert_eq!(t.rejection_reason, None);
    }

    #[test]
    fn leaving_non_client_clears_rejection_reason() {
        let mut lead = lead_at(LeadStatus::NaoCliente, instant(2026, 1, 1));
        lead.rejection_reason = Some("Desistiu".to_string());

        let t = apply_transition(
            &lead,
            LeadStatus::ContatoRealizado,
            Some("esse motivo deve ser ignorado".to_string()),
            instant(2026, 1, 3),
        )
        .unwrap();

        assert_eq!(t.rejection_reason, None);
    }

    #[test]
    fn stale_tag_only_after_seven_days() {
        let lead = lead_at(LeadStatus::ContatoRealizado, instant(2026, 1, 1));

        assert!(!needs_stale_tag(&lead, instant(2026, 1, 7)));
        assert!(needs_stale_tag(&lead, instant(2026, 1, 8)));
    }

    #[test]
    fn stale_tag_uses_last_moved_at_when_present() {
        let mut lead = lead_at(LeadStatus::ContatoRealizado, instant(2026, 1, 1));
        lead.last_moved_at = Some(instant(2026, 1, 10));

        // 9 dias desde a criação, mas só 2 desde a última movimentação
        assert!(!needs_stale_tag(&lead, instant(2026, 1, 12)));
        assert!(needs_stale_tag(&lead, instant(2026, 1, 17)));
    }

    #[test]
    fn stale_check_is_idempotent_once_tagged() {
        let mut lead = lead_at(LeadStatus::ContatoRealizado, instant(2026, 1, 1));
        lead.tags = Some(vec![STALE_TAG.to_string()]);

        assert!(!needs_stale_tag(&lead, instant(2026, 3, 1)));
    }

    #[test]
    fn follow_up_only_for_new_leads_past_three_days() {
        let fresh = lead_at(LeadStatus::NovoLead, instant(2026, 1, 10));
        let parked = lead_at(LeadStatus::NovoLead, instant(2026, 1, 1));
        let moved = lead_at(LeadStatus::ContatoRealizado, instant(2026, 1, 1));

        let now = instant(2026, 1, 11);
        assert!(!needs_follow_up(&fresh, now));
        assert!(needs_follow_up(&parked, now));
        assert!(!needs_follow_up(&moved, now));
    }
}
