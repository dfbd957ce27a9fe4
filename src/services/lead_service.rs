// src/services/lead_service.rs

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::LeadRepository,
    models::lead::{Lead, LeadStatus, NewLead, STALE_TAG, ViolationType},
    services::pipeline,
};

#[derive(Clone)]
pub struct LeadService {
    repo: LeadRepository,
}

// O que o quadro recebe ao carregar: a coleção normalizada (mais recente
// primeiro) e o total de leads aguardando follow-up.
#[derive(Debug)]
pub struct BoardSnapshot {
    pub leads: Vec<Lead>,
    pub follow_up_pending: usize,
}

impl LeadService {
    pub fn new(repo: LeadRepository) -> Self {
        Self { repo }
    }

    /// Captura de um novo lead (formulário público / widget de WhatsApp).
    pub async fn create_lead(&self, new_lead: NewLead) -> Result<Lead, AppError> {
        let lead = self.repo.create(&new_lead).await?;
        tracing::info!("📥 Novo lead capturado: {}", lead.id);
        Ok(lead)
    }

    /// Carrega o quadro da conta e roda o passe de normalização:
    /// todo lead parado há 7+ dias ganha a tag "Frio", e a lista de tags
    /// atualizada é persistida na hora. O passe é idempotente por lead
    /// (a presença da tag é checada antes), mas é uma leitura com efeito
    /// colateral, não uma consulta pura.
    pub async fn load_board(&self, owner_id: Uuid, now: DateTime<Utc>) -> Result<BoardSnapshot, AppError> {
        let mut leads = self.repo.list_by_owner(owner_id).await?;

        for lead in leads.iter_mut() {
            if pipeline::needs_stale_tag(lead, now) {
                let mut tags = lead.tags.take().unwrap_or_default();
                tags.push(STALE_TAG.to_string());
                self.repo.update_tags(owner_id, lead.id, &tags).await?;
                lead.tags = Some(tags);
            }
        }

        let follow_up_pending = leads
            .iter()
            .filter(|l| pipeline::needs_follow_up(l, now))
            .count();

        Ok(BoardSnapshot {
            leads,
            follow_up_pending,
        })
    }

    /// Move um lead para outra etapa do funil. Mover para a etapa atual
    /// devolve o lead como está, sem tocar em nada.
    pub async fn move_lead(
        &self,
        owner_id: Uuid,
        id: Uuid,
        new_status: LeadStatus,
        rejection_reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Lead, AppError> {
        let lead = self
            .repo
            .find_by_id(owner_id, id)
            .await?
            .ok_or(AppError::LeadNotFound)?;

        match pipeline::apply_transition(&lead, new_status, rejection_reason, now) {
            Some(transition) => {
                let updated = self.repo.apply_transition(owner_id, id, &transition).await?;
                tracing::info!("➡️ Lead {} movido para {:?}", id, new_status);
                Ok(updated)
            }
            None => Ok(lead),
        }
    }

    /// Edição de detalhes (modal do quadro). Status não muda por aqui.
    pub async fn update_lead(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: &crate::models::lead::LeadChanges,
    ) -> Result<Lead, AppError> {
        self.repo.update_details(owner_id, id, changes).await
    }
}

// =============================================================================
//  FILTRO / BUSCA (projeção pura sobre a coleção em memória)
// =============================================================================

#[derive(Debug, Default, Clone)]
pub struct LeadFilters {
    pub status: Option<LeadStatus>,
    pub violation_type: Option<ViolationType>,
    pub search: Option<String>,
}

fn only_digits(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn matches_search(lead: &Lead, term: &str) -> bool {
    let term_lower = term.to_lowercase();

    if lead.name.to_lowercase().contains(&term_lower) {
        return true;
    }
    if lead
        .email
        .as_deref()
        .is_some_and(|email| email.to_lowercase().contains(&term_lower))
    {
        return true;
    }

    // Telefone: compara só os dígitos dos dois lados, para que
    // "(51) 99999-0000" case com "51999"
    let term_digits = only_digits(term);
    !term_digits.is_empty() && only_digits(&lead.phone).contains(&term_digits)
}

/// Aplica os filtros do quadro com AND lógico, preservando a ordem de
/// entrada. Não muta a coleção; lista vazia é um resultado válido.
pub fn filter_leads(leads: &[Lead], filters: &LeadFilters) -> Vec<Lead> {
    leads
        .iter()
        .filter(|lead| {
            filters.status.is_none_or(|status| lead.status == status)
                && filters
                    .violation_type
                    .is_none_or(|vt| lead.violation_type == vt)
                && filters
                    .search
                    .as_deref()
                    .map(str::trim)
                    .filter(|term| !term.is_empty())
                    .map_or(true, |term| matches_search(lead, term))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lead::sample_lead;
    use chrono::TimeZone;

    fn named(name: &str, phone: &str, email: Option<&str>) -> Lead {
        let mut lead = sample_lead(Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap());
        lead.name = name.to_string();
        lead.phone = phone.to_string();
        lead.email = email.map(str::to_string);
        lead
    }

    #[test]
    fn empty_filters_keep_every_lead_in_order() {
        let leads = vec![
            named("Maria", "51911112222", None),
            named("João Silva", "51933334444", None),
        ];

        let result = filter_leads(&leads, &LeadFilters::default());

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, "Maria");
        assert_eq!(result[1].name, "João Silva");
    }

    #[test]
    fn search_is_case_insensitive_on_name() {
        let leads = vec![
            named("João Silva", "51933334444", None),
            named("Maria", "51911112222", None),
        ];

        let result = filter_leads(
            &leads,
            &LeadFilters {
                search: Some("joão".to_string()),
                ..Default::default()
            },
        );

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "João Silva");
    }

    #[test]
    fn search_matches_email_substring() {
        let leads = vec![
            named("Maria", "51911112222", Some("maria@empresa.com.br")),
            named("Pedro", "51933334444", Some("pedro@outro.com")),
        ];

        let result = filter_leads(
            &leads,
            &LeadFilters {
                search: Some("EMPRESA".to_string()),
                ..Default::default()
            },
        );

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Maria");
    }

    #[test]
    fn phone_search_ignores_formatting() {
        let leads = vec![named("Ana", "(51) 99999-0000", None)];

        let result = filter_leads(
            &leads,
            &LeadFilters {
                search: Some("51999".to_string()),
                ..Default::default()
            },
        );

        assert_eq!(result.len(), 1);
    }

    #[test]
    fn filters_compose_with_logical_and() {
        let mut matching = named("Carlos", "51955556666", None);
        matching.status = LeadStatus::Cliente;
        matching.violation_type = ViolationType::Bafometro;

        let mut wrong_status = named("Carlos Souza", "51900001111", None);
        wrong_status.status = LeadStatus::NovoLead;
        wrong_status.violation_type = ViolationType::Bafometro;

        let leads = vec![matching, wrong_status];

        let result = filter_leads(
            &leads,
            &LeadFilters {
                status: Some(LeadStatus::Cliente),
                violation_type: Some(ViolationType::Bafometro),
                search: Some("carlos".to_string()),
            },
        );

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Carlos");
    }

    #[test]
    fn no_match_yields_empty_not_error() {
        let leads = vec![named("Maria", "51911112222", None)];

        let result = filter_leads(
            &leads,
            &LeadFilters {
                search: Some("inexistente".to_string()),
                ..Default::default()
            },
        );

        assert!(result.is_empty());
    }

    #[test]
    fn filtering_twice_yields_identical_output() {
        let leads = vec![
            named("João Silva", "51933334444", None),
            named("Maria", "51911112222", None),
        ];
        let filters = LeadFilters {
            search: Some("maria".to_string()),
            ..Default::default()
        };

        let first: Vec<String> = filter_leads(&leads, &filters)
            .into_iter()
            .map(|l| l.name)
            .collect();
        let second: Vec<String> = filter_leads(&leads, &filters)
            .into_iter()
            .map(|l| l.name)
            .collect();

        assert_eq!(first, second);
        assert_eq!(leads.len(), 2); // coleção de entrada intacta
    }
}
