// src/db/lead_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::lead::{Lead, NewLead},
    services::pipeline::LeadTransition,
};

// Todas as consultas filtram por user_id: um usuário nunca lê
// nem escreve o lead de outra conta.
#[derive(Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Busca todos os leads da conta, do mais recente para o mais antigo.
    /// Essa é a ordem que o quadro e o dashboard consomem.
    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Lead>, AppError> {
        let leads = sqlx::query_as::<_, Lead>(
            r#"
            SELECT * FROM leads
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(leads)
    }

    pub async fn find_by_id(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Lead>, AppError> {
        let lead = sqlx::query_as::<_, Lead>(
            "SELECT * FROM leads WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(lead)
    }

    /// Insere um lead recém-capturado (formulário público ou widget).
    /// Atribuição de campanha entra verbatim, como veio da página.
    pub async fn create(&self, new_lead: &NewLead) -> Result<Lead, AppError> {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (
                user_id, name, phone, email, violation_type,
                utm_source, utm_medium, utm_campaign, utm_term, utm_content,
                gclid, gbraid, fbclid, fbp, ip_address
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(new_lead.user_id)
        .bind(&new_lead.name)
        .bind(&new_lead.phone)
        .bind(&new_lead.email)
        .bind(new_lead.violation_type)
        .bind(&new_lead.utm_source)
        .bind(&new_lead.utm_medium)
        .bind(&new_lead.utm_campaign)
        .bind(&new_lead.utm_term)
        .bind(&new_lead.utm_content)
        .bind(&new_lead.gclid)
        .bind(&new_lead.gbraid)
        .bind(&new_lead.fbclid)
        .bind(&new_lead.fbp)
        .bind(&new_lead.ip_address)
        .fetch_one(&self.pool)
        .await?;

        Ok(lead)
    }

    /// Aplica uma transição de etapa em um único UPDATE.
    /// conversion_date usa COALESCE: o serviço só manda Some na primeira
    /// chegada em "cliente", e o banco nunca sobrescreve um valor existente.
    pub async fn apply_transition(
        &self,
        owner_id: Uuid,
        id: Uuid,
        transition: &LeadTransition,
    ) -> Result<Lead, AppError> {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            UPDATE leads
            SET status = $3,
                last_moved_at = $4,
                conversion_date = COALESCE($5, conversion_date),
                rejection_reason = $6,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(transition.status)
        .bind(transition.last_moved_at)
        .bind(transition.conversion_date)
        .bind(&transition.rejection_reason)
        .fetch_optional(&self.pool)
        .await?;

        lead.ok_or(AppError::LeadNotFound)
    }

    /// Edição de detalhes feita no modal. Campo ausente = não altera
    /// (semântica de PATCH via COALESCE). Status não passa por aqui:
    /// mudança de etapa é sempre via apply_transition.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_details(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: &crate::models::lead::LeadChanges,
    ) -> Result<Lead, AppError> {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            UPDATE leads
            SET name            = COALESCE($3, name),
                phone           = COALESCE($4, phone),
                email           = COALESCE($5, email),
                violation_type  = COALESCE($6, violation_type),
                amount          = COALESCE($7, amount),
                payment_method  = COALESCE($8, payment_method),
                observations    = COALESCE($9, observations),
                tags            = COALESCE($10, tags),
                documents       = COALESCE($11, documents),
                cnh_at_risk     = COALESCE($12, cnh_at_risk),
                appealed_before = COALESCE($13, appealed_before),
                urgency         = COALESCE($14, urgency),
                updated_at      = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(&changes.name)
        .bind(&changes.phone)
        .bind(&changes.email)
        .bind(changes.violation_type)
        .bind(changes.amount)
        .bind(changes.payment_method)
        .bind(&changes.observations)
        .bind(&changes.tags)
        .bind(&changes.documents)
        .bind(changes.cnh_at_risk)
        .bind(changes.appealed_before)
        .bind(changes.urgency)
        .fetch_optional(&self.pool)
        .await?;

        lead.ok_or(AppError::LeadNotFound)
    }

    /// Persiste a lista de tags depois do passe de normalização
    /// (tag "Frio" aplicada no carregamento do quadro).
    pub async fn update_tags(
        &self,
        owner_id: Uuid,
        id: Uuid,
        tags: &[String],
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE leads
            SET tags = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(tags)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
