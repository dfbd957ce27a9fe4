// src/models/lead.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- ENUMS ---

// Mapeia o CREATE TYPE lead_status do banco.
// O funil é um conjunto fechado, mas nenhuma transição é proibida:
// o quadro permite pular etapas e voltar atrás.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "lead_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum LeadStatus {
    NovoLead,
    ContatoRealizado,
    DocumentosRecebidos,
    ContratoAssinado,
    Cliente,
    NaoCliente,
}

// Mapeia o CREATE TYPE violation_type do banco
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "violation_type", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ViolationType {
    ExcessoVelocidade,
    AvancoSinal,
    Bafometro,
    Suspensao,
    Cassacao,
    Multas,
    Outras,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    Pix,
    CartaoCredito,
    CartaoDebito,
    Transferencia,
    Dinheiro,
    Boleto,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "lead_urgency", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Urgency {
    Alta,
    Media,
    Baixa,
}

// Tag aplicada automaticamente quando o lead fica parado na mesma etapa.
// Nunca é removida pelo sistema, só por edição manual.
pub const STALE_TAG: &str = "Frio";

// Motivos exibidos pelo quadro ao mover para "Não Cliente".
// O campo aceita texto livre; esta lista é só a sugestão da UI.
pub const REJECTION_REASONS: [&str; 6] = [
    "Não respondeu",
    "Desistiu",
    "Fora do perfil",
    "Valor muito alto",
    "Já resolvido",
    "Outro",
];

// --- O LEAD ---

// Campos opcionais são Option<T> desde o banco: nenhum componente interno
// precisa distinguir "ausente" de "vazio".
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,

    // Dono do registro. Todas as leituras e escritas do CRM filtram por ele.
    #[schema(ignore)]
    pub user_id: Uuid,

    #[schema(example = "Ana Souza")]
    pub name: String,
    #[schema(example = "51988887777")]
    pub phone: String,
    #[schema(example = "ana@email.com")]
    pub email: Option<String>,

    pub violation_type: ViolationType,
    pub status: LeadStatus,

    // Valor cobrado quando vira cliente
    #[schema(value_type = Option<f64>, example = 1500.0)]
    pub amount: Option<Decimal>,
    pub payment_method: Option<PaymentMethod>,

    // Preenchida uma única vez, na primeira chegada em "cliente".
    // Nunca é limpa por transições posteriores.
    pub conversion_date: Option<DateTime<Utc>>,

    // Só existe enquanto o status for "nao-cliente"
    #[schema(example = "Valor muito alto")]
    pub rejection_reason: Option<String>,

    pub observations: Option<String>,
    #[schema(example = json!(["Frio"]))]
    pub tags: Option<Vec<String>>,
    pub documents: Option<Vec<String>>,

    pub cnh_at_risk: Option<bool>,
    pub appealed_before: Option<bool>,
    pub urgency: Option<Urgency>,

    // Atribuição de campanha, capturada verbatim no cadastro
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    pub gclid: Option<String>,
    pub gbraid: Option<String>,
    pub fbclid: Option<String>,
    pub fbp: Option<String>,
    pub ip_address: Option<String>,

    // Atualizada a cada mudança de etapa (inclusive a primeira)
    pub last_moved_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    /// Instante de referência para "tempo parado na etapa":
    /// a última movimentação, ou a criação se nunca foi movido.
    pub fn moved_or_created_at(&self) -> DateTime<Utc> {
        self.last_moved_at.unwrap_or(self.created_at)
    }
}

// Dados de um lead recém-capturado, já atribuído à conta do negócio.
// O banco preenche status ("novo-lead"), created_at e o restante.
#[derive(Debug, Clone)]
pub struct NewLead {
    pub user_id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub violation_type: ViolationType,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    pub gclid: Option<String>,
    pub gbraid: Option<String>,
    pub fbclid: Option<String>,
    pub fbp: Option<String>,
    pub ip_address: Option<String>,
}

// Lead mínimo para os testes de funil, agregação e filtro.
#[cfg(test)]
pub(crate) fn sample_lead(created_at: DateTime<Utc>) -> Lead {
    Lead {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        name: "Ana Souza".to_string(),
        phone: "51988887777".to_string(),
        email: None,
        violation_type: ViolationType::ExcessoVelocidade,
        status: LeadStatus::NovoLead,
        amount: None,
        payment_method: None,
        conversion_date: None,
        rejection_reason: None,
        observations: None,
        tags: None,
        documents: None,
        cnh_at_risk: None,
        appealed_before: None,
        urgency: None,
        utm_source: None,
        utm_medium: None,
        utm_campaign: None,
        utm_term: None,
        utm_content: None,
        gclid: None,
        gbraid: None,
        fbclid: None,
        fbp: None,
        ip_address: None,
        last_moved_at: None,
        created_at,
        updated_at: created_at,
    }
}

// Edição parcial feita pelo modal do quadro: campo ausente = não altera.
// Mudança de status NÃO entra aqui (sempre via transição de etapa).
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub violation_type: Option<ViolationType>,
    #[schema(value_type = Option<f64>)]
    pub amount: Option<Decimal>,
    pub payment_method: Option<PaymentMethod>,
    pub observations: Option<String>,
    pub tags: Option<Vec<String>>,
    pub documents: Option<Vec<String>>,
    pub cnh_at_risk: Option<bool>,
    pub appealed_before: Option<bool>,
    pub urgency: Option<Urgency>,
}
