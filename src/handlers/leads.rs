// src/handlers/leads.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::lead::{Lead, LeadChanges, LeadStatus, NewLead, ViolationType},
    services::lead_service::{LeadFilters, filter_leads},
};

// =============================================================================
//  CAPTURA (rota pública do site)
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Ana Souza")]
    pub name: String,

    #[validate(length(min = 8, message = "O telefone é obrigatório."))]
    #[schema(example = "51988887777")]
    pub phone: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub violation_type: ViolationType,

    // Atribuição de campanha: aceita verbatim, só checagem de presença
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    pub gclid: Option<String>,
    pub gbraid: Option<String>,
    pub fbclid: Option<String>,
    pub fbp: Option<String>,
}

// IP do visitante, na ordem dos proxies mais confiáveis
// (mesma ordem da função de captura original)
fn client_ip(headers: &HeaderMap) -> Option<String> {
    let from_header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(',').next().unwrap_or(v).trim().to_string())
            .filter(|v| !v.is_empty())
    };

    from_header("cf-connecting-ip")
        .or_else(|| from_header("x-real-ip"))
        .or_else(|| from_header("x-forwarded-for"))
}

// POST /api/leads
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    request_body = CreateLeadPayload,
    responses(
        (status = 201, description = "Lead capturado", body = Lead),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let new_lead = NewLead {
        user_id: app_state.lead_owner_id,
        name: payload.name,
        phone: payload.phone,
        email: payload.email,
        violation_type: payload.violation_type,
        utm_source: payload.utm_source,
        utm_medium: payload.utm_medium,
        utm_campaign: payload.utm_campaign,
        utm_term: payload.utm_term,
        utm_content: payload.utm_content,
        gclid: payload.gclid,
        gbraid: payload.gbraid,
        fbclid: payload.fbclid,
        fbp: payload.fbp,
        ip_address: client_ip(&headers),
    };

    let lead = app_state.lead_service.create_lead(new_lead).await?;

    Ok((StatusCode::CREATED, Json(lead)))
}

// =============================================================================
//  QUADRO (rotas internas)
// =============================================================================

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListLeadsQuery {
    /// Etapa do funil; ausente = todas
    pub status: Option<LeadStatus>,
    /// Tipo de infração; ausente = todos
    pub violation_type: Option<ViolationType>,
    /// Busca em nome, e-mail e telefone (dígitos)
    pub search: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoardResponse {
    pub leads: Vec<Lead>,
    // Total geral da conta, antes dos filtros (o contador do cabeçalho)
    pub total: usize,
    // Leads em "novo-lead" parados há 3+ dias (o aviso de follow-up)
    pub follow_up_pending: usize,
}

// GET /api/leads
#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "Leads",
    params(ListLeadsQuery),
    responses(
        (status = 200, description = "Quadro de leads (normalizado e filtrado)", body = BoardResponse),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_leads(
    State(app_state): State<AppState>,
    crate::middleware::auth::AuthenticatedUser(user): crate::middleware::auth::AuthenticatedUser,
    Query(query): Query<ListLeadsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = app_state
        .lead_service
        .load_board(user.id, Utc::now())
        .await?;

    let filters = LeadFilters {
        status: query.status,
        violation_type: query.violation_type,
        search: query.search,
    };

    let total = snapshot.leads.len();
    let leads = filter_leads(&snapshot.leads, &filters);

    Ok(Json(BoardResponse {
        leads,
        total,
        follow_up_pending: snapshot.follow_up_pending,
    }))
}

// =============================================================================
//  TRANSIÇÃO DE ETAPA E EDIÇÃO
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveLeadPayload {
    pub status: LeadStatus,
    // Só faz sentido ao mover para "nao-cliente"; ignorado nas demais
    #[schema(example = "Valor muito alto")]
    pub rejection_reason: Option<String>,
}

// PATCH /api/leads/{id}/status
#[utoipa::path(
    patch,
    path = "/api/leads/{id}/status",
    tag = "Leads",
    request_body = MoveLeadPayload,
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Lead movido (ou inalterado, se a etapa é a mesma)", body = Lead),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn move_lead(
    State(app_state): State<AppState>,
    crate::middleware::auth::AuthenticatedUser(user): crate::middleware::auth::AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<MoveLeadPayload>,
) -> Result<Json<Lead>, AppError> {
    let lead = app_state
        .lead_service
        .move_lead(user.id, id, payload.status, payload.rejection_reason, Utc::now())
        .await?;

    Ok(Json(lead))
}

// PATCH /api/leads/{id}
#[utoipa::path(
    patch,
    path = "/api/leads/{id}",
    tag = "Leads",
    request_body = LeadChanges,
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Lead atualizado", body = Lead),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_lead(
    State(app_state): State<AppState>,
    crate::middleware::auth::AuthenticatedUser(user): crate::middleware::auth::AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(changes): Json<LeadChanges>,
) -> Result<Json<Lead>, AppError> {
    let lead = app_state
        .lead_service
        .update_lead(user.id, id, &changes)
        .await?;

    Ok(Json(lead))
}
