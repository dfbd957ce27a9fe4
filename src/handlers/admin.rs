// src/handlers/admin.rs
//
// Rotas de administração: lista de e-mails autorizados e convites.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{AuthorizedEmail, Role},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddAuthorizedEmailPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "nova.pessoa@sosmultas.com.br")]
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetActivePayload {
    pub is_active: bool,
}

// GET /api/admin/authorized-emails
#[utoipa::path(
    get,
    path = "/api/admin/authorized-emails",
    tag = "Admin",
    responses(
        (status = 200, description = "Lista completa de e-mails autorizados", body = [AuthorizedEmail]),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_authorized_emails(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<AuthorizedEmail>>, AppError> {
    let entries = app_state.admin_service.list_authorized().await?;
    Ok(Json(entries))
}

// POST /api/admin/authorized-emails
#[utoipa::path(
    post,
    path = "/api/admin/authorized-emails",
    tag = "Admin",
    request_body = AddAuthorizedEmailPayload,
    responses(
        (status = 201, description = "E-mail cadastrado", body = AuthorizedEmail),
        (status = 409, description = "E-mail já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_authorized_email(
    State(app_state): State<AppState>,
    Json(payload): Json<AddAuthorizedEmailPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let entry = app_state
        .admin_service
        .add_authorized(
            &payload.email,
            payload.first_name.as_deref(),
            payload.last_name.as_deref(),
            payload.role,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

// PATCH /api/admin/authorized-emails/{id}
#[utoipa::path(
    patch,
    path = "/api/admin/authorized-emails/{id}",
    tag = "Admin",
    request_body = SetActivePayload,
    params(("id" = Uuid, Path, description = "ID do registro")),
    responses(
        (status = 200, description = "Registro atualizado", body = AuthorizedEmail),
        (status = 404, description = "Registro não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_authorized_email_active(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetActivePayload>,
) -> Result<Json<AuthorizedEmail>, AppError> {
    let entry = app_state
        .admin_service
        .set_active(id, payload.is_active)
        .await?;
    Ok(Json(entry))
}

// DELETE /api/admin/authorized-emails/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/authorized-emails/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID do registro")),
    responses(
        (status = 204, description = "Registro removido"),
        (status = 404, description = "Registro não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_authorized_email(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.admin_service.delete_authorized(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/admin/authorized-emails/{id}/invite
#[utoipa::path(
    post,
    path = "/api/admin/authorized-emails/{id}/invite",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID do registro")),
    responses(
        (status = 200, description = "Convite disparado, conta provisória criada", body = AuthorizedEmail),
        (status = 404, description = "Registro não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn invite_authorized_email(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AuthorizedEmail>, AppError> {
    let entry = app_state.admin_service.invite(id).await?;
    Ok(Json(entry))
}
