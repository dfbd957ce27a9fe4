// src/services/admin_service.rs
//
// Gestão da lista de e-mails autorizados e do fluxo de convite.

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AuthorizedEmailRepository, UserRepository},
    models::auth::{AuthorizedEmail, Role},
    services::mailer::Mailer,
};

const TEMP_PASSWORD_LEN: usize = 12;

#[derive(Clone)]
pub struct AdminService {
    authorized_repo: AuthorizedEmailRepository,
    user_repo: UserRepository,
    mailer: Mailer,
}

impl AdminService {
    pub fn new(
        authorized_repo: AuthorizedEmailRepository,
        user_repo: UserRepository,
        mailer: Mailer,
    ) -> Self {
        Self {
            authorized_repo,
            user_repo,
            mailer,
        }
    }

    pub async fn list_authorized(&self) -> Result<Vec<AuthorizedEmail>, AppError> {
        self.authorized_repo.list_all().await
    }

    /// Cadastra um e-mail na lista. E-mail duplicado vira o erro
    /// específico de conflito, não uma falha genérica.
    pub async fn add_authorized(
        &self,
        email: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
        role: Role,
    ) -> Result<AuthorizedEmail, AppError> {
        let email = email.trim().to_lowercase();
        self.authorized_repo
            .insert(&email, first_name, last_name, role)
            .await
    }

    pub async fn set_active(&self, id: Uuid, is_active: bool) -> Result<AuthorizedEmail, AppError> {
        self.authorized_repo.set_active(id, is_active).await
    }

    pub async fn delete_authorized(&self, id: Uuid) -> Result<(), AppError> {
        self.authorized_repo.delete(id).await
    }

    /// Convida um e-mail autorizado: gera senha provisória, cria (ou
    /// recria) a conta de login com a flag de troca obrigatória, registra
    /// o envio e dispara o e-mail em background. Falha no provedor de
    /// e-mail não falha a requisição: o log fica como rastro.
    pub async fn invite(&self, id: Uuid) -> Result<AuthorizedEmail, AppError> {
        let entry = self
            .authorized_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;

        let temp_password = generate_temp_password();

        let password_clone = temp_password.clone();
        let hashed = tokio::task::spawn_blocking(move || {
            bcrypt::hash(&password_clone, bcrypt::DEFAULT_COST)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        self.user_repo.upsert_invited(&entry.email, &hashed).await?;
        self.authorized_repo
            .mark_invitation_sent(entry.id, Utc::now())
            .await?;

        let mailer = self.mailer.clone();
        let recipient = entry.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer
                .send_invitation(
                    &recipient.email,
                    recipient.first_name.as_deref(),
                    recipient.last_name.as_deref(),
                    recipient.role,
                    &temp_password,
                )
                .await
            {
                tracing::error!("🔥 Falha ao enviar convite para {}: {}", recipient.email, e);
            }
        });

        // Devolve a linha já com invitation_sent atualizado
        self.authorized_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }
}

fn generate_temp_password() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghjkmnpqrstuvwxyz23456789";
    let mut rng = rand::thread_rng();
    (0..TEMP_PASSWORD_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}
