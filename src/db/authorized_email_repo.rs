// src/db/authorized_email_repo.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{AuthorizedEmail, Role},
};

// Repositório da lista de e-mails autorizados (o "porteiro" da ferramenta).
#[derive(Clone)]
pub struct AuthorizedEmailRepository {
    pool: PgPool,
}

impl AuthorizedEmailRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<AuthorizedEmail>, AppError> {
        let entries = sqlx::query_as::<_, AuthorizedEmail>(
            "SELECT * FROM authorized_emails ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AuthorizedEmail>, AppError> {
        let entry = sqlx::query_as::<_, AuthorizedEmail>(
            "SELECT * FROM authorized_emails WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    /// A verificação do portão de autorização: existe uma linha ATIVA
    /// para este e-mail? E-mail chega aqui já em minúsculas.
    pub async fn find_active_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AuthorizedEmail>, AppError> {
        let entry = sqlx::query_as::<_, AuthorizedEmail>(
            "SELECT * FROM authorized_emails WHERE email = $1 AND is_active = true",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    pub async fn insert(
        &self,
        email: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
        role: Role,
    ) -> Result<AuthorizedEmail, AppError> {
        sqlx::query_as::<_, AuthorizedEmail>(
            r#"
            INSERT INTO authorized_emails (email, first_name, last_name, role, is_active)
            VALUES ($1, $2, $3, $4, true)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Converte erro de violação de chave única em uma mensagem específica
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            e.into()
        })
    }

    pub async fn set_active(&self, id: Uuid, is_active: bool) -> Result<AuthorizedEmail, AppError> {
        let entry = sqlx::query_as::<_, AuthorizedEmail>(
            r#"
            UPDATE authorized_emails
            SET is_active = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?;

        entry.ok_or(AppError::NotFound)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM authorized_emails WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    /// Marca que o e-mail já possui uma conta real de login.
    /// Chamado no primeiro login bem-sucedido; nas vezes seguintes é no-op.
    pub async fn mark_has_account(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE authorized_emails SET has_account = true WHERE id = $1 AND has_account = false",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn mark_invitation_sent(
        &self,
        id: Uuid,
        sent_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE authorized_emails SET invitation_sent = true, invitation_sent_at = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(sent_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
