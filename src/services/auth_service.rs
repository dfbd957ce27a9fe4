// src/services/auth_service.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AuthorizedEmailRepository, UserRepository},
    models::auth::{AuthResponse, AuthorizedEmail, Claims, User},
};

/// O portão de autorização em si: só passa quem tem uma linha ATIVA na
/// lista de e-mails. A consulta já filtra por is_active, mas a regra é
/// reaplicada aqui para qualquer linha que chegue de outro caminho.
fn authorize_entry(entry: Option<AuthorizedEmail>) -> Result<AuthorizedEmail, AppError> {
    match entry {
        Some(entry) if entry.is_active => Ok(entry),
        _ => Err(AppError::AccessNotAuthorized),
    }
}

// Usuário apagado atrás de um token ainda válido: para o cliente é o
// mesmo que um token inválido, não um 404 de rota protegida.
fn user_for_claims(user: Option<User>) -> Result<User, AppError> {
    user.ok_or(AppError::InvalidToken)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    authorized_repo: AuthorizedEmailRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        authorized_repo: AuthorizedEmailRepository,
        jwt_secret: String,
    ) -> Self {
        Self {
            user_repo,
            authorized_repo,
            jwt_secret,
        }
    }

    /// Login + portão de autorização, na ordem:
    /// credencial válida -> linha ATIVA na lista de autorizados -> token.
    /// Sem linha ativa, nenhum token é emitido (o equivalente de API ao
    /// sign-out forçado da tela).
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let email = email.trim().to_lowercase();

        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação bcrypt em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let authorized =
            authorize_entry(self.authorized_repo.find_active_by_email(&email).await?)?;

        // Primeiro login bem-sucedido: marca que o e-mail já tem conta.
        // Idempotente, os logins seguintes não mudam nada.
        if !authorized.has_account {
            self.authorized_repo.mark_has_account(authorized.id).await?;
            tracing::info!("🔗 Primeira entrada de {}: has_account marcado.", email);
        }

        let token = self.create_token(user.id)?;

        Ok(AuthResponse {
            token,
            // Com senha provisória, o cliente redireciona para a troca
            must_reset_password: user.is_temp_password,
        })
    }

    /// Valida o token e reavalia o portão: se o e-mail foi desativado na
    /// lista, o acesso cai já na próxima requisição.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        let user = user_for_claims(self.user_repo.find_by_id(token_data.claims.sub).await?)?;

        authorize_entry(
            self.authorized_repo
                .find_active_by_email(&user.email)
                .await?,
        )?;

        Ok(user)
    }

    /// Troca de senha do próprio usuário; limpa a flag de senha provisória.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        new_password: &str,
    ) -> Result<User, AppError> {
        let password_clone = new_password.to_owned();
        let hashed = tokio::task::spawn_blocking(move || {
            hash(&password_clone, bcrypt::DEFAULT_COST)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        self.user_repo.update_password(user_id, &hashed).await
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Role;

    fn entry(is_active: bool) -> AuthorizedEmail {
        AuthorizedEmail {
            id: Uuid::new_v4(),
            email: "colaborador@sosmultas.com.br".to_string(),
            first_name: None,
            last_name: None,
            role: Role::User,
            is_active,
            has_account: false,
            invitation_sent: false,
            invitation_sent_at: None,
            created_at: Utc::now(),
        }
    }

    fn login_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "colaborador@sosmultas.com.br".to_string(),
            password_hash: "$2b$12$hash".to_string(),
            is_temp_password: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn gate_rejects_email_missing_from_the_list() {
        let result = authorize_entry(None);
        assert!(matches!(result, Err(AppError::AccessNotAuthorized)));
    }

    #[test]
    fn gate_rejects_deactivated_entry() {
        let result = authorize_entry(Some(entry(false)));
        assert!(matches!(result, Err(AppError::AccessNotAuthorized)));
    }

    #[test]
    fn gate_passes_active_entry_through() {
        let active = entry(true);
        let id = active.id;

        let authorized = authorize_entry(Some(active)).unwrap();
        assert_eq!(authorized.id, id);
    }

    #[test]
    fn deleted_user_behind_valid_token_reads_as_invalid_token() {
        let result = user_for_claims(None);
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[test]
    fn existing_user_passes_claims_resolution() {
        let user = login_user();
        let id = user.id;

        let resolved = user_for_claims(Some(user)).unwrap();
        assert_eq!(resolved.id, id);
    }
}
