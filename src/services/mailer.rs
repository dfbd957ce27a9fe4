// src/services/mailer.rs
//
// Envio do e-mail de convite via provedor HTTP (API estilo Resend).
// O restante do sistema trata o envio como fire-and-forget: falha de
// e-mail vira log, nunca erro para quem chamou.

use serde_json::json;

use crate::models::auth::Role;

#[derive(Clone)]
pub struct Mailer {
    client: reqwest::Client,
    api_url: Option<String>,
    api_key: String,
    from: String,
    app_url: String,
}

impl Mailer {
    pub fn new(api_url: Option<String>, api_key: String, from: String, app_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            from,
            app_url,
        }
    }

    /// Monta e envia o convite com a senha provisória.
    /// Sem MAIL_API_URL configurada (ambiente local), só loga o convite.
    pub async fn send_invitation(
        &self,
        email: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
        role: Role,
        temp_password: &str,
    ) -> anyhow::Result<()> {
        let Some(api_url) = &self.api_url else {
            tracing::warn!(
                "✉️ MAIL_API_URL ausente; convite para {} não foi enviado (senha provisória gerada).",
                email
            );
            return Ok(());
        };

        let name = match (first_name, last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.to_string(),
            _ => email.to_string(),
        };

        let body = json!({
            "from": self.from,
            "to": [email],
            "subject": "Convite - SOS Multas CRM",
            "html": format!(
                "<p>Olá, {}!</p>\
                 <p>Você foi convidado(a) para acessar o CRM da SOS Multas \
                 com o papel <b>{:?}</b>.</p>\
                 <p>Acesse <a href=\"{}\">{}</a> e entre com este e-mail e a \
                 senha provisória: <b>{}</b></p>\
                 <p>Na primeira entrada será pedida a troca da senha.</p>",
                name, role, self.app_url, self.app_url, temp_password
            ),
        });

        let response = self
            .client
            .post(api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Provedor de e-mail respondeu {} para o convite de {}",
                response.status(),
                email
            );
        }

        tracing::info!("✉️ Convite enviado para {}", email);
        Ok(())
    }
}
