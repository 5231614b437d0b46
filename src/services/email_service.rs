use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::AppConfig;
use crate::errors::{AppError, Result};

const IMPLICIT_TLS_PORT: u16 = 465;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_html(&self, to: &str, subject: &str, html: String) -> Result<()>;
}

#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let from: Mailbox = config
            .email_from
            .parse()
            .map_err(|e| AppError::configuration(format!("EMAIL_FROM: {}", e)))?;

        let relay = if config.smtp_port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
        };
        let builder = relay
            .map_err(|e| AppError::configuration(format!("SMTP relay {}: {}", config.smtp_host, e)))?;

        let transport = builder
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_html(&self, to: &str, subject: &str, html: String) -> Result<()> {
        let to: Mailbox = to
            .parse()
            .map_err(|e| AppError::email(format!("invalid recipient {}: {}", to, e)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)
            .map_err(|e| AppError::email(format!("message build failed: {}", e)))?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| AppError::email(e.to_string()))?;

        tracing::info!("📧 Email sent: {}", response.code());
        Ok(())
    }
}

pub const PASSWORD_RESET_SUBJECT: &str = "Your password recovery code";

pub fn password_reset_email(code: &str, ttl_minutes: i64) -> String {
    format!(
        "<p>Your password recovery code is: <strong>{}</strong>. \
         This code will expire in {} minutes.</p>",
        code, ttl_minutes
    )
}
