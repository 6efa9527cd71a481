use crate::message::NotifyMessage;
use crate::notifier::{Notifier, NotifyError, NotifyResult};
use anyhow::Result;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

// ============================================================================
// 邮件通知
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// true 使用 STARTTLS，false 使用隐式 TLS
    #[serde(default = "default_starttls")]
    pub starttls: bool,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_starttls() -> bool {
    true
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            starttls: default_starttls(),
            username: None,
            password: None,
            from: String::new(),
            to: String::new(),
        }
    }
}

impl EmailConfig {
    /// 发件人、收件人都已配置
    pub fn is_complete(&self) -> bool {
        !self.smtp_host.is_empty() && !self.from.is_empty() && !self.to.is_empty()
    }
}

/// SMTP 邮件通知器，收件人固定
pub struct EmailNotifier {
    from: Mailbox,
    to: Mailbox,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailNotifier {
    pub fn new(config: &EmailConfig) -> std::result::Result<Self, NotifyError> {
        if !config.is_complete() {
            return Err(NotifyError::Config(
                "email.smtp_host, email.from and email.to must be set".to_string(),
            ));
        }

        let from: Mailbox = config.from.parse()?;
        let to: Mailbox = config.to.parse()?;

        let builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
        };
        let mut builder = builder.port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            from,
            to,
            mailer: builder.build(),
        })
    }

    pub fn recipient(&self) -> &Mailbox {
        &self.to
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, message: &NotifyMessage) -> Result<NotifyResult> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(&message.title)
            .header(ContentType::TEXT_PLAIN)
            .body(message.content.clone())?;

        match self.mailer.send(email).await {
            Ok(response) => {
                info!(to = %self.to, code = %response.code(), "Email sent");
                Ok(NotifyResult::success())
            }
            Err(e) => Ok(NotifyResult::failure(format!("Email send failed: {}", e))),
        }
    }

    fn name(&self) -> &str {
        "email"
    }
}

// ============================================================================
// Webhook 通知
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub url: String,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
}

pub struct WebhookNotifier {
    config: WebhookConfig,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(config: WebhookConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, message: &NotifyMessage) -> Result<NotifyResult> {
        let mut request = self.client.post(&self.config.url);

        if let Some(headers) = &self.config.headers {
            for (key, value) in headers {
                request = request.header(key, value);
            }
        }

        let response = request.json(message).send().await?;

        if response.status().is_success() {
            Ok(NotifyResult::success())
        } else {
            Ok(NotifyResult::failure(format!(
                "Webhook failed with status: {}",
                response.status()
            )))
        }
    }

    fn name(&self) -> &str {
        "webhook"
    }
}

// ============================================================================
// 日志通知（dry-run）
// ============================================================================

#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: &NotifyMessage) -> Result<NotifyResult> {
        info!(level = ?message.level, subject = %message.title, "{}", message.content);
        debug!(timestamp = %message.timestamp, "Notification written to log");
        Ok(NotifyResult::success())
    }

    fn name(&self) -> &str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[test]
    fn test_email_config_defaults() {
        let config: EmailConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.smtp_host, "smtp.gmail.com");
        assert_eq!(config.smtp_port, 587);
        assert!(config.starttls);
        assert!(!config.is_complete());
    }

    #[test]
    fn test_email_notifier_rejects_incomplete_config() {
        let err = EmailNotifier::new(&EmailConfig::default()).err().unwrap();
        assert!(matches!(err, NotifyError::Config(_)));
    }

    #[test]
    fn test_email_notifier_rejects_bad_address() {
        let config = EmailConfig {
            from: "not-an-email".to_string(),
            to: "ops@example.com".to_string(),
            ..Default::default()
        };
        let err = EmailNotifier::new(&config).err().unwrap();
        assert!(err.to_string().contains("Email address parse error"));
    }

    type Captured = Arc<Mutex<Vec<(Option<String>, serde_json::Value)>>>;

    async fn capture(
        State(captured): State<Captured>,
        headers: HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> StatusCode {
        let token = headers
            .get("x-gaswatch-token")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        captured.lock().await.push((token, body));
        StatusCode::OK
    }

    async fn reject() -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    /// 启动本地 webhook 服务，返回其地址
    fn spawn_webhook(app: Router) -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();

        let server = axum::Server::from_tcp(listener)
            .unwrap()
            .serve(app.into_make_service());
        tokio::spawn(server);

        format!("http://{}/hook", addr)
    }

    #[tokio::test]
    async fn test_webhook_posts_message_with_headers() {
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));
        let url = spawn_webhook(
            Router::new()
                .route("/hook", post(capture))
                .with_state(captured.clone()),
        );

        let mut headers = HashMap::new();
        headers.insert("x-gaswatch-token".to_string(), "s3cret".to_string());
        let notifier = WebhookNotifier::new(WebhookConfig {
            url,
            headers: Some(headers),
        });
        assert_eq!(notifier.name(), "webhook");
        assert!(notifier.is_enabled());

        let message = NotifyMessage::warning(
            "The cost of gas on the Ethereum network is high!",
            "The current cost of gas on the Ethereum network is 25 Gwei.",
        );
        let result = notifier.send(&message).await.unwrap();
        assert!(result.success);

        let captured = captured.lock().await;
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].0.as_deref(), Some("s3cret"));
        assert_eq!(captured[0].1["title"], message.title);
        assert_eq!(captured[0].1["level"], "warning");
    }

    #[tokio::test]
    async fn test_webhook_error_status_is_failure() {
        let url = spawn_webhook(Router::new().route("/hook", post(reject)));
        let notifier = WebhookNotifier::new(WebhookConfig { url, headers: None });

        let result = notifier
            .send(&NotifyMessage::info("Gas", "5 Gwei"))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.message.contains("500"));
    }

    #[tokio::test]
    async fn test_webhook_unreachable_is_error() {
        let notifier = WebhookNotifier::new(WebhookConfig {
            url: "http://127.0.0.1:9/hook".to_string(),
            headers: None,
        });
        assert!(notifier.send(&NotifyMessage::info("Gas", "5 Gwei")).await.is_err());
    }

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        let notifier = LogNotifier;
        let result = notifier
            .send(&NotifyMessage::info("Gas", "The current cost is 5 Gwei."))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(notifier.name(), "log");
        assert!(notifier.is_enabled());
    }
}
