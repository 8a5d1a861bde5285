use crate::http::{HttpRequest, HttpTransport};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

/// Free-text notification sink for warnings and run reports.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(&self, message: &str);
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for Box<T> {
    async fn send_message(&self, message: &str) {
        (**self).send_message(message).await
    }
}

/// Logs messages without sending them anywhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_message(&self, message: &str) {
        info!("{}", message);
    }
}

#[derive(Serialize)]
struct SlackPayload<'a> {
    text: &'a str,
    username: &'a str,
    icon_emoji: &'a str,
}

/// Posts every message to each configured Slack incoming webhook.
///
/// Delivery failures are logged and otherwise ignored.
pub struct SlackNotifier {
    transport: Arc<dyn HttpTransport>,
    webhooks: Vec<String>,
    username: String,
    icon_emoji: String,
}

impl SlackNotifier {
    pub fn new(transport: Arc<dyn HttpTransport>, webhooks: Vec<String>) -> Self {
        Self {
            transport,
            webhooks,
            username: "Trakt".to_string(),
            icon_emoji: ":strawberry:".to_string(),
        }
    }

    pub fn webhook_count(&self) -> usize {
        self.webhooks.len()
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn send_message(&self, message: &str) {
        info!("{}", message);

        let payload = SlackPayload {
            text: message,
            username: &self.username,
            icon_emoji: &self.icon_emoji,
        };

        for (index, webhook) in self.webhooks.iter().enumerate() {
            let request = match HttpRequest::post_json(webhook.as_str(), &payload) {
                Ok(request) => request.header("Content-Type", "application/json"),
                Err(e) => {
                    error!(error = %e, "failed encoding slack message");
                    return;
                }
            };

            // Webhook URLs embed a token, only the index is logged
            match self.transport.send(request).await {
                Ok(response) if response.is_success() => {}
                Ok(response) => {
                    error!(webhook = index, status = response.status, "failed sending slack message");
                }
                Err(e) => {
                    error!(webhook = index, error = %e, "failed sending slack message");
                }
            }
        }
    }
}
