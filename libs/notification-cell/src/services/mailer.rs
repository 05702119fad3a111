use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use shared_config::AppConfig;

/// HTTP mail relay client. Delivery is best-effort: every failure path
/// logs and reports `false`, callers never see an error.
pub struct MailNotifier {
    client: Client,
    relay_url: Option<String>,
    api_token: Option<String>,
    sender: String,
}

impl MailNotifier {
    pub fn new(config: &AppConfig) -> Self {
        if !config.is_mail_configured() {
            warn!("Mail relay not configured, notifications will be skipped");
        }

        Self {
            client: Client::new(),
            relay_url: config.mail_relay_url.clone(),
            api_token: config.mail_relay_api_token.clone(),
            sender: config.mail_sender.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.relay_url.is_some() && self.api_token.is_some()
    }

    /// Sends one message through the relay. Returns whether the relay
    /// accepted it.
    pub async fn send(&self, recipient: &str, subject: &str, body: &str) -> bool {
        let (relay_url, api_token) = match (&self.relay_url, &self.api_token) {
            (Some(url), Some(token)) => (url, token),
            _ => {
                debug!("Mail relay not configured, skipping notification to {}", recipient);
                return false;
            }
        };

        let request_body = json!({
            "from": self.sender,
            "to": recipient,
            "subject": subject,
            "text": body,
        });

        debug!("Sending notification to {} via {}", recipient, relay_url);

        let response = self
            .client
            .post(format!("{}/messages", relay_url))
            .header("Authorization", format!("Bearer {}", api_token))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await;

        match response {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    debug!("Notification sent to {}: {}", recipient, subject);
                    true
                } else {
                    let response_text = response.text().await.unwrap_or_default();
                    warn!("Mail relay rejected notification ({}): {}", status, response_text);
                    false
                }
            }
            Err(e) => {
                warn!("Failed to reach mail relay: {}", e);
                false
            }
        }
    }
}
