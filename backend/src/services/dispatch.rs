//! SMS alert dispatch with independent per-recipient fan-out.
//!
//! Every recipient send runs concurrently; one failure never blocks or
//! cancels the others, and the dispatcher waits for every outcome before
//! returning. A call counts as successful when at least one recipient was
//! reached.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinSet;
use tokio::time::timeout;

use crate::config::Config;

/// Per-recipient delivery budget; a timeout is that recipient's failure only.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct RecipientError {
    pub recipient: String,
    pub error: String,
}

#[derive(Debug)]
pub struct DispatchResult {
    pub sent: usize,
    pub failed: usize,
    pub errors: Vec<RecipientError>,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("No notification recipients are configured")]
    NoRecipientsConfigured,
    #[error("All notification sends failed: {details}")]
    DeliveryFailed {
        details: String,
        errors: Vec<RecipientError>,
    },
}

/// One outbound SMS per call. Implementations must be cheap to share across
/// spawned send tasks.
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Returns the provider message id on success.
    async fn send(&self, to: &str, body: &str) -> anyhow::Result<String>;
}

/// Twilio-compatible REST gateway client.
pub struct TwilioSender {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl TwilioSender {
    /// Builds a sender when every gateway setting is configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        let account_sid = config.sms_account_sid.clone()?;
        let auth_token = config.sms_auth_token.clone()?;
        let from_number = config.sms_from_number.clone()?;
        Some(Self {
            client: reqwest::Client::new(),
            account_sid,
            auth_token,
            from_number,
        })
    }
}

#[async_trait]
impl SmsSender for TwilioSender {
    async fn send(&self, to: &str, body: &str) -> anyhow::Result<String> {
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.account_sid
        );
        let params = [("To", to), ("From", self.from_number.as_str()), ("Body", body)];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            anyhow::bail!("SMS gateway returned {}: {}", status, detail);
        }

        let payload: serde_json::Value = response.json().await?;
        Ok(payload
            .get("sid")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string())
    }
}

/// Sends `message` to every recipient concurrently and waits for all
/// outcomes.
pub async fn dispatch(
    sender: Arc<dyn SmsSender>,
    message: &str,
    recipients: &[String],
) -> Result<DispatchResult, DispatchError> {
    if recipients.is_empty() {
        return Err(DispatchError::NoRecipientsConfigured);
    }

    let mut tasks = JoinSet::new();
    for recipient in recipients {
        let sender = Arc::clone(&sender);
        let recipient = recipient.clone();
        let message = message.to_string();
        tasks.spawn(async move {
            let outcome = match timeout(SEND_TIMEOUT, sender.send(&recipient, &message)).await {
                Ok(Ok(_sid)) => Ok(()),
                Ok(Err(err)) => Err(err.to_string()),
                Err(_) => Err("send timed out".to_string()),
            };
            (recipient, outcome)
        });
    }

    let mut sent = 0usize;
    let mut errors = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(()))) => sent += 1,
            Ok((recipient, Err(error))) => errors.push(RecipientError { recipient, error }),
            // A panicked send task is that recipient's failure; siblings
            // keep running.
            Err(join_err) => errors.push(RecipientError {
                recipient: "<unknown>".to_string(),
                error: join_err.to_string(),
            }),
        }
    }

    let failed = errors.len();
    if sent == 0 {
        let details = errors
            .iter()
            .map(|e| format!("{}: {}", e.recipient, e.error))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(DispatchError::DeliveryFailed { details, errors });
    }

    Ok(DispatchResult {
        sent,
        failed,
        errors,
    })
}
