//! Best-effort push notifications
//!
//! Delivery is informational only: a notification is attempted when both
//! Pushover credentials are configured, any failure is logged and
//! discarded, and nothing here ever propagates an error into the
//! conversation that triggered it.

use std::time::Duration;

use reqwest::Client;

use crate::config::Config;

const PUSHOVER_ENDPOINT: &str = "https://api.pushover.net/1/messages.json";

/// A slow or unreachable endpoint must not stall the turn that sent the
/// notification.
const NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
struct Credentials {
    token: String,
    user: String,
}

pub struct Notifier {
    client: Client,
    endpoint: String,
    credentials: Option<Credentials>,
}

impl Notifier {
    pub fn from_config(config: &Config) -> Self {
        let credentials = match (&config.pushover_token, &config.pushover_user) {
            (Some(token), Some(user)) => Some(Credentials {
                token: token.clone(),
                user: user.clone(),
            }),
            _ => None,
        };
        Self::new(PUSHOVER_ENDPOINT, credentials)
    }

    /// A notifier with no credentials: every send is a no-op.
    pub fn disabled() -> Self {
        Self::new(PUSHOVER_ENDPOINT, None)
    }

    fn new(endpoint: &str, credentials: Option<Credentials>) -> Self {
        let client = Client::builder()
            .timeout(NOTIFY_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            endpoint: endpoint.to_string(),
            credentials,
        }
    }

    /// Configured notifier aimed at an arbitrary endpoint.
    #[cfg(test)]
    pub(crate) fn with_endpoint(endpoint: &str, token: &str, user: &str) -> Self {
        Self::new(
            endpoint,
            Some(Credentials {
                token: token.into(),
                user: user.into(),
            }),
        )
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    /// Fire-and-forget delivery. Never returns an error: transport
    /// failures and non-2xx statuses are logged and dropped.
    pub async fn send(&self, text: &str) {
        let Some(credentials) = &self.credentials else {
            tracing::debug!("push notifications not configured, dropping message");
            return;
        };

        let form = [
            ("token", credentials.token.as_str()),
            ("user", credentials.user.as_str()),
            ("message", text),
        ];

        match self.client.post(&self.endpoint).form(&form).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!("push notification delivered");
            }
            Ok(response) => {
                tracing::warn!(status = %response.status(), "push notification rejected");
            }
            Err(e) => {
                tracing::warn!(error = %e, "push notification failed");
            }
        }
    }
}
