//! Twilio SMS client for price drop alerts
//!
//! Credentials are read once at start-up and owned by the client.

use crate::error::{Result, TrackerError};
use serde::Deserialize;
use std::path::Path;

/// Twilio REST API host
pub const TWILIO_API_URL: &str = "https://api.twilio.com";

/// Numbers are stored without a country code; all subscribers are US numbers
const COUNTRY_PREFIX: &str = "+1";

/// Anything that can text a subscriber
pub trait Notifier {
    fn send_sms(&self, message: &str, number: i64) -> Result<()>;
}

/// Contents of the secrets file (`auth.json`)
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    /// Sender number in E.164 form
    pub twilio_number: String,
}

impl Credentials {
    /// Load credentials from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        log::info!("Loading Twilio credentials from: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Twilio message resource (only the fields we log)
#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
    #[serde(default)]
    status: Option<String>,
}

/// Twilio error body
#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    #[serde(default)]
    code: Option<u32>,
    message: String,
}

/// Sends messages through the Twilio Messages API
#[derive(Debug, Clone)]
pub struct TwilioClient {
    client: reqwest::blocking::Client,
    credentials: Credentials,
    base_url: String,
}

impl TwilioClient {
    pub fn new(credentials: Credentials) -> Self {
        Self::with_base_url(credentials, TWILIO_API_URL)
    }

    /// Point the client at another host (for testing with mock servers).
    pub fn with_base_url(credentials: Credentials, base_url: &str) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            credentials,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.credentials.twilio_account_sid
        )
    }
}

impl Notifier for TwilioClient {
    fn send_sms(&self, message: &str, number: i64) -> Result<()> {
        let to = format!("{}{}", COUNTRY_PREFIX, number);
        log::debug!("Sending SMS to {}", to);

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(
                &self.credentials.twilio_account_sid,
                Some(&self.credentials.twilio_auth_token),
            )
            .form(&[
                ("To", to.as_str()),
                ("From", self.credentials.twilio_number.as_str()),
                ("Body", message),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let reason = match serde_json::from_str::<TwilioErrorBody>(&body) {
                Ok(err) => match err.code {
                    Some(code) => format!("{} (code {})", err.message, code),
                    None => err.message,
                },
                Err(_) => body,
            };
            return Err(TrackerError::SmsRejected {
                status,
                message: reason,
            });
        }

        // The message is accepted at this point; an unreadable receipt only loses the log line
        match response.json::<MessageResource>() {
            Ok(resource) => log::info!(
                "Sent SMS {} to {} ({})",
                resource.sid,
                to,
                resource.status.as_deref().unwrap_or("unknown")
            ),
            Err(e) => log::warn!("Sent SMS to {} but could not read the receipt: {}", to, e),
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "sms_tests.rs"]
mod tests;
