use std::time::Duration;

use reqwest::Client;
use serde_json::json;

use crate::config::Config;

/// Outbound call budget; a slow gateway fails the dispatch, nothing else.
const SMS_TIMEOUT_SECS: u64 = 10;

pub struct SmsService;

impl SmsService {
    fn client() -> Result<Client, String> {
        Client::builder()
            .timeout(Duration::from_secs(SMS_TIMEOUT_SECS))
            .build()
            .map_err(|e| format!("SMS client init failed: {}", e))
    }

    fn auth_key() -> Result<String, String> {
        Config::sms_auth_key().ok_or_else(|| "SMS_AUTH_KEY not configured".to_string())
    }

    fn base_url() -> Result<String, String> {
        Config::sms_base_url().ok_or_else(|| "SMS_BASE_URL not configured".to_string())
    }

    /// Send an OTP over the transactional route. Single attempt, no retry;
    /// the caller decides what a failure means for the response.
    pub async fn send_otp(phone: &str, code: &str) -> Result<(), String> {
        if !Config::is_sms_enabled() {
            return Err("SMS gateway is not configured".to_string());
        }

        let message = format!(
            "Your OTP is: {}. Valid for {} minutes.",
            code,
            Config::otp_expiry_minutes()
        );

        let body = json!({
            "authKey": Self::auth_key()?,
            "mobileNumbers": phone,
            "message": message,
            "sender": Config::sms_sender(),
            "route": "4",
        });

        let res = Self::client()?
            .post(Self::base_url()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("SMS request failed: {}", e))?;

        if !res.status().is_success() {
            return Err(res
                .text()
                .await
                .unwrap_or_else(|_| "SMS gateway error".to_string()));
        }

        Ok(())
    }
}
