use anyhow::anyhow;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: u64,
    /// Base URL the frontend is served from; invitation and safety links are
    /// built against it.
    pub app_base_url: String,
    pub invitation_expiry_days: i64,
    pub time_zone: Tz,
    /// Twilio-compatible SMS gateway credentials. All three must be present
    /// for real-time dispatch; otherwise SOS triggers fall back to manual
    /// sending.
    pub sms_account_sid: Option<String>,
    pub sms_auth_token: Option<String>,
    pub sms_from_number: Option<String>,
    /// Always-notified emergency numbers, in addition to a client's own
    /// emergency contact.
    pub emergency_numbers: Vec<String>,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/coachlog".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .unwrap_or_else(|_| "your-secret-key-change-this-in-production".to_string());

        let jwt_expiration_hours = env::var("JWT_EXPIRATION_HOURS")
            .unwrap_or_else(|_| "12".to_string())
            .parse()
            .unwrap_or(12);

        let app_base_url =
            env::var("APP_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
        let app_base_url = app_base_url.trim_end_matches('/').to_string();

        let invitation_expiry_days = env::var("INVITATION_EXPIRY_DAYS")
            .unwrap_or_else(|_| "7".to_string())
            .parse()
            .unwrap_or(7);

        let time_zone_name = env::var("APP_TIMEZONE").unwrap_or_else(|_| "UTC".to_string());
        let time_zone: Tz = time_zone_name
            .parse()
            .map_err(|_| anyhow!("Invalid APP_TIMEZONE value: {}", time_zone_name))?;

        let sms_account_sid = env::var("SMS_ACCOUNT_SID").ok().filter(|v| !v.is_empty());
        let sms_auth_token = env::var("SMS_AUTH_TOKEN").ok().filter(|v| !v.is_empty());
        let sms_from_number = env::var("SMS_FROM_NUMBER").ok().filter(|v| !v.is_empty());

        let emergency_numbers = env::var("EMERGENCY_CONTACT_NUMBERS")
            .unwrap_or_default()
            .split(',')
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();

        Ok(Config {
            database_url,
            jwt_secret,
            jwt_expiration_hours,
            app_base_url,
            invitation_expiry_days,
            time_zone,
            sms_account_sid,
            sms_auth_token,
            sms_from_number,
            emergency_numbers,
        })
    }

    /// Returns `true` when every SMS gateway setting is present.
    pub fn sms_configured(&self) -> bool {
        self.sms_account_sid.is_some() && self.sms_auth_token.is_some() && self.sms_from_number.is_some()
    }

    pub fn invitation_link(&self, token: &str) -> String {
        format!("{}/setup-account?token={}", self.app_base_url, token)
    }

    pub fn safety_link(&self, token: &str) -> String {
        format!("{}/sos?token={}", self.app_base_url, token)
    }
}
