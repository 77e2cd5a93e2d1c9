use rocket::figment::{Figment, providers::{Env, Format, Toml}};
use rocket::Config as RocketConfig;
use std::env;

pub struct Config;

impl Config {
    fn figment() -> Figment {
        let profile = env::var("ROCKET_PROFILE").unwrap_or_else(|_| "development".to_string());

        Figment::from(RocketConfig::default())
            .merge(Toml::file("Rocket.toml").nested())
            .select(&profile)
            .merge(Env::prefixed("ROCKET_").split("_"))
    }

    pub fn mongodb_uri() -> String {
        Self::figment()
            .extract_inner("mongodb_uri")
            .unwrap_or_else(|_| "mongodb://localhost:27017/glam".to_string())
    }

    pub fn jwt_secret() -> String {
        Self::figment()
            .extract_inner("jwt_secret")
            .unwrap_or_else(|_| "default-secret".to_string())
    }

    /// Token lifetime in seconds. Defaults to 7 days.
    pub fn jwt_expiry() -> i64 {
        Self::figment()
            .extract_inner("jwt_expiry")
            .unwrap_or(604800)
    }

    /// OTP challenge lifetime in minutes.
    pub fn otp_expiry_minutes() -> i64 {
        Self::figment()
            .extract_inner("otp_expiry_minutes")
            .unwrap_or(5)
    }

    /// When true, OTP codes are pinned to `static_otp` instead of a random
    /// draw. Only for test environments; must never be enabled in production.
    pub fn otp_test_mode() -> bool {
        Self::figment()
            .extract_inner("otp_test_mode")
            .unwrap_or(false)
    }

    pub fn static_otp() -> String {
        Self::figment()
            .extract_inner("static_otp")
            .unwrap_or_else(|_| "123456".to_string())
    }

    pub fn sms_auth_key() -> Option<String> {
        Self::figment()
            .extract_inner("sms_auth_key")
            .ok()
    }

    pub fn sms_base_url() -> Option<String> {
        Self::figment()
            .extract_inner("sms_base_url")
            .ok()
    }

    pub fn sms_sender() -> String {
        Self::figment()
            .extract_inner("sms_sender")
            .unwrap_or_else(|_| "OTPSMS".to_string())
    }

    pub fn is_sms_enabled() -> bool {
        Self::sms_auth_key().is_some()
            && Self::sms_base_url().is_some()
    }

    pub fn admin_phone() -> String {
        Self::figment()
            .extract_inner("admin_phone")
            .unwrap_or_else(|_| "9999999999".to_string())
    }

    pub fn admin_email() -> String {
        Self::figment()
            .extract_inner("admin_email")
            .unwrap_or_else(|_| "admin@glam.local".to_string())
    }
}
