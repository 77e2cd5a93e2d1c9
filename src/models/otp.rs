use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use rocket_okapi::okapi::schemars::JsonSchema;

/// One-time challenge embedded in a user or booking document. At most one
/// unconsumed challenge exists per document; reissuing overwrites it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OtpChallenge {
    pub code: String,
    pub expires_at: DateTime,
}

impl OtpChallenge {
    pub fn is_expired(&self) -> bool {
        DateTime::now() > self.expires_at
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RegisterDto {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct LoginDto {
    pub phone: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SendOtpDto {
    pub phone: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct VerifyOtpDto {
    pub phone: String,
    pub otp: String,
}
