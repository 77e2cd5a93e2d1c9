use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use rocket_okapi::okapi::schemars::JsonSchema;

use crate::models::OtpChallenge;

/// Consecutive failed verifications before a lock is applied.
pub const LOCK_THRESHOLD: i32 = 5;
/// Lock window in minutes, counted from the failure that crossed the threshold.
pub const LOCK_WINDOW_MINUTES: i64 = 30;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// Saved delivery address, embedded in the user document.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Address {
    pub label: Option<String>,
    pub address_line: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub created_at: DateTime,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct AddressResponse {
    pub label: Option<String>,
    pub address_line: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub created_at: Option<String>,
}

impl From<Address> for AddressResponse {
    fn from(address: Address) -> Self {
        AddressResponse {
            label: address.label,
            address_line: address.address_line,
            city: address.city,
            state: address.state,
            pincode: address.pincode,
            created_at: address.created_at.try_to_rfc3339_string().ok(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    /// bcrypt hash, optional. Never serialized into responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub is_verified: bool,
    pub otp: Option<OtpChallenge>,
    pub failed_attempts: i32,
    pub locked_until: Option<DateTime>,
    pub last_login_at: Option<DateTime>,
    pub role: Role,
    #[serde(default)]
    pub addresses: Vec<Address>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl User {
    pub fn new(name: String, phone: String) -> Self {
        User {
            id: None,
            name,
            phone,
            email: None,
            password: None,
            is_verified: false,
            otp: None,
            failed_attempts: 0,
            locked_until: None,
            last_login_at: None,
            role: Role::User,
            addresses: Vec::new(),
            created_at: DateTime::now(),
            updated_at: DateTime::now(),
        }
    }

    /// Lock state is derived, never stored: locked iff `locked_until` is set
    /// and still in the future. Expired locks simply stop matching.
    pub fn is_locked(&self) -> bool {
        matches!(self.locked_until, Some(until) if until > DateTime::now())
    }

    /// Lock window triggered by a failure, given the count after that failure.
    /// The attempt that reaches the threshold starts a window; later failures
    /// while a lock is in force do not extend it. The caller applies the
    /// returned window to the store with its own guard against a live lock.
    pub fn lock_window_after_failure(
        failed_attempts: i32,
        already_locked: bool,
    ) -> Option<DateTime> {
        if failed_attempts >= LOCK_THRESHOLD && !already_locked {
            Some(DateTime::from_millis(
                DateTime::now().timestamp_millis() + LOCK_WINDOW_MINUTES * 60 * 1000,
            ))
        } else {
            None
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateProfileDto {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SaveAddressDto {
    pub label: Option<String>,
    pub address_line: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub is_verified: bool,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: user.name,
            phone: user.phone,
            email: user.email,
            is_verified: user.is_verified,
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_failures_do_not_lock() {
        for count in 1..LOCK_THRESHOLD {
            assert!(User::lock_window_after_failure(count, false).is_none());
        }
    }

    #[test]
    fn fifth_failure_locks_for_thirty_minutes() {
        let until = User::lock_window_after_failure(LOCK_THRESHOLD, false)
            .expect("threshold failure starts a lock window");

        let delta = until.timestamp_millis() - DateTime::now().timestamp_millis();
        let expected = LOCK_WINDOW_MINUTES * 60 * 1000;
        assert!(delta > expected - 5_000 && delta <= expected);
    }

    #[test]
    fn failures_past_threshold_do_not_extend_existing_lock() {
        assert!(User::lock_window_after_failure(LOCK_THRESHOLD + 1, true).is_none());
    }

    #[test]
    fn failure_after_lock_expiry_starts_a_new_window() {
        // the count is still past the threshold, but no lock is in force
        assert!(User::lock_window_after_failure(LOCK_THRESHOLD + 2, false).is_some());
    }

    #[test]
    fn expired_lock_reads_as_unlocked() {
        let mut user = User::new("Asha".into(), "9876543210".into());
        user.failed_attempts = 5;
        user.locked_until = Some(DateTime::from_millis(
            DateTime::now().timestamp_millis() - 1_000,
        ));
        assert!(!user.is_locked());
    }

    #[test]
    fn live_lock_reads_as_locked() {
        let mut user = User::new("Asha".into(), "9876543210".into());
        user.failed_attempts = 5;
        user.locked_until = Some(DateTime::from_millis(
            DateTime::now().timestamp_millis() + 60_000,
        ));
        assert!(user.is_locked());
    }
}
