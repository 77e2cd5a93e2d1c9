use mongodb::bson::DateTime;

use crate::config::Config;
use crate::models::{Booking, BookingStatus, OtpChallenge, User};

/// Anything that can carry a one-time challenge. Users and bookings share the
/// same issue/verify algorithm; only the post-success mutation differs, which
/// each carrier expresses through `mark_verified`.
pub trait OtpCarrier {
    fn challenge(&self) -> Option<&OtpChallenge>;
    fn set_challenge(&mut self, challenge: Option<OtpChallenge>);
    fn mark_verified(&mut self);
}

impl OtpCarrier for User {
    fn challenge(&self) -> Option<&OtpChallenge> {
        self.otp.as_ref()
    }

    fn set_challenge(&mut self, challenge: Option<OtpChallenge>) {
        self.otp = challenge;
    }

    fn mark_verified(&mut self) {
        self.is_verified = true;
    }
}

impl OtpCarrier for Booking {
    fn challenge(&self) -> Option<&OtpChallenge> {
        self.otp.as_ref()
    }

    fn set_challenge(&mut self, challenge: Option<OtpChallenge>) {
        self.otp = challenge;
    }

    fn mark_verified(&mut self) {
        self.is_verified = true;
        self.status = BookingStatus::Completed;
    }
}

pub struct OtpEngine;

impl OtpEngine {
    /// Six-digit numeric code. In test mode the configured static code is
    /// returned instead of a random draw.
    pub fn generate_code() -> String {
        if Config::otp_test_mode() {
            return Config::static_otp();
        }

        use rand::Rng;
        let mut rng = rand::thread_rng();
        let code: u32 = rng.gen_range(100000..999999);
        code.to_string()
    }

    /// Attach a fresh challenge to the carrier, overwriting any prior
    /// unconsumed one. Delivery is the caller's concern.
    pub fn issue<T: OtpCarrier>(target: &mut T, ttl_minutes: i64) -> String {
        let code = Self::generate_code();
        let expires_at = DateTime::from_millis(
            DateTime::now().timestamp_millis() + ttl_minutes * 60 * 1000,
        );

        target.set_challenge(Some(OtpChallenge {
            code: code.clone(),
            expires_at,
        }));

        code
    }

    /// Verify a supplied code against the carrier's active challenge.
    ///
    /// - no challenge: false
    /// - expired: challenge cleared, false (lazy purge on first attempt)
    /// - wrong code: false, challenge left intact so a correct retry works
    /// - match: challenge consumed, carrier marked verified, true
    pub fn verify<T: OtpCarrier>(target: &mut T, supplied: &str) -> bool {
        let challenge = match target.challenge() {
            Some(c) => c.clone(),
            None => return false,
        };

        if challenge.is_expired() {
            target.set_challenge(None);
            return false;
        }

        if challenge.code != supplied {
            return false;
        }

        target.set_challenge(None);
        target.mark_verified();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    fn test_user() -> User {
        User::new("Asha".into(), "9876543210".into())
    }

    fn test_booking() -> Booking {
        Booking {
            id: Some(ObjectId::new()),
            user_id: ObjectId::new(),
            cart_id: ObjectId::new(),
            professional_type: "beautician".into(),
            date: "2026-09-01".into(),
            time: "10:00".into(),
            address: "12 MG Road".into(),
            items: vec![],
            status: BookingStatus::Pending,
            otp: None,
            is_verified: false,
            created_at: DateTime::now(),
            updated_at: DateTime::now(),
        }
    }

    fn expire_challenge<T: OtpCarrier>(target: &mut T) {
        let code = target.challenge().map(|c| c.code.clone()).unwrap();
        target.set_challenge(Some(OtpChallenge {
            code,
            expires_at: DateTime::from_millis(DateTime::now().timestamp_millis() - 1_000),
        }));
    }

    #[test]
    fn verify_without_challenge_fails() {
        let mut user = test_user();
        assert!(!OtpEngine::verify(&mut user, "123456"));
        assert!(!user.is_verified);
    }

    #[test]
    fn correct_code_consumes_challenge_and_verifies() {
        let mut user = test_user();
        let code = OtpEngine::issue(&mut user, 5);

        assert!(OtpEngine::verify(&mut user, &code));
        assert!(user.is_verified);
        assert!(user.otp.is_none(), "challenge must be consumed");

        // consumed code is gone for good
        assert!(!OtpEngine::verify(&mut user, &code));
    }

    #[test]
    fn reissue_invalidates_prior_code() {
        let mut user = test_user();
        let first = OtpEngine::issue(&mut user, 5);
        let second = OtpEngine::issue(&mut user, 5);

        if first != second {
            assert!(!OtpEngine::verify(&mut user, &first));
        }
        assert!(OtpEngine::verify(&mut user, &second));
    }

    #[test]
    fn wrong_code_leaves_challenge_intact() {
        let mut user = test_user();
        let code = OtpEngine::issue(&mut user, 5);
        let wrong = if code == "000000" { "000001" } else { "000000" };

        assert!(!OtpEngine::verify(&mut user, wrong));
        assert!(user.otp.is_some(), "challenge survives a wrong code");
        assert!(!user.is_verified);

        assert!(OtpEngine::verify(&mut user, &code));
    }

    #[test]
    fn expired_code_fails_and_purges_challenge() {
        let mut user = test_user();
        let code = OtpEngine::issue(&mut user, 5);
        expire_challenge(&mut user);

        assert!(!OtpEngine::verify(&mut user, &code));
        assert!(user.otp.is_none(), "expired challenge is purged on first attempt");
        assert!(!user.is_verified);

        // second attempt with the same code also fails: the code is gone
        assert!(!OtpEngine::verify(&mut user, &code));
    }

    #[test]
    fn booking_verification_completes_booking() {
        let mut booking = test_booking();
        let code = OtpEngine::issue(&mut booking, 10);
        assert_eq!(booking.status, BookingStatus::Pending);

        assert!(OtpEngine::verify(&mut booking, &code));
        assert!(booking.is_verified);
        assert_eq!(booking.status, BookingStatus::Completed);
        assert!(booking.otp.is_none());
    }

    #[test]
    fn completed_booking_cannot_be_verified_again() {
        let mut booking = test_booking();
        let code = OtpEngine::issue(&mut booking, 10);
        assert!(OtpEngine::verify(&mut booking, &code));

        // challenge was consumed; any further attempt fails and nothing changes
        assert!(!OtpEngine::verify(&mut booking, &code));
        assert_eq!(booking.status, BookingStatus::Completed);
    }

    #[test]
    fn expired_booking_challenge_leaves_booking_pending() {
        let mut booking = test_booking();
        let code = OtpEngine::issue(&mut booking, 10);
        expire_challenge(&mut booking);

        assert!(!OtpEngine::verify(&mut booking, &code));
        assert_eq!(booking.status, BookingStatus::Pending);
        assert!(!booking.is_verified);
        assert!(booking.otp.is_none(), "awaiting a fresh checkout-issued challenge");
    }

    #[test]
    fn signup_challenge_works_within_window_and_dies_after() {
        let mut user = test_user();
        let code = OtpEngine::issue(&mut user, 5);

        // attempted within the five-minute window: verified, token issuable
        let mut prompt = user.clone();
        assert!(OtpEngine::verify(&mut prompt, &code));
        assert!(prompt.is_verified);
        let token =
            crate::services::JwtService::generate_token(&ObjectId::new(), &prompt.phone, prompt.role);
        assert!(token.is_ok());

        // same challenge attempted six minutes after issue
        let challenge = user.otp.as_mut().unwrap();
        challenge.expires_at = DateTime::from_millis(
            challenge.expires_at.timestamp_millis() - 6 * 60 * 1000,
        );
        assert!(!OtpEngine::verify(&mut user, &code));
        assert!(!user.is_verified);
        assert!(user.otp.is_none());
    }

    #[test]
    fn generated_codes_are_six_digits()  {
        for _ in 0..50 {
            let code = OtpEngine::generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
