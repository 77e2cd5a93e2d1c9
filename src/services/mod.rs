pub mod jwt;
pub mod otp;
pub mod sms;

pub use jwt::JwtService;
pub use otp::{OtpCarrier, OtpEngine};
pub use sms::SmsService;
