use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use rocket_okapi::okapi::schemars::JsonSchema;

use crate::models::OtpChallenge;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Completed,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BookingItem {
    pub service_id: ObjectId,
    pub quantity: i32,
}

/// A booking is created `pending` at checkout with a fresh on-site challenge
/// and reaches `completed` only through successful OTP verification. There is
/// no cancelled or failed state; an expired challenge leaves the booking
/// `pending` until checkout is re-run.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Booking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub cart_id: ObjectId,
    pub professional_type: String,
    pub date: String,
    pub time: String,
    pub address: String,
    pub items: Vec<BookingItem>,
    pub status: BookingStatus,
    pub otp: Option<OtpChallenge>,
    pub is_verified: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CheckoutDto {
    pub checkout_id: String,
    pub professional_type: String,
    pub date: String,
    pub time: String,
    pub address: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct VerifyServiceOtpDto {
    pub booking_id: String,
    pub otp: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct BookingResponse {
    pub id: String,
    pub professional_type: String,
    pub date: String,
    pub time: String,
    pub address: String,
    pub status: BookingStatus,
    pub is_verified: bool,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        BookingResponse {
            id: booking.id.map(|id| id.to_hex()).unwrap_or_default(),
            professional_type: booking.professional_type,
            date: booking.date,
            time: booking.time,
            address: booking.address,
            status: booking.status,
            is_verified: booking.is_verified,
        }
    }
}
