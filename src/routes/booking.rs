use rocket::serde::json::Json;
use rocket::State;
use mongodb::bson::{doc, oid::ObjectId, to_bson, DateTime, Document};
use mongodb::options::FindOneOptions;

use crate::db::DbConn;
use crate::guards::AuthGuard;
use crate::models::{Booking, BookingResponse, BookingStatus, OtpChallenge, VerifyServiceOtpDto};
use crate::services::OtpEngine;
use crate::utils::{ApiError, ApiResponse};

/// Filter that matches only while the booking is still pending and still
/// carries the exact challenge we verified. Two racing verifications cannot
/// both match it.
fn completion_filter(booking_id: ObjectId, prior: &OtpChallenge) -> Document {
    doc! {
        "_id": booking_id,
        "is_verified": false,
        "otp.code": &prior.code,
        "otp.expires_at": prior.expires_at,
    }
}

fn completion_update() -> Result<Document, ApiError> {
    let status = to_bson(&BookingStatus::Completed)
        .map_err(|e| ApiError::internal_error(format!("Status encode failed: {}", e)))?;

    Ok(doc! {
        "$set": {
            "status": status,
            "is_verified": true,
            "updated_at": DateTime::now(),
        },
        "$unset": { "otp": "" },
    })
}

/// Consume the challenge and complete the booking in one guarded update.
/// Returns false when nothing matched, meaning a concurrent attempt already
/// completed the booking.
async fn complete_booking(
    db: &DbConn,
    booking_id: ObjectId,
    prior: &OtpChallenge,
) -> Result<bool, ApiError> {
    let result = db
        .collection::<Booking>("bookings")
        .update_one(completion_filter(booking_id, prior), completion_update()?, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    Ok(result.matched_count == 1)
}

/// Drop an expired challenge so the booking sits in `pending` with no stale
/// code until checkout is re-run. Guarded on expiry.
async fn purge_expired_challenge(db: &DbConn, booking_id: ObjectId) -> Result<(), ApiError> {
    db.collection::<Booking>("bookings")
        .update_one(
            doc! { "_id": booking_id, "otp.expires_at": { "$lte": DateTime::now() } },
            doc! { "$unset": { "otp": "" }, "$set": { "updated_at": DateTime::now() } },
            None,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    Ok(())
}

/// On-site verification, presented out of band by the professional. No
/// session required: the booking id plus the challenge code is the proof.
#[post("/booking/verify-service-otp", data = "<dto>")]
pub async fn verify_service_otp(
    db: &State<DbConn>,
    dto: Json<VerifyServiceOtpDto>,
) -> Result<Json<ApiResponse<BookingResponse>>, ApiError> {
    let booking_id = ObjectId::parse_str(&dto.booking_id)
        .map_err(|_| ApiError::bad_request("Invalid booking id"))?;

    let mut booking = db
        .collection::<Booking>("bookings")
        .find_one(doc! { "_id": booking_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::not_found("Booking not found."))?;

    // pending → completed is the only transition; a completed booking never
    // re-runs the success mutation.
    if booking.is_verified {
        return Err(ApiError::conflict("Service is already verified."));
    }

    let prior = booking.otp.clone();

    if !OtpEngine::verify(&mut booking, &dto.otp) {
        // the engine purged an expired challenge; mirror that in the store
        if prior.is_some() && booking.otp.is_none() {
            purge_expired_challenge(db, booking_id).await?;
        }
        return Err(ApiError::bad_request("Invalid or expired OTP."));
    }

    let prior = prior.ok_or_else(|| ApiError::internal_error("Challenge vanished mid-verify"))?;
    if !complete_booking(db, booking_id, &prior).await? {
        // a concurrent attempt consumed the challenge and completed the booking
        return Err(ApiError::conflict("Service is already verified."));
    }

    Ok(Json(ApiResponse::success_with_message(
        "Service verified successfully.".to_string(),
        BookingResponse::from(booking),
    )))
}

#[get("/booking")]
pub async fn get_booking_details(
    db: &State<DbConn>,
    auth: AuthGuard,
) -> Result<Json<ApiResponse<BookingResponse>>, ApiError> {
    let options = FindOneOptions::builder()
        .sort(doc! { "created_at": -1 })
        .build();

    let booking = db
        .collection::<Booking>("bookings")
        .find_one(doc! { "user_id": auth.user_id }, options)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::not_found("No booking found"))?;

    Ok(Json(ApiResponse::success(BookingResponse::from(booking))))
}

#[get("/booking/<booking_id>")]
pub async fn get_booking_by_id(
    db: &State<DbConn>,
    auth: AuthGuard,
    booking_id: String,
) -> Result<Json<ApiResponse<BookingResponse>>, ApiError> {
    let booking_id = ObjectId::parse_str(&booking_id)
        .map_err(|_| ApiError::bad_request("Invalid booking id"))?;

    let booking = db
        .collection::<Booking>("bookings")
        .find_one(doc! { "_id": booking_id, "user_id": auth.user_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::not_found("Booking not found."))?;

    Ok(Json(ApiResponse::success(BookingResponse::from(booking))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_is_guarded_by_pending_state_and_challenge() {
        let booking_id = ObjectId::new();
        let prior = OtpChallenge {
            code: "123456".into(),
            expires_at: DateTime::from_millis(DateTime::now().timestamp_millis() + 600_000),
        };

        let filter = completion_filter(booking_id, &prior);
        assert_eq!(filter.get_object_id("_id").unwrap(), booking_id);
        assert!(!filter.get_bool("is_verified").unwrap());
        assert_eq!(filter.get_str("otp.code").unwrap(), "123456");
        assert_eq!(*filter.get_datetime("otp.expires_at").unwrap(), prior.expires_at);
    }

    #[test]
    fn completion_consumes_the_challenge_and_flips_status() {
        let update = completion_update().unwrap();

        let set = update.get_document("$set").unwrap();
        assert!(set.get_bool("is_verified").unwrap());
        assert_eq!(set.get_str("status").unwrap(), "completed");

        let unset = update.get_document("$unset").unwrap();
        assert!(unset.contains_key("otp"));
    }
}
