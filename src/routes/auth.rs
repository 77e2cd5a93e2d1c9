use rocket::serde::json::Json;
use rocket::State;
use mongodb::bson::{doc, oid::ObjectId, to_bson, DateTime, Document};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument, UpdateOptions};

use crate::config::Config;
use crate::db::DbConn;
use crate::guards::AuthGuard;
use crate::models::{
    Address, AddressResponse, LoginDto, LoginLog, OtpChallenge, RegisterDto, SaveAddressDto,
    SendOtpDto, UpdateProfileDto, User, UserResponse, VerifyOtpDto,
};
use crate::services::{JwtService, OtpEngine, SmsService};
use crate::utils::{validate_email, validate_phone, ApiError, ApiResponse};

const OTP_WINDOW_MS: i64 = 10 * 60 * 1000;
const OTP_LIMIT: i32 = 3;

/// --------------------
/// Rate limiter helper
/// --------------------
fn live_window_filter(key: &str) -> Document {
    doc! { "key": key, "expires_at": { "$gt": DateTime::now() } }
}

fn window_hit_update() -> Document {
    doc! { "$inc": { "count": 1 } }
}

async fn rate_limit(
    db: &DbConn,
    key: &str,
    limit: i32,
    window_ms: i64,
) -> Result<(), ApiError> {
    let collection = db.collection::<Document>("rate_limits");

    // Count against a live window in one round trip; the returned document
    // carries this request's own increment.
    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();
    let window = collection
        .find_one_and_update(live_window_filter(key), window_hit_update(), options)
        .await
        .map_err(|_| ApiError::internal_error("Rate limiter update failed"))?;

    match window {
        Some(window) => {
            if window.get_i32("count").unwrap_or(0) > limit {
                return Err(ApiError::too_many_requests(
                    "Too many requests. Please try later.",
                ));
            }
            Ok(())
        }

        // No live window: open one. The upsert is keyed on `key` alone and the
        // collection carries a unique index on it, so concurrent openers
        // converge on a single document instead of inserting duplicates.
        None => {
            let window_expires =
                DateTime::from_millis(DateTime::now().timestamp_millis() + window_ms);
            collection
                .update_one(
                    doc! { "key": key },
                    doc! { "$set": { "count": 1, "expires_at": window_expires } },
                    UpdateOptions::builder().upsert(true).build(),
                )
                .await
                .map_err(|_| ApiError::internal_error("Rate limiter reset failed"))?;
            Ok(())
        }
    }
}

/// --------------------
/// Lockout helpers
/// --------------------

/// A locked account is rejected before any challenge work; correctness of
/// anything the caller supplies is irrelevant while the lock holds.
fn ensure_not_locked(user: &User) -> Result<(), ApiError> {
    if user.is_locked() {
        return Err(ApiError::locked(
            "Account is locked due to multiple failed login attempts. Please try again later.",
        ));
    }
    Ok(())
}

fn failure_increment() -> Document {
    doc! {
        "$inc": { "failed_attempts": 1 },
        "$set": { "updated_at": DateTime::now() },
    }
}

/// Count a failed verification against the stored document. The increment is
/// server-side, so concurrent failures all land; the lock write is guarded so
/// only the failure that crossed the threshold starts a window.
async fn record_login_failure(db: &DbConn, user_id: ObjectId) -> Result<(), ApiError> {
    let users = db.collection::<User>("users");

    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();
    let updated = users
        .find_one_and_update(doc! { "_id": user_id }, failure_increment(), options)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    if let Some(user) = updated {
        if let Some(until) = User::lock_window_after_failure(user.failed_attempts, user.is_locked())
        {
            users
                .update_one(
                    doc! {
                        "_id": user_id,
                        "$or": [
                            { "locked_until": { "$exists": false } },
                            { "locked_until": { "$lt": DateTime::now() } },
                        ],
                    },
                    doc! { "$set": { "locked_until": until, "updated_at": DateTime::now() } },
                    None,
                )
                .await
                .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;
        }
    }

    Ok(())
}

/// --------------------
/// Challenge persistence
/// --------------------

/// Store a freshly issued challenge. Last writer wins: reissuing is defined to
/// overwrite any prior unconsumed challenge.
async fn store_challenge(db: &DbConn, user: &User) -> Result<(), ApiError> {
    let id = user
        .id
        .ok_or_else(|| ApiError::internal_error("User document has no id"))?;
    let challenge = user
        .otp
        .as_ref()
        .ok_or_else(|| ApiError::internal_error("No challenge to store"))?;
    let bson = to_bson(challenge)
        .map_err(|e| ApiError::internal_error(format!("Challenge encode failed: {}", e)))?;

    db.collection::<User>("users")
        .update_one(
            doc! { "_id": id },
            doc! { "$set": { "otp": bson, "updated_at": DateTime::now() } },
            None,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    Ok(())
}

/// Filter that matches only while the exact challenge we verified is still the
/// stored one. Two racing verifications cannot both match it.
fn consume_filter(user_id: ObjectId, prior: &OtpChallenge) -> Document {
    doc! {
        "_id": user_id,
        "otp.code": &prior.code,
        "otp.expires_at": prior.expires_at,
    }
}

fn consume_update(reset_lockout: bool) -> Document {
    let mut set = doc! { "is_verified": true, "updated_at": DateTime::now() };
    let mut unset = doc! { "otp": "" };

    if reset_lockout {
        set.insert("failed_attempts", 0);
        set.insert("last_login_at", DateTime::now());
        unset.insert("locked_until", "");
    }

    doc! { "$set": set, "$unset": unset }
}

/// Consume the challenge and mark the user verified in one guarded update.
/// Returns false when the stored challenge no longer matches, meaning another
/// request consumed or replaced it first.
async fn consume_challenge(
    db: &DbConn,
    user_id: ObjectId,
    prior: &OtpChallenge,
    reset_lockout: bool,
) -> Result<bool, ApiError> {
    let result = db
        .collection::<User>("users")
        .update_one(consume_filter(user_id, prior), consume_update(reset_lockout), None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    Ok(result.matched_count == 1)
}

/// Drop an expired challenge from the store. Guarded on expiry so a challenge
/// freshly reissued by a concurrent request is left alone.
async fn purge_expired_challenge(db: &DbConn, user_id: ObjectId) -> Result<(), ApiError> {
    db.collection::<User>("users")
        .update_one(
            doc! { "_id": user_id, "otp.expires_at": { "$lte": DateTime::now() } },
            doc! { "$unset": { "otp": "" }, "$set": { "updated_at": DateTime::now() } },
            None,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    Ok(())
}

async fn find_by_phone(db: &DbConn, phone: &str) -> Result<Option<User>, ApiError> {
    db.collection::<User>("users")
        .find_one(doc! { "phone": phone }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))
}

/// OTP details exposed to the client only in test mode, where the code is
/// pinned anyway and automated suites need it in the response.
fn challenge_payload(user: &User) -> serde_json::Value {
    match &user.otp {
        Some(challenge) if Config::otp_test_mode() => serde_json::json!({
            "otp": challenge.code,
            "otp_expires_at": challenge.expires_at.try_to_rfc3339_string().ok(),
        }),
        Some(challenge) => serde_json::json!({
            "otp_expires_at": challenge.expires_at.try_to_rfc3339_string().ok(),
        }),
        None => serde_json::json!({}),
    }
}

/// --------------------
/// Register
/// --------------------
#[post("/auth/register", data = "<dto>")]
pub async fn register(
    db: &State<DbConn>,
    dto: Json<RegisterDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    if !validate_phone(&dto.phone) {
        return Err(ApiError::bad_request(
            "Please enter a valid 10-digit phone number.",
        ));
    }

    if find_by_phone(db, &dto.phone).await?.is_some() {
        return Err(ApiError::conflict(
            "User already exists with this phone number.",
        ));
    }

    if let Some(email) = &dto.email {
        if !validate_email(email) {
            return Err(ApiError::bad_request("Please enter a valid email."));
        }
        let taken = db
            .collection::<User>("users")
            .find_one(doc! { "email": email }, None)
            .await
            .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;
        if taken.is_some() {
            return Err(ApiError::conflict("Email is already taken by another user."));
        }
    }

    rate_limit(
        db,
        &format!("register:{}", dto.phone),
        OTP_LIMIT,
        OTP_WINDOW_MS,
    )
    .await?;

    let mut user = User::new(dto.name.clone(), dto.phone.clone());
    user.email = dto.email.clone();
    if let Some(password) = &dto.password {
        let hashed = bcrypt::hash(password, 12)
            .map_err(|e| ApiError::internal_error(format!("Password hash failed: {}", e)))?;
        user.password = Some(hashed);
    }

    let code = OtpEngine::issue(&mut user, Config::otp_expiry_minutes());

    let result = db
        .collection::<User>("users")
        .insert_one(&user, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Registration failed: {}", e)))?;
    user.id = result.inserted_id.as_object_id();

    let mut data = serde_json::json!({
        "user_id": user.id.map(|id| id.to_hex()),
        "phone": user.phone,
        "name": user.name,
    });
    merge(&mut data, challenge_payload(&user));

    // Delivery failure does not roll back the registration: the challenge
    // stays issued and the client is told to use the resend path.
    match SmsService::send_otp(&dto.phone, &code).await {
        Ok(()) => Ok(Json(ApiResponse::success_with_message(
            "User registered successfully. OTP sent to your phone number.".to_string(),
            data,
        ))),
        Err(e) => {
            error!("SMS sending failed for {}: {}", dto.phone, e);
            Ok(Json(ApiResponse::success_with_message(
                "User registered successfully. OTP could not be sent. Please retry via send-otp."
                    .to_string(),
                data,
            )))
        }
    }
}

/// --------------------
/// Login (issue challenge)
/// --------------------
#[post("/auth/login", data = "<dto>")]
pub async fn login(
    db: &State<DbConn>,
    dto: Json<LoginDto>,
    client_ip: Option<std::net::IpAddr>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    if !validate_phone(&dto.phone) {
        return Err(ApiError::bad_request(
            "Please enter a valid 10-digit phone number.",
        ));
    }

    let mut user = find_by_phone(db, &dto.phone).await?.ok_or_else(|| {
        ApiError::not_found("User not found with this phone number. Please register first.")
    })?;

    ensure_not_locked(&user)?;

    rate_limit(
        db,
        &format!("login:{}", dto.phone),
        OTP_LIMIT,
        OTP_WINDOW_MS,
    )
    .await?;

    let code = OtpEngine::issue(&mut user, Config::otp_expiry_minutes());
    store_challenge(db, &user).await?;

    if let Err(e) = SmsService::send_otp(&dto.phone, &code).await {
        error!("SMS sending failed for {}: {}", dto.phone, e);
        return Err(ApiError::internal_error(
            "Failed to send OTP. Please try again.",
        ));
    }

    if let Some(user_id) = user.id {
        let log = LoginLog {
            id: None,
            user_id,
            ip: client_ip.map(|ip| ip.to_string()),
            login_time: DateTime::now(),
        };
        if let Err(e) = db
            .collection::<LoginLog>("login_logs")
            .insert_one(&log, None)
            .await
        {
            warn!("Failed to record login attempt: {}", e);
        }
    }

    let mut data = serde_json::json!({
        "phone": user.phone,
        "name": user.name,
    });
    merge(&mut data, challenge_payload(&user));

    Ok(Json(ApiResponse::success_with_message(
        "OTP sent to your phone number for login.".to_string(),
        data,
    )))
}

/// --------------------
/// Verify login challenge
/// --------------------
#[post("/auth/verify-login", data = "<dto>")]
pub async fn verify_login(
    db: &State<DbConn>,
    dto: Json<VerifyOtpDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let mut user = find_by_phone(db, &dto.phone)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found."))?;

    ensure_not_locked(&user)?;

    let user_id = user
        .id
        .ok_or_else(|| ApiError::internal_error("User document has no id"))?;
    let prior = user.otp.clone();

    if !OtpEngine::verify(&mut user, &dto.otp) {
        // the engine purged an expired challenge; mirror that in the store
        if prior.is_some() && user.otp.is_none() {
            purge_expired_challenge(db, user_id).await?;
        }
        record_login_failure(db, user_id).await?;
        return Err(ApiError::bad_request("Invalid or expired OTP."));
    }

    let prior = prior.ok_or_else(|| ApiError::internal_error("Challenge vanished mid-verify"))?;
    if !consume_challenge(db, user_id, &prior, true).await? {
        // another request consumed the challenge first
        return Err(ApiError::bad_request("Invalid or expired OTP."));
    }

    let token = JwtService::generate_token(&user_id, &user.phone, user.role)
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(Json(ApiResponse::success_with_message(
        "Login successful.".to_string(),
        serde_json::json!({
            "token": token,
            "user": UserResponse::from(user),
        }),
    )))
}

/// --------------------
/// Reissue challenge for an unverified user
/// --------------------
#[post("/auth/send-otp", data = "<dto>")]
pub async fn send_otp(
    db: &State<DbConn>,
    dto: Json<SendOtpDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    if !validate_phone(&dto.phone) {
        return Err(ApiError::bad_request(
            "Please enter a valid 10-digit phone number.",
        ));
    }

    let mut user = find_by_phone(db, &dto.phone)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found with this phone number."))?;

    ensure_not_locked(&user)?;

    if user.is_verified {
        return Err(ApiError::bad_request("User is already verified."));
    }

    rate_limit(
        db,
        &format!("send_otp:{}", dto.phone),
        OTP_LIMIT,
        OTP_WINDOW_MS,
    )
    .await?;

    let code = OtpEngine::issue(&mut user, Config::otp_expiry_minutes());
    store_challenge(db, &user).await?;

    if let Err(e) = SmsService::send_otp(&dto.phone, &code).await {
        error!("SMS sending failed for {}: {}", dto.phone, e);
        return Err(ApiError::internal_error(
            "Failed to send OTP. Please try again.",
        ));
    }

    Ok(Json(ApiResponse::success_with_message(
        "OTP sent successfully to your phone number.".to_string(),
        challenge_payload(&user),
    )))
}

/// --------------------
/// Verify registration challenge
/// --------------------
#[post("/auth/verify-otp", data = "<dto>")]
pub async fn verify_otp(
    db: &State<DbConn>,
    dto: Json<VerifyOtpDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let mut user = find_by_phone(db, &dto.phone)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found."))?;

    ensure_not_locked(&user)?;

    if user.is_verified {
        return Err(ApiError::bad_request("User is already verified."));
    }

    let user_id = user
        .id
        .ok_or_else(|| ApiError::internal_error("User document has no id"))?;
    let prior = user.otp.clone();

    // Unlike verify-login, a failure here neither counts toward the lockout
    // threshold nor resets it.
    if !OtpEngine::verify(&mut user, &dto.otp) {
        if prior.is_some() && user.otp.is_none() {
            purge_expired_challenge(db, user_id).await?;
        }
        return Err(ApiError::bad_request("Invalid or expired OTP."));
    }

    let prior = prior.ok_or_else(|| ApiError::internal_error("Challenge vanished mid-verify"))?;
    if !consume_challenge(db, user_id, &prior, false).await? {
        return Err(ApiError::bad_request("Invalid or expired OTP."));
    }

    let token = JwtService::generate_token(&user_id, &user.phone, user.role)
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(Json(ApiResponse::success_with_message(
        "OTP verified successfully.".to_string(),
        serde_json::json!({
            "token": token,
            "user": UserResponse::from(user),
        }),
    )))
}

/// --------------------
/// Profile
/// --------------------
#[get("/auth/profile")]
pub async fn get_profile(
    db: &State<DbConn>,
    auth: AuthGuard,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = db
        .collection::<User>("users")
        .find_one(doc! { "_id": auth.user_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::not_found("User not found."))?;

    Ok(Json(ApiResponse::success(UserResponse::from(user))))
}

#[put("/auth/profile", data = "<dto>")]
pub async fn update_profile(
    db: &State<DbConn>,
    auth: AuthGuard,
    dto: Json<UpdateProfileDto>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let mut set = doc! { "updated_at": DateTime::now() };

    if let Some(name) = &dto.name {
        set.insert("name", name);
    }

    if let Some(email) = &dto.email {
        if !validate_email(email) {
            return Err(ApiError::bad_request("Please enter a valid email."));
        }
        let taken = db
            .collection::<User>("users")
            .find_one(
                doc! { "email": email, "_id": { "$ne": auth.user_id } },
                None,
            )
            .await
            .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;
        if taken.is_some() {
            return Err(ApiError::conflict("Email is already taken by another user."));
        }
        set.insert("email", email);
    }

    db.collection::<User>("users")
        .update_one(doc! { "_id": auth.user_id }, doc! { "$set": set }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let user = db
        .collection::<User>("users")
        .find_one(doc! { "_id": auth.user_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::not_found("User not found."))?;

    Ok(Json(ApiResponse::success(UserResponse::from(user))))
}

/// --------------------
/// Address book
/// --------------------
#[post("/auth/address", data = "<dto>")]
pub async fn save_address(
    db: &State<DbConn>,
    auth: AuthGuard,
    dto: Json<SaveAddressDto>,
) -> Result<Json<ApiResponse<Vec<AddressResponse>>>, ApiError> {
    if dto.address_line.trim().is_empty() {
        return Err(ApiError::bad_request("Address line is required."));
    }

    let address = Address {
        label: dto.label.clone(),
        address_line: dto.address_line.trim().to_string(),
        city: dto.city.clone(),
        state: dto.state.clone(),
        pincode: dto.pincode.clone(),
        created_at: DateTime::now(),
    };
    let bson = to_bson(&address)
        .map_err(|e| ApiError::internal_error(format!("Address encode failed: {}", e)))?;

    let result = db
        .collection::<User>("users")
        .update_one(
            doc! { "_id": auth.user_id },
            doc! { "$push": { "addresses": bson }, "$set": { "updated_at": DateTime::now() } },
            None,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    if result.matched_count == 0 {
        return Err(ApiError::not_found("User not found."));
    }

    let user = db
        .collection::<User>("users")
        .find_one(doc! { "_id": auth.user_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::not_found("User not found."))?;

    Ok(Json(ApiResponse::success_with_message(
        "Address saved successfully.".to_string(),
        user.addresses.into_iter().map(AddressResponse::from).collect(),
    )))
}

#[get("/auth/address")]
pub async fn get_addresses(
    db: &State<DbConn>,
    auth: AuthGuard,
) -> Result<Json<ApiResponse<Vec<AddressResponse>>>, ApiError> {
    let user = db
        .collection::<User>("users")
        .find_one(doc! { "_id": auth.user_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::not_found("User not found."))?;

    Ok(Json(ApiResponse::success(
        user.addresses.into_iter().map(AddressResponse::from).collect(),
    )))
}

fn merge(target: &mut serde_json::Value, extra: serde_json::Value) {
    if let (Some(target), Some(extra)) = (target.as_object_mut(), extra.as_object()) {
        for (key, value) in extra {
            target.insert(key.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::http::Status;

    fn challenge(code: &str, ttl_ms: i64) -> OtpChallenge {
        OtpChallenge {
            code: code.into(),
            expires_at: DateTime::from_millis(DateTime::now().timestamp_millis() + ttl_ms),
        }
    }

    #[test]
    fn locked_account_is_rejected_before_the_code_is_checked() {
        let mut user = User::new("Asha".into(), "9876543210".into());
        let code = OtpEngine::issue(&mut user, 5);
        user.failed_attempts = 5;
        user.locked_until = Some(DateTime::from_millis(
            DateTime::now().timestamp_millis() + 600_000,
        ));

        let err = ensure_not_locked(&user).unwrap_err();
        assert_eq!(err.status, Status::Locked);

        // the supplied code was the right one; the lock alone rejects it
        let mut unlocked = user.clone();
        unlocked.locked_until = None;
        assert!(OtpEngine::verify(&mut unlocked, &code));
    }

    #[test]
    fn expired_lock_no_longer_blocks() {
        let mut user = User::new("Asha".into(), "9876543210".into());
        user.failed_attempts = 5;
        user.locked_until = Some(DateTime::from_millis(
            DateTime::now().timestamp_millis() - 1_000,
        ));
        assert!(ensure_not_locked(&user).is_ok());
    }

    #[test]
    fn challenge_consumption_is_guarded_by_the_stored_challenge() {
        let user_id = ObjectId::new();
        let prior = challenge("123456", 300_000);

        let filter = consume_filter(user_id, &prior);
        assert_eq!(filter.get_object_id("_id").unwrap(), user_id);
        assert_eq!(filter.get_str("otp.code").unwrap(), "123456");
        assert_eq!(*filter.get_datetime("otp.expires_at").unwrap(), prior.expires_at);
    }

    #[test]
    fn consuming_a_login_challenge_resets_the_lockout() {
        let update = consume_update(true);

        let set = update.get_document("$set").unwrap();
        assert!(set.get_bool("is_verified").unwrap());
        assert_eq!(set.get_i32("failed_attempts").unwrap(), 0);
        assert!(set.get_datetime("last_login_at").is_ok());

        let unset = update.get_document("$unset").unwrap();
        assert!(unset.contains_key("otp"));
        assert!(unset.contains_key("locked_until"));
    }

    #[test]
    fn consuming_a_signup_challenge_leaves_the_lockout_alone() {
        let update = consume_update(false);

        let set = update.get_document("$set").unwrap();
        assert!(set.get_bool("is_verified").unwrap());
        assert!(!set.contains_key("failed_attempts"));

        let unset = update.get_document("$unset").unwrap();
        assert!(unset.contains_key("otp"));
        assert!(!unset.contains_key("locked_until"));
    }

    #[test]
    fn failed_logins_are_counted_with_an_increment() {
        let update = failure_increment();

        let inc = update.get_document("$inc").unwrap();
        assert_eq!(inc.get_i32("failed_attempts").unwrap(), 1);

        // no absolute counter write that could swallow a concurrent failure
        let set = update.get_document("$set").unwrap();
        assert!(!set.contains_key("failed_attempts"));
    }

    #[test]
    fn rate_window_hits_are_counted_with_an_increment() {
        let update = window_hit_update();
        let inc = update.get_document("$inc").unwrap();
        assert_eq!(inc.get_i32("count").unwrap(), 1);
    }

    #[test]
    fn rate_window_filter_skips_expired_windows() {
        let filter = live_window_filter("login:9876543210");
        assert_eq!(filter.get_str("key").unwrap(), "login:9876543210");
        assert!(filter.get_document("expires_at").unwrap().contains_key("$gt"));
    }
}
