use rocket::serde::json::Json;
use rocket::State;
use mongodb::bson::{doc, oid::ObjectId, to_bson, DateTime};

use crate::config::Config;
use crate::db::DbConn;
use crate::guards::AuthGuard;
use crate::models::{
    Booking, BookingItem, BookingStatus, Cart, CartItem, CartItemDto, CartQuantityDto,
    CartResponse, CheckoutDto,
};
use crate::services::{OtpEngine, SmsService};
use crate::utils::{ApiError, ApiResponse};

async fn find_cart(db: &DbConn, user_id: ObjectId) -> Result<Option<Cart>, ApiError> {
    db.collection::<Cart>("carts")
        .find_one(doc! { "user_id": user_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))
}

async fn save_items(db: &DbConn, cart: &Cart) -> Result<(), ApiError> {
    let items = to_bson(&cart.items)
        .map_err(|e| ApiError::internal_error(format!("Cart encode failed: {}", e)))?;

    db.collection::<Cart>("carts")
        .update_one(
            doc! { "_id": cart.id },
            doc! { "$set": { "items": items, "updated_at": DateTime::now() } },
            None,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    Ok(())
}

fn parse_service_id(raw: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw).map_err(|_| ApiError::bad_request("Invalid service id"))
}

#[get("/cart")]
pub async fn get_cart(
    db: &State<DbConn>,
    auth: AuthGuard,
) -> Result<Json<ApiResponse<CartResponse>>, ApiError> {
    let cart = find_cart(db, auth.user_id).await?;

    let response = match cart {
        Some(cart) => CartResponse::from(cart),
        None => CartResponse {
            id: None,
            items: vec![],
        },
    };

    Ok(Json(ApiResponse::success(response)))
}

#[post("/cart/add", data = "<dto>")]
pub async fn add_to_cart(
    db: &State<DbConn>,
    auth: AuthGuard,
    dto: Json<CartItemDto>,
) -> Result<Json<ApiResponse<CartResponse>>, ApiError> {
    let service_id = parse_service_id(&dto.service_id)?;
    let quantity = dto.quantity.filter(|q| *q > 0).unwrap_or(1);

    let cart = match find_cart(db, auth.user_id).await? {
        Some(mut cart) => {
            match cart.items.iter_mut().find(|i| i.service_id == service_id) {
                Some(item) => item.quantity += quantity,
                None => cart.items.push(CartItem {
                    service_id,
                    quantity,
                }),
            }
            save_items(db, &cart).await?;
            cart
        }
        None => {
            let mut cart = Cart {
                id: None,
                user_id: auth.user_id,
                items: vec![CartItem {
                    service_id,
                    quantity,
                }],
                updated_at: DateTime::now(),
            };
            let result = db
                .collection::<Cart>("carts")
                .insert_one(&cart, None)
                .await
                .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;
            cart.id = result.inserted_id.as_object_id();
            cart
        }
    };

    Ok(Json(ApiResponse::success_with_message(
        "Item added to cart".to_string(),
        CartResponse::from(cart),
    )))
}

#[post("/cart/remove", data = "<dto>")]
pub async fn remove_from_cart(
    db: &State<DbConn>,
    auth: AuthGuard,
    dto: Json<CartItemDto>,
) -> Result<Json<ApiResponse<CartResponse>>, ApiError> {
    let service_id = parse_service_id(&dto.service_id)?;

    let mut cart = find_cart(db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Cart not found"))?;

    cart.items.retain(|i| i.service_id != service_id);
    save_items(db, &cart).await?;

    Ok(Json(ApiResponse::success_with_message(
        "Item removed from cart".to_string(),
        CartResponse::from(cart),
    )))
}

#[post("/cart/increase", data = "<dto>")]
pub async fn increase_quantity(
    db: &State<DbConn>,
    auth: AuthGuard,
    dto: Json<CartQuantityDto>,
) -> Result<Json<ApiResponse<CartResponse>>, ApiError> {
    let service_id = parse_service_id(&dto.service_id)?;
    let amount = dto.amount.filter(|a| *a > 0).unwrap_or(1);

    let mut cart = find_cart(db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Cart not found"))?;

    let item = cart
        .items
        .iter_mut()
        .find(|i| i.service_id == service_id)
        .ok_or_else(|| ApiError::not_found("Item not found in cart"))?;
    item.quantity += amount;

    save_items(db, &cart).await?;

    Ok(Json(ApiResponse::success_with_message(
        "Quantity increased".to_string(),
        CartResponse::from(cart),
    )))
}

#[post("/cart/decrease", data = "<dto>")]
pub async fn decrease_quantity(
    db: &State<DbConn>,
    auth: AuthGuard,
    dto: Json<CartQuantityDto>,
) -> Result<Json<ApiResponse<CartResponse>>, ApiError> {
    let service_id = parse_service_id(&dto.service_id)?;
    let amount = dto.amount.filter(|a| *a > 0).unwrap_or(1);

    let mut cart = find_cart(db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Cart not found"))?;

    let item = cart
        .items
        .iter_mut()
        .find(|i| i.service_id == service_id)
        .ok_or_else(|| ApiError::not_found("Item not found in cart"))?;

    // Decreasing to zero removes the line
    item.quantity -= amount;
    cart.items.retain(|i| i.quantity > 0);

    save_items(db, &cart).await?;

    Ok(Json(ApiResponse::success_with_message(
        "Quantity decreased".to_string(),
        CartResponse::from(cart),
    )))
}

#[post("/cart/clear")]
pub async fn clear_cart(
    db: &State<DbConn>,
    auth: AuthGuard,
) -> Result<Json<ApiResponse<CartResponse>>, ApiError> {
    let mut cart = find_cart(db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Cart not found"))?;

    cart.items.clear();
    save_items(db, &cart).await?;

    Ok(Json(ApiResponse::success_with_message(
        "Cart cleared".to_string(),
        CartResponse::from(cart),
    )))
}

/// --------------------
/// Checkout → pending booking + on-site challenge
/// --------------------
#[post("/cart/checkout-with-details", data = "<dto>")]
pub async fn checkout_with_details(
    db: &State<DbConn>,
    auth: AuthGuard,
    dto: Json<CheckoutDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    if dto.professional_type.trim().is_empty()
        || dto.date.trim().is_empty()
        || dto.time.trim().is_empty()
        || dto.address.trim().is_empty()
    {
        return Err(ApiError::bad_request(
            "checkout_id, professional_type, date, time, and address are required.",
        ));
    }

    let cart_id = ObjectId::parse_str(&dto.checkout_id)
        .map_err(|_| ApiError::bad_request("Invalid checkout id"))?;

    let cart = db
        .collection::<Cart>("carts")
        .find_one(doc! { "_id": cart_id, "user_id": auth.user_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::not_found("Cart not found."))?;

    if cart.items.is_empty() {
        return Err(ApiError::bad_request("Cart is empty."));
    }

    let mut booking = Booking {
        id: None,
        user_id: auth.user_id,
        cart_id,
        professional_type: dto.professional_type.clone(),
        date: dto.date.clone(),
        time: dto.time.clone(),
        address: dto.address.clone(),
        items: cart
            .items
            .iter()
            .map(|item| BookingItem {
                service_id: item.service_id,
                quantity: item.quantity,
            })
            .collect(),
        status: BookingStatus::Pending,
        otp: None,
        is_verified: false,
        created_at: DateTime::now(),
        updated_at: DateTime::now(),
    };

    // The on-site challenge rides on the booking itself, independent of any
    // login challenge the user may have pending.
    let code = OtpEngine::issue(&mut booking, Config::otp_expiry_minutes());

    let result = db
        .collection::<Booking>("bookings")
        .insert_one(&booking, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Checkout failed: {}", e)))?;
    booking.id = result.inserted_id.as_object_id();

    let mut data = serde_json::json!({
        "booking_id": booking.id.map(|id| id.to_hex()),
        "status": booking.status,
        "professional_type": booking.professional_type,
        "date": booking.date,
        "time": booking.time,
        "address": booking.address,
    });
    if Config::otp_test_mode() {
        if let (Some(obj), Some(challenge)) = (data.as_object_mut(), &booking.otp) {
            obj.insert("otp".to_string(), serde_json::json!(challenge.code));
        }
    }

    // Booking survives a failed dispatch; re-running checkout is the only
    // path that reissues this challenge.
    match SmsService::send_otp(&auth.phone, &code).await {
        Ok(()) => Ok(Json(ApiResponse::success_with_message(
            "Checkout successful. Verification OTP sent to your phone number.".to_string(),
            data,
        ))),
        Err(e) => {
            error!("SMS sending failed for {}: {}", auth.phone, e);
            Ok(Json(ApiResponse::success_with_message(
                "Checkout successful. Verification OTP could not be sent.".to_string(),
                data,
            )))
        }
    }
}
