use rocket::serde::json::Json;
use rocket::State;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::options::FindOptions;

use crate::db::DbConn;
use crate::guards::AdminGuard;
use crate::models::{Banner, BannerPositionDto, BannerResponse, CreateBannerDto};
use crate::utils::{ApiError, ApiResponse};

async fn collect_banners(
    db: &DbConn,
    filter: mongodb::bson::Document,
) -> Result<Vec<BannerResponse>, ApiError> {
    let options = FindOptions::builder()
        .sort(doc! { "order": 1, "position": 1 })
        .build();

    let mut cursor = db
        .collection::<Banner>("banners")
        .find(filter, options)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let mut banners = Vec::new();
    while cursor
        .advance()
        .await
        .map_err(|e| ApiError::internal_error(format!("Cursor error: {}", e)))?
    {
        let banner = cursor
            .deserialize_current()
            .map_err(|e| ApiError::internal_error(format!("Deserialization error: {}", e)))?;
        banners.push(BannerResponse::from(banner));
    }

    Ok(banners)
}

#[get("/banner/active")]
pub async fn get_active_banners(
    db: &State<DbConn>,
) -> Result<Json<ApiResponse<Vec<BannerResponse>>>, ApiError> {
    let banners = collect_banners(db, doc! { "is_active": true }).await?;
    Ok(Json(ApiResponse::success(banners)))
}

#[get("/banner/position/<position>")]
pub async fn get_banner_by_position(
    db: &State<DbConn>,
    position: i32,
) -> Result<Json<ApiResponse<BannerResponse>>, ApiError> {
    if !(1..=10).contains(&position) {
        return Err(ApiError::bad_request("Position must be between 1 and 10"));
    }

    let banner = db
        .collection::<Banner>("banners")
        .find_one(doc! { "position": position, "is_active": true }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?
        .ok_or_else(|| {
            ApiError::not_found(format!("No active banner found at position {}", position))
        })?;

    Ok(Json(ApiResponse::success(BannerResponse::from(banner))))
}

#[get("/banner/<banner_id>")]
pub async fn get_banner_by_id(
    db: &State<DbConn>,
    banner_id: String,
) -> Result<Json<ApiResponse<BannerResponse>>, ApiError> {
    let object_id = ObjectId::parse_str(&banner_id)
        .map_err(|_| ApiError::bad_request("Invalid banner ID"))?;

    let banner = db
        .collection::<Banner>("banners")
        .find_one(doc! { "_id": object_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::not_found("Banner not found"))?;

    Ok(Json(ApiResponse::success(BannerResponse::from(banner))))
}

#[get("/admin/banners")]
pub async fn get_all_banners(
    db: &State<DbConn>,
    _admin: AdminGuard,
) -> Result<Json<ApiResponse<Vec<BannerResponse>>>, ApiError> {
    let banners = collect_banners(db, doc! {}).await?;
    Ok(Json(ApiResponse::success(banners)))
}

#[post("/admin/banners", data = "<dto>")]
pub async fn create_banner(
    db: &State<DbConn>,
    _admin: AdminGuard,
    dto: Json<CreateBannerDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    if !(1..=10).contains(&dto.position) {
        return Err(ApiError::bad_request("Position must be between 1 and 10"));
    }
    if dto.title.trim().is_empty() || dto.title.len() > 100 {
        return Err(ApiError::bad_request(
            "Title is required and cannot exceed 100 characters",
        ));
    }

    let occupied = db
        .collection::<Banner>("banners")
        .find_one(doc! { "position": dto.position }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;
    if occupied.is_some() {
        return Err(ApiError::conflict("Banner position is already taken"));
    }

    let banner = Banner {
        id: None,
        position: dto.position,
        title: dto.title.clone(),
        description: dto.description.clone(),
        image_url: dto.image_url.clone(),
        link_url: dto.link_url.clone(),
        is_active: dto.is_active.unwrap_or(true),
        order: dto.order.unwrap_or(0),
        created_at: DateTime::now(),
        updated_at: DateTime::now(),
    };

    let result = db
        .collection::<Banner>("banners")
        .insert_one(&banner, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to create banner: {}", e)))?;

    Ok(Json(ApiResponse::success_with_message(
        "Banner created successfully".to_string(),
        serde_json::json!({
            "id": result.inserted_id.as_object_id().map(|id| id.to_hex())
        }),
    )))
}

#[put("/admin/banners/<banner_id>", data = "<dto>")]
pub async fn update_banner(
    db: &State<DbConn>,
    _admin: AdminGuard,
    banner_id: String,
    dto: Json<CreateBannerDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let object_id = ObjectId::parse_str(&banner_id)
        .map_err(|_| ApiError::bad_request("Invalid banner ID"))?;

    if !(1..=10).contains(&dto.position) {
        return Err(ApiError::bad_request("Position must be between 1 and 10"));
    }

    let occupied = db
        .collection::<Banner>("banners")
        .find_one(
            doc! { "position": dto.position, "_id": { "$ne": object_id } },
            None,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;
    if occupied.is_some() {
        return Err(ApiError::conflict("Banner position is already taken"));
    }

    let mut update_doc = doc! {
        "position": dto.position,
        "title": &dto.title,
        "image_url": &dto.image_url,
        "updated_at": DateTime::now(),
    };
    if let Some(ref description) = dto.description {
        update_doc.insert("description", description);
    }
    if let Some(ref link_url) = dto.link_url {
        update_doc.insert("link_url", link_url);
    }
    if let Some(order) = dto.order {
        update_doc.insert("order", order);
    }
    if let Some(is_active) = dto.is_active {
        update_doc.insert("is_active", is_active);
    }

    let result = db
        .collection::<Banner>("banners")
        .update_one(doc! { "_id": object_id }, doc! { "$set": update_doc }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to update banner: {}", e)))?;

    if result.matched_count == 0 {
        return Err(ApiError::not_found("Banner not found"));
    }

    Ok(Json(ApiResponse::success_with_message(
        "Banner updated successfully".to_string(),
        serde_json::json!({ "id": banner_id }),
    )))
}

#[put("/admin/banners/<banner_id>/position", data = "<dto>")]
pub async fn update_banner_position(
    db: &State<DbConn>,
    _admin: AdminGuard,
    banner_id: String,
    dto: Json<BannerPositionDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let object_id = ObjectId::parse_str(&banner_id)
        .map_err(|_| ApiError::bad_request("Invalid banner ID"))?;

    if !(1..=10).contains(&dto.position) {
        return Err(ApiError::bad_request("Position must be between 1 and 10"));
    }

    let occupied = db
        .collection::<Banner>("banners")
        .find_one(
            doc! { "position": dto.position, "_id": { "$ne": object_id } },
            None,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;
    if occupied.is_some() {
        return Err(ApiError::conflict("Banner position is already taken"));
    }

    let result = db
        .collection::<Banner>("banners")
        .update_one(
            doc! { "_id": object_id },
            doc! { "$set": { "position": dto.position, "updated_at": DateTime::now() } },
            None,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to update position: {}", e)))?;

    if result.matched_count == 0 {
        return Err(ApiError::not_found("Banner not found"));
    }

    Ok(Json(ApiResponse::success_with_message(
        "Banner position updated successfully".to_string(),
        serde_json::json!({ "id": banner_id, "position": dto.position }),
    )))
}

#[delete("/admin/banners/<banner_id>")]
pub async fn delete_banner(
    db: &State<DbConn>,
    _admin: AdminGuard,
    banner_id: String,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let object_id = ObjectId::parse_str(&banner_id)
        .map_err(|_| ApiError::bad_request("Invalid banner ID"))?;

    let result = db
        .collection::<Banner>("banners")
        .delete_one(doc! { "_id": object_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to delete banner: {}", e)))?;

    if result.deleted_count == 0 {
        return Err(ApiError::not_found("Banner not found"));
    }

    Ok(Json(ApiResponse::success_with_message(
        "Banner deleted successfully".to_string(),
        serde_json::json!({ "id": banner_id }),
    )))
}
