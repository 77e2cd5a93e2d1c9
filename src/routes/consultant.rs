use rocket::serde::json::Json;
use rocket::State;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::options::FindOptions;

use crate::db::DbConn;
use crate::guards::AdminGuard;
use crate::models::{
    BannerPositionDto, ConsultantBanner, ConsultantBannerResponse, ConsultantExpert,
    ConsultantExpertResponse, CreateConsultantBannerDto, CreateConsultantExpertDto,
    UpdateConsultantBannerDto, UpdateConsultantExpertDto,
};
use crate::utils::{ApiError, ApiResponse};

/// Consultation-screen banners have four slots.
const CONSULTANT_BANNER_SLOTS: i32 = 4;

fn validate_expertise(expertise: &[String]) -> Result<(), ApiError> {
    if expertise.is_empty() || expertise.iter().any(|area| area.trim().is_empty()) {
        return Err(ApiError::bad_request("Expertise must be a non-empty array"));
    }
    Ok(())
}

fn validate_banner_position(position: i32) -> Result<(), ApiError> {
    if !(1..=CONSULTANT_BANNER_SLOTS).contains(&position) {
        return Err(ApiError::bad_request("Position must be between 1 and 4"));
    }
    Ok(())
}

async fn collect_experts(
    db: &DbConn,
    filter: mongodb::bson::Document,
) -> Result<Vec<ConsultantExpertResponse>, ApiError> {
    let options = FindOptions::builder()
        .sort(doc! { "created_at": -1 })
        .build();

    let mut cursor = db
        .collection::<ConsultantExpert>("consultant_experts")
        .find(filter, options)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let mut experts = Vec::new();
    while cursor
        .advance()
        .await
        .map_err(|e| ApiError::internal_error(format!("Cursor error: {}", e)))?
    {
        let expert = cursor
            .deserialize_current()
            .map_err(|e| ApiError::internal_error(format!("Deserialization error: {}", e)))?;
        experts.push(ConsultantExpertResponse::from(expert));
    }

    Ok(experts)
}

/// --------------------
/// Consultant experts
/// --------------------
#[get("/consultant-experts/active")]
pub async fn get_active_experts(
    db: &State<DbConn>,
) -> Result<Json<ApiResponse<Vec<ConsultantExpertResponse>>>, ApiError> {
    let experts = collect_experts(db, doc! { "is_active": true }).await?;
    Ok(Json(ApiResponse::success(experts)))
}

#[get("/consultant-experts/<expert_id>")]
pub async fn get_expert_by_id(
    db: &State<DbConn>,
    expert_id: String,
) -> Result<Json<ApiResponse<ConsultantExpertResponse>>, ApiError> {
    let object_id = ObjectId::parse_str(&expert_id)
        .map_err(|_| ApiError::bad_request("Invalid consultant expert ID"))?;

    let expert = db
        .collection::<ConsultantExpert>("consultant_experts")
        .find_one(doc! { "_id": object_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::not_found("Consultant expert not found"))?;

    Ok(Json(ApiResponse::success(ConsultantExpertResponse::from(
        expert,
    ))))
}

#[get("/admin/consultant-experts")]
pub async fn get_all_experts(
    db: &State<DbConn>,
    _admin: AdminGuard,
) -> Result<Json<ApiResponse<Vec<ConsultantExpertResponse>>>, ApiError> {
    let experts = collect_experts(db, doc! {}).await?;
    Ok(Json(ApiResponse::success(experts)))
}

#[post("/admin/consultant-experts", data = "<dto>")]
pub async fn create_expert(
    db: &State<DbConn>,
    _admin: AdminGuard,
    dto: Json<CreateConsultantExpertDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    if dto.name.trim().is_empty() || dto.name.len() > 100 {
        return Err(ApiError::bad_request(
            "Name is required and cannot exceed 100 characters",
        ));
    }
    if dto.short_desc.trim().is_empty() || dto.short_desc.len() > 200 {
        return Err(ApiError::bad_request(
            "Short description is required and cannot exceed 200 characters",
        ));
    }
    if dto.long_desc.trim().is_empty() || dto.long_desc.len() > 1000 {
        return Err(ApiError::bad_request(
            "Long description is required and cannot exceed 1000 characters",
        ));
    }
    if dto.image.trim().is_empty() {
        return Err(ApiError::bad_request("Image is required"));
    }
    validate_expertise(&dto.expertise)?;

    let expert = ConsultantExpert {
        id: None,
        name: dto.name.trim().to_string(),
        short_desc: dto.short_desc.trim().to_string(),
        long_desc: dto.long_desc.trim().to_string(),
        expertise: dto.expertise.clone(),
        image: dto.image.clone(),
        is_active: dto.is_active.unwrap_or(true),
        created_at: DateTime::now(),
        updated_at: DateTime::now(),
    };

    let result = db
        .collection::<ConsultantExpert>("consultant_experts")
        .insert_one(&expert, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to create consultant expert: {}", e)))?;

    Ok(Json(ApiResponse::success_with_message(
        "Consultant expert created successfully".to_string(),
        serde_json::json!({
            "id": result.inserted_id.as_object_id().map(|id| id.to_hex())
        }),
    )))
}

#[put("/admin/consultant-experts/<expert_id>", data = "<dto>")]
pub async fn update_expert(
    db: &State<DbConn>,
    _admin: AdminGuard,
    expert_id: String,
    dto: Json<UpdateConsultantExpertDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let object_id = ObjectId::parse_str(&expert_id)
        .map_err(|_| ApiError::bad_request("Invalid consultant expert ID"))?;

    let mut set = doc! { "updated_at": DateTime::now() };

    if let Some(ref name) = dto.name {
        set.insert("name", name.trim());
    }
    if let Some(ref short_desc) = dto.short_desc {
        set.insert("short_desc", short_desc.trim());
    }
    if let Some(ref long_desc) = dto.long_desc {
        set.insert("long_desc", long_desc.trim());
    }
    if let Some(ref expertise) = dto.expertise {
        validate_expertise(expertise)?;
        set.insert("expertise", expertise.clone());
    }
    if let Some(ref image) = dto.image {
        set.insert("image", image);
    }
    if let Some(is_active) = dto.is_active {
        set.insert("is_active", is_active);
    }

    let result = db
        .collection::<ConsultantExpert>("consultant_experts")
        .update_one(doc! { "_id": object_id }, doc! { "$set": set }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to update consultant expert: {}", e)))?;

    if result.matched_count == 0 {
        return Err(ApiError::not_found("Consultant expert not found"));
    }

    Ok(Json(ApiResponse::success_with_message(
        "Consultant expert updated successfully".to_string(),
        serde_json::json!({ "id": expert_id }),
    )))
}

#[delete("/admin/consultant-experts/<expert_id>")]
pub async fn delete_expert(
    db: &State<DbConn>,
    _admin: AdminGuard,
    expert_id: String,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let object_id = ObjectId::parse_str(&expert_id)
        .map_err(|_| ApiError::bad_request("Invalid consultant expert ID"))?;

    let result = db
        .collection::<ConsultantExpert>("consultant_experts")
        .delete_one(doc! { "_id": object_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to delete consultant expert: {}", e)))?;

    if result.deleted_count == 0 {
        return Err(ApiError::not_found("Consultant expert not found"));
    }

    Ok(Json(ApiResponse::success_with_message(
        "Consultant expert deleted successfully".to_string(),
        serde_json::json!({ "id": expert_id }),
    )))
}

/// --------------------
/// Consultant banners
/// --------------------
async fn collect_consultant_banners(
    db: &DbConn,
    filter: mongodb::bson::Document,
) -> Result<Vec<ConsultantBannerResponse>, ApiError> {
    let options = FindOptions::builder()
        .sort(doc! { "order": 1, "position": 1 })
        .build();

    let mut cursor = db
        .collection::<ConsultantBanner>("consultant_banners")
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
        banners.push(ConsultantBannerResponse::from(banner));
    }

    Ok(banners)
}

#[get("/consultant-banners/active")]
pub async fn get_active_consultant_banners(
    db: &State<DbConn>,
) -> Result<Json<ApiResponse<Vec<ConsultantBannerResponse>>>, ApiError> {
    let banners = collect_consultant_banners(db, doc! { "is_active": true }).await?;
    Ok(Json(ApiResponse::success(banners)))
}

#[get("/consultant-banners/position/<position>")]
pub async fn get_consultant_banner_by_position(
    db: &State<DbConn>,
    position: i32,
) -> Result<Json<ApiResponse<ConsultantBannerResponse>>, ApiError> {
    validate_banner_position(position)?;

    let banner = db
        .collection::<ConsultantBanner>("consultant_banners")
        .find_one(doc! { "position": position, "is_active": true }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?
        .ok_or_else(|| {
            ApiError::not_found(format!(
                "No active consultant banner found at position {}",
                position
            ))
        })?;

    Ok(Json(ApiResponse::success(ConsultantBannerResponse::from(
        banner,
    ))))
}

#[get("/admin/consultant-banners")]
pub async fn get_all_consultant_banners(
    db: &State<DbConn>,
    _admin: AdminGuard,
) -> Result<Json<ApiResponse<Vec<ConsultantBannerResponse>>>, ApiError> {
    let banners = collect_consultant_banners(db, doc! {}).await?;
    Ok(Json(ApiResponse::success(banners)))
}

#[get("/admin/consultant-banners/<banner_id>")]
pub async fn get_consultant_banner_by_id(
    db: &State<DbConn>,
    _admin: AdminGuard,
    banner_id: String,
) -> Result<Json<ApiResponse<ConsultantBannerResponse>>, ApiError> {
    let object_id = ObjectId::parse_str(&banner_id)
        .map_err(|_| ApiError::bad_request("Invalid consultant banner ID"))?;

    let banner = db
        .collection::<ConsultantBanner>("consultant_banners")
        .find_one(doc! { "_id": object_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::not_found("Consultant banner not found"))?;

    Ok(Json(ApiResponse::success(ConsultantBannerResponse::from(
        banner,
    ))))
}

#[post("/admin/consultant-banners", data = "<dto>")]
pub async fn create_consultant_banner(
    db: &State<DbConn>,
    _admin: AdminGuard,
    dto: Json<CreateConsultantBannerDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    validate_banner_position(dto.position)?;
    if dto.title.trim().is_empty() || dto.title.len() > 100 {
        return Err(ApiError::bad_request(
            "Title is required and cannot exceed 100 characters",
        ));
    }
    if dto.image_url.trim().is_empty() {
        return Err(ApiError::bad_request("Image URL is required"));
    }

    let occupied = db
        .collection::<ConsultantBanner>("consultant_banners")
        .find_one(doc! { "position": dto.position }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;
    if occupied.is_some() {
        return Err(ApiError::conflict(
            "Consultant banner position is already taken",
        ));
    }

    let banner = ConsultantBanner {
        id: None,
        position: dto.position,
        title: dto.title.trim().to_string(),
        description: dto.description.clone(),
        image_url: dto.image_url.clone(),
        link_url: dto.link_url.clone(),
        is_active: dto.is_active.unwrap_or(true),
        order: dto.order.unwrap_or(0),
        created_at: DateTime::now(),
        updated_at: DateTime::now(),
    };

    let result = db
        .collection::<ConsultantBanner>("consultant_banners")
        .insert_one(&banner, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to create consultant banner: {}", e)))?;

    Ok(Json(ApiResponse::success_with_message(
        "Consultant banner created successfully".to_string(),
        serde_json::json!({
            "id": result.inserted_id.as_object_id().map(|id| id.to_hex())
        }),
    )))
}

#[put("/admin/consultant-banners/<banner_id>", data = "<dto>")]
pub async fn update_consultant_banner(
    db: &State<DbConn>,
    _admin: AdminGuard,
    banner_id: String,
    dto: Json<UpdateConsultantBannerDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let object_id = ObjectId::parse_str(&banner_id)
        .map_err(|_| ApiError::bad_request("Invalid consultant banner ID"))?;

    let mut set = doc! { "updated_at": DateTime::now() };

    if let Some(ref title) = dto.title {
        if title.trim().is_empty() || title.len() > 100 {
            return Err(ApiError::bad_request(
                "Title is required and cannot exceed 100 characters",
            ));
        }
        set.insert("title", title.trim());
    }
    if let Some(ref description) = dto.description {
        set.insert("description", description);
    }
    if let Some(ref image_url) = dto.image_url {
        set.insert("image_url", image_url);
    }
    if let Some(ref link_url) = dto.link_url {
        set.insert("link_url", link_url);
    }
    if let Some(is_active) = dto.is_active {
        set.insert("is_active", is_active);
    }
    if let Some(order) = dto.order {
        set.insert("order", order);
    }

    let result = db
        .collection::<ConsultantBanner>("consultant_banners")
        .update_one(doc! { "_id": object_id }, doc! { "$set": set }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to update consultant banner: {}", e)))?;

    if result.matched_count == 0 {
        return Err(ApiError::not_found("Consultant banner not found"));
    }

    Ok(Json(ApiResponse::success_with_message(
        "Consultant banner updated successfully".to_string(),
        serde_json::json!({ "id": banner_id }),
    )))
}

#[put("/admin/consultant-banners/<banner_id>/position", data = "<dto>")]
pub async fn update_consultant_banner_position(
    db: &State<DbConn>,
    _admin: AdminGuard,
    banner_id: String,
    dto: Json<BannerPositionDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let object_id = ObjectId::parse_str(&banner_id)
        .map_err(|_| ApiError::bad_request("Invalid consultant banner ID"))?;

    validate_banner_position(dto.position)?;

    let occupied = db
        .collection::<ConsultantBanner>("consultant_banners")
        .find_one(
            doc! { "position": dto.position, "_id": { "$ne": object_id } },
            None,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;
    if occupied.is_some() {
        return Err(ApiError::conflict(
            "Consultant banner position is already taken",
        ));
    }

    let result = db
        .collection::<ConsultantBanner>("consultant_banners")
        .update_one(
            doc! { "_id": object_id },
            doc! { "$set": { "position": dto.position, "updated_at": DateTime::now() } },
            None,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to update position: {}", e)))?;

    if result.matched_count == 0 {
        return Err(ApiError::not_found("Consultant banner not found"));
    }

    Ok(Json(ApiResponse::success_with_message(
        "Consultant banner position updated successfully".to_string(),
        serde_json::json!({ "id": banner_id, "position": dto.position }),
    )))
}

#[delete("/admin/consultant-banners/<banner_id>")]
pub async fn delete_consultant_banner(
    db: &State<DbConn>,
    _admin: AdminGuard,
    banner_id: String,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let object_id = ObjectId::parse_str(&banner_id)
        .map_err(|_| ApiError::bad_request("Invalid consultant banner ID"))?;

    let result = db
        .collection::<ConsultantBanner>("consultant_banners")
        .delete_one(doc! { "_id": object_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to delete consultant banner: {}", e)))?;

    if result.deleted_count == 0 {
        return Err(ApiError::not_found("Consultant banner not found"));
    }

    Ok(Json(ApiResponse::success_with_message(
        "Consultant banner deleted successfully".to_string(),
        serde_json::json!({ "id": banner_id }),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::http::Status;

    #[test]
    fn expertise_must_not_be_empty() {
        assert!(validate_expertise(&[]).is_err());
        assert!(validate_expertise(&["  ".to_string()]).is_err());
        assert!(validate_expertise(&["Skin care".to_string()]).is_ok());
    }

    #[test]
    fn consultant_banner_positions_have_four_slots() {
        assert_eq!(
            validate_banner_position(0).unwrap_err().status,
            Status::BadRequest
        );
        assert!(validate_banner_position(1).is_ok());
        assert!(validate_banner_position(4).is_ok());
        assert!(validate_banner_position(5).is_err());
    }
}
