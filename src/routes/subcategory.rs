use rocket::serde::json::Json;
use rocket::State;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::options::FindOptions;

use crate::db::DbConn;
use crate::guards::AdminGuard;
use crate::models::{CreateSubCategoryDto, MainCategory, SubCategory, SubCategoryResponse};
use crate::utils::{ApiError, ApiResponse};

#[get("/category/<category_id>/subcategories")]
pub async fn get_subcategories(
    db: &State<DbConn>,
    category_id: String,
) -> Result<Json<ApiResponse<Vec<SubCategoryResponse>>>, ApiError> {
    let object_id = ObjectId::parse_str(&category_id)
        .map_err(|_| ApiError::bad_request("Invalid category ID"))?;

    let options = FindOptions::builder().sort(doc! { "order": 1 }).build();
    let mut cursor = db
        .collection::<SubCategory>("sub_categories")
        .find(
            doc! { "main_category_id": object_id, "is_active": true },
            options,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let mut subcategories = Vec::new();
    while cursor
        .advance()
        .await
        .map_err(|e| ApiError::internal_error(format!("Cursor error: {}", e)))?
    {
        let sub = cursor
            .deserialize_current()
            .map_err(|e| ApiError::internal_error(format!("Deserialization error: {}", e)))?;
        subcategories.push(SubCategoryResponse::from(sub));
    }

    Ok(Json(ApiResponse::success(subcategories)))
}

#[post("/admin/subcategories", data = "<dto>")]
pub async fn create_subcategory(
    db: &State<DbConn>,
    _admin: AdminGuard,
    dto: Json<CreateSubCategoryDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let main_category_id = ObjectId::parse_str(&dto.main_category_id)
        .map_err(|_| ApiError::bad_request("Invalid category ID"))?;

    let parent = db
        .collection::<MainCategory>("main_categories")
        .find_one(doc! { "_id": main_category_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;
    if parent.is_none() {
        return Err(ApiError::not_found("Parent category not found"));
    }

    let duplicate = db
        .collection::<SubCategory>("sub_categories")
        .find_one(
            doc! { "main_category_id": main_category_id, "name": &dto.name },
            None,
        )
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;
    if duplicate.is_some() {
        return Err(ApiError::conflict(
            "Subcategory with this name already exists in the category",
        ));
    }

    let subcategory = SubCategory {
        id: None,
        main_category_id,
        name: dto.name.clone(),
        description: dto.description.clone(),
        image_url: dto.image_url.clone(),
        is_active: dto.is_active.unwrap_or(true),
        order: dto.order.unwrap_or(0),
        created_at: DateTime::now(),
        updated_at: DateTime::now(),
    };

    let result = db
        .collection::<SubCategory>("sub_categories")
        .insert_one(&subcategory, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to create subcategory: {}", e)))?;

    Ok(Json(ApiResponse::success_with_message(
        "Subcategory created successfully".to_string(),
        serde_json::json!({
            "id": result.inserted_id.as_object_id().map(|id| id.to_hex())
        }),
    )))
}

#[put("/admin/subcategories/<subcategory_id>", data = "<dto>")]
pub async fn update_subcategory(
    db: &State<DbConn>,
    _admin: AdminGuard,
    subcategory_id: String,
    dto: Json<CreateSubCategoryDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let object_id = ObjectId::parse_str(&subcategory_id)
        .map_err(|_| ApiError::bad_request("Invalid subcategory ID"))?;

    let main_category_id = ObjectId::parse_str(&dto.main_category_id)
        .map_err(|_| ApiError::bad_request("Invalid category ID"))?;

    let mut update_doc = doc! {
        "main_category_id": main_category_id,
        "name": &dto.name,
        "image_url": &dto.image_url,
        "updated_at": DateTime::now(),
    };
    if let Some(ref description) = dto.description {
        update_doc.insert("description", description);
    }
    if let Some(order) = dto.order {
        update_doc.insert("order", order);
    }
    if let Some(is_active) = dto.is_active {
        update_doc.insert("is_active", is_active);
    }

    let result = db
        .collection::<SubCategory>("sub_categories")
        .update_one(doc! { "_id": object_id }, doc! { "$set": update_doc }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to update subcategory: {}", e)))?;

    if result.matched_count == 0 {
        return Err(ApiError::not_found("Subcategory not found"));
    }

    Ok(Json(ApiResponse::success_with_message(
        "Subcategory updated successfully".to_string(),
        serde_json::json!({ "id": subcategory_id }),
    )))
}

#[delete("/admin/subcategories/<subcategory_id>")]
pub async fn delete_subcategory(
    db: &State<DbConn>,
    _admin: AdminGuard,
    subcategory_id: String,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let object_id = ObjectId::parse_str(&subcategory_id)
        .map_err(|_| ApiError::bad_request("Invalid subcategory ID"))?;

    let result = db
        .collection::<SubCategory>("sub_categories")
        .delete_one(doc! { "_id": object_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to delete subcategory: {}", e)))?;

    if result.deleted_count == 0 {
        return Err(ApiError::not_found("Subcategory not found"));
    }

    Ok(Json(ApiResponse::success_with_message(
        "Subcategory deleted successfully".to_string(),
        serde_json::json!({ "id": subcategory_id }),
    )))
}
