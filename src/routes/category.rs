use rocket::serde::json::Json;
use rocket::State;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::options::FindOptions;
use std::collections::HashMap;

use crate::db::DbConn;
use crate::guards::AdminGuard;
use crate::models::{
    CategoryResponse, CreateCategoryDto, MainCategory, SubCategory, SubCategoryResponse,
};
use crate::utils::{ApiError, ApiResponse};

async fn collect_active_subcategories(
    db: &DbConn,
) -> Result<HashMap<ObjectId, Vec<SubCategory>>, ApiError> {
    let options = FindOptions::builder().sort(doc! { "order": 1 }).build();
    let mut cursor = db
        .collection::<SubCategory>("sub_categories")
        .find(doc! { "is_active": true }, options)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let mut grouped: HashMap<ObjectId, Vec<SubCategory>> = HashMap::new();
    while cursor
        .advance()
        .await
        .map_err(|e| ApiError::internal_error(format!("Cursor error: {}", e)))?
    {
        let sub = cursor
            .deserialize_current()
            .map_err(|e| ApiError::internal_error(format!("Deserialization error: {}", e)))?;
        grouped.entry(sub.main_category_id).or_default().push(sub);
    }

    Ok(grouped)
}

#[get("/category/all")]
pub async fn get_all_categories(
    db: &State<DbConn>,
) -> Result<Json<ApiResponse<Vec<CategoryResponse>>>, ApiError> {
    let options = FindOptions::builder().sort(doc! { "order": 1 }).build();
    let mut cursor = db
        .collection::<MainCategory>("main_categories")
        .find(doc! { "is_active": true }, options)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let mut grouped = collect_active_subcategories(db).await?;

    let mut categories = Vec::new();
    while cursor
        .advance()
        .await
        .map_err(|e| ApiError::internal_error(format!("Cursor error: {}", e)))?
    {
        let category = cursor
            .deserialize_current()
            .map_err(|e| ApiError::internal_error(format!("Deserialization error: {}", e)))?;

        let subcategories = category
            .id
            .and_then(|id| grouped.remove(&id))
            .unwrap_or_default()
            .into_iter()
            .map(SubCategoryResponse::from)
            .collect();

        categories.push(CategoryResponse {
            id: category.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: category.name,
            description: category.description,
            image_url: category.image_url,
            subcategories,
        });
    }

    Ok(Json(ApiResponse::success(categories)))
}

#[post("/admin/categories", data = "<dto>")]
pub async fn create_category(
    db: &State<DbConn>,
    _admin: AdminGuard,
    dto: Json<CreateCategoryDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let existing = db
        .collection::<MainCategory>("main_categories")
        .find_one(doc! { "name": &dto.name }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;
    if existing.is_some() {
        return Err(ApiError::conflict("Category with this name already exists"));
    }

    let category = MainCategory {
        id: None,
        name: dto.name.clone(),
        description: dto.description.clone(),
        image_url: dto.image_url.clone(),
        is_active: dto.is_active.unwrap_or(true),
        order: dto.order.unwrap_or(0),
        created_at: DateTime::now(),
        updated_at: DateTime::now(),
    };

    let result = db
        .collection::<MainCategory>("main_categories")
        .insert_one(&category, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to create category: {}", e)))?;

    Ok(Json(ApiResponse::success_with_message(
        "Category created successfully".to_string(),
        serde_json::json!({
            "id": result.inserted_id.as_object_id().map(|id| id.to_hex())
        }),
    )))
}

#[put("/admin/categories/<category_id>", data = "<dto>")]
pub async fn update_category(
    db: &State<DbConn>,
    _admin: AdminGuard,
    category_id: String,
    dto: Json<CreateCategoryDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let object_id = ObjectId::parse_str(&category_id)
        .map_err(|_| ApiError::bad_request("Invalid category ID"))?;

    let mut update_doc = doc! {
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
        .collection::<MainCategory>("main_categories")
        .update_one(doc! { "_id": object_id }, doc! { "$set": update_doc }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to update category: {}", e)))?;

    if result.matched_count == 0 {
        return Err(ApiError::not_found("Category not found"));
    }

    Ok(Json(ApiResponse::success_with_message(
        "Category updated successfully".to_string(),
        serde_json::json!({ "id": category_id }),
    )))
}

#[delete("/admin/categories/<category_id>")]
pub async fn delete_category(
    db: &State<DbConn>,
    _admin: AdminGuard,
    category_id: String,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let object_id = ObjectId::parse_str(&category_id)
        .map_err(|_| ApiError::bad_request("Invalid category ID"))?;

    let dependents = db
        .collection::<SubCategory>("sub_categories")
        .find_one(doc! { "main_category_id": object_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;
    if dependents.is_some() {
        return Err(ApiError::conflict(
            "Category has subcategories; delete them first",
        ));
    }

    let result = db
        .collection::<MainCategory>("main_categories")
        .delete_one(doc! { "_id": object_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to delete category: {}", e)))?;

    if result.deleted_count == 0 {
        return Err(ApiError::not_found("Category not found"));
    }

    Ok(Json(ApiResponse::success_with_message(
        "Category deleted successfully".to_string(),
        serde_json::json!({ "id": category_id }),
    )))
}
