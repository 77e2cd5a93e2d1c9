use rocket::serde::json::Json;
use rocket::State;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::options::FindOptions;

use crate::db::DbConn;
use crate::guards::AdminGuard;
use crate::models::{CreateServiceDto, Service, ServiceResponse, SubCategory};
use crate::utils::{ApiError, ApiResponse};

async fn collect_services(
    db: &DbConn,
    filter: mongodb::bson::Document,
) -> Result<Vec<ServiceResponse>, ApiError> {
    let options = FindOptions::builder().sort(doc! { "name": 1 }).build();
    let mut cursor = db
        .collection::<Service>("services")
        .find(filter, options)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;

    let mut services = Vec::new();
    while cursor
        .advance()
        .await
        .map_err(|e| ApiError::internal_error(format!("Cursor error: {}", e)))?
    {
        let service = cursor
            .deserialize_current()
            .map_err(|e| ApiError::internal_error(format!("Deserialization error: {}", e)))?;
        services.push(ServiceResponse::from(service));
    }

    Ok(services)
}

#[get("/service/all")]
pub async fn get_all_services(
    db: &State<DbConn>,
) -> Result<Json<ApiResponse<Vec<ServiceResponse>>>, ApiError> {
    let services = collect_services(db, doc! { "is_active": true }).await?;
    Ok(Json(ApiResponse::success(services)))
}

#[get("/subcategory/<subcategory_id>/services")]
pub async fn get_services_by_subcategory(
    db: &State<DbConn>,
    subcategory_id: String,
) -> Result<Json<ApiResponse<Vec<ServiceResponse>>>, ApiError> {
    let object_id = ObjectId::parse_str(&subcategory_id)
        .map_err(|_| ApiError::bad_request("Invalid subcategory ID"))?;

    let services = collect_services(
        db,
        doc! { "sub_category_id": object_id, "is_active": true },
    )
    .await?;

    Ok(Json(ApiResponse::success(services)))
}

#[get("/service/<service_id>")]
pub async fn get_service_by_id(
    db: &State<DbConn>,
    service_id: String,
) -> Result<Json<ApiResponse<ServiceResponse>>, ApiError> {
    let object_id = ObjectId::parse_str(&service_id)
        .map_err(|_| ApiError::bad_request("Invalid service ID"))?;

    let service = db
        .collection::<Service>("services")
        .find_one(doc! { "_id": object_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::not_found("Service not found"))?;

    Ok(Json(ApiResponse::success(ServiceResponse::from(service))))
}

#[post("/admin/services", data = "<dto>")]
pub async fn create_service(
    db: &State<DbConn>,
    _admin: AdminGuard,
    dto: Json<CreateServiceDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let sub_category_id = ObjectId::parse_str(&dto.sub_category_id)
        .map_err(|_| ApiError::bad_request("Invalid subcategory ID"))?;

    if dto.price < 0.0 {
        return Err(ApiError::bad_request("Price cannot be negative"));
    }

    let parent = db
        .collection::<SubCategory>("sub_categories")
        .find_one(doc! { "_id": sub_category_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Database error: {}", e)))?;
    if parent.is_none() {
        return Err(ApiError::not_found("Subcategory not found"));
    }

    let service = Service {
        id: None,
        sub_category_id,
        name: dto.name.clone(),
        price: dto.price,
        description: dto.description.clone(),
        image_url: dto.image_url.clone(),
        benefits: dto.benefits.clone().unwrap_or_default(),
        is_active: dto.is_active.unwrap_or(true),
        created_at: DateTime::now(),
        updated_at: DateTime::now(),
    };

    let result = db
        .collection::<Service>("services")
        .insert_one(&service, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to create service: {}", e)))?;

    Ok(Json(ApiResponse::success_with_message(
        "Service created successfully".to_string(),
        serde_json::json!({
            "id": result.inserted_id.as_object_id().map(|id| id.to_hex())
        }),
    )))
}

#[put("/admin/services/<service_id>", data = "<dto>")]
pub async fn update_service(
    db: &State<DbConn>,
    _admin: AdminGuard,
    service_id: String,
    dto: Json<CreateServiceDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let object_id = ObjectId::parse_str(&service_id)
        .map_err(|_| ApiError::bad_request("Invalid service ID"))?;

    let sub_category_id = ObjectId::parse_str(&dto.sub_category_id)
        .map_err(|_| ApiError::bad_request("Invalid subcategory ID"))?;

    if dto.price < 0.0 {
        return Err(ApiError::bad_request("Price cannot be negative"));
    }

    let mut update_doc = doc! {
        "sub_category_id": sub_category_id,
        "name": &dto.name,
        "price": dto.price,
        "updated_at": DateTime::now(),
    };
    if let Some(ref description) = dto.description {
        update_doc.insert("description", description);
    }
    if let Some(ref image_url) = dto.image_url {
        update_doc.insert("image_url", image_url);
    }
    if let Some(ref benefits) = dto.benefits {
        update_doc.insert("benefits", benefits.clone());
    }
    if let Some(is_active) = dto.is_active {
        update_doc.insert("is_active", is_active);
    }

    let result = db
        .collection::<Service>("services")
        .update_one(doc! { "_id": object_id }, doc! { "$set": update_doc }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to update service: {}", e)))?;

    if result.matched_count == 0 {
        return Err(ApiError::not_found("Service not found"));
    }

    Ok(Json(ApiResponse::success_with_message(
        "Service updated successfully".to_string(),
        serde_json::json!({ "id": service_id }),
    )))
}

#[delete("/admin/services/<service_id>")]
pub async fn delete_service(
    db: &State<DbConn>,
    _admin: AdminGuard,
    service_id: String,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let object_id = ObjectId::parse_str(&service_id)
        .map_err(|_| ApiError::bad_request("Invalid service ID"))?;

    let result = db
        .collection::<Service>("services")
        .delete_one(doc! { "_id": object_id }, None)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to delete service: {}", e)))?;

    if result.deleted_count == 0 {
        return Err(ApiError::not_found("Service not found"));
    }

    Ok(Json(ApiResponse::success_with_message(
        "Service deleted successfully".to_string(),
        serde_json::json!({ "id": service_id }),
    )))
}
