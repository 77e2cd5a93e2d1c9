use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use rocket_okapi::okapi::schemars::JsonSchema;

/// Main category stored in MongoDB
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MainCategory {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub name: String,
    pub description: Option<String>,
    pub image_url: String,
    pub is_active: bool,
    pub order: i32,

    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

/// Sub-category stored in MongoDB
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubCategory {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub main_category_id: ObjectId,

    pub name: String,
    pub description: Option<String>,
    pub image_url: String,
    pub is_active: bool,
    pub order: i32,

    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateCategoryDto {
    pub name: String,
    pub description: Option<String>,
    pub image_url: String,
    pub is_active: Option<bool>,
    pub order: Option<i32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateSubCategoryDto {
    pub main_category_id: String,
    pub name: String,
    pub description: Option<String>,
    pub image_url: String,
    pub is_active: Option<bool>,
    pub order: Option<i32>,
}

/// Response model returned to clients
#[derive(Debug, Serialize, JsonSchema)]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub image_url: String,
    pub subcategories: Vec<SubCategoryResponse>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct SubCategoryResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub image_url: String,
}

impl From<SubCategory> for SubCategoryResponse {
    fn from(sub: SubCategory) -> Self {
        SubCategoryResponse {
            id: sub.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: sub.name,
            description: sub.description,
            image_url: sub.image_url,
        }
    }
}
