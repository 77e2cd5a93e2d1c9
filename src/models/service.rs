use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use rocket_okapi::okapi::schemars::JsonSchema;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Service {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub sub_category_id: ObjectId,
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    pub is_active: bool,

    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateServiceDto {
    pub sub_category_id: String,
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub benefits: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ServiceResponse {
    pub id: String,
    pub sub_category_id: String,
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub benefits: Vec<String>,
}

impl From<Service> for ServiceResponse {
    fn from(service: Service) -> Self {
        ServiceResponse {
            id: service.id.map(|id| id.to_hex()).unwrap_or_default(),
            sub_category_id: service.sub_category_id.to_hex(),
            name: service.name,
            price: service.price,
            description: service.description,
            image_url: service.image_url,
            benefits: service.benefits,
        }
    }
}
