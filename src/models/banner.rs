use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use rocket_okapi::okapi::schemars::JsonSchema;

/// Promotional banner. `position` is unique per banner (1-10 slots).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Banner {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub position: i32,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    pub is_active: bool,
    pub order: i32,

    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateBannerDto {
    pub position: i32,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    pub is_active: Option<bool>,
    pub order: Option<i32>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct BannerResponse {
    pub id: String,
    pub position: i32,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    pub order: i32,
}

impl From<Banner> for BannerResponse {
    fn from(banner: Banner) -> Self {
        BannerResponse {
            id: banner.id.map(|id| id.to_hex()).unwrap_or_default(),
            position: banner.position,
            title: banner.title,
            description: banner.description,
            image_url: banner.image_url,
            link_url: banner.link_url,
            order: banner.order,
        }
    }
}
