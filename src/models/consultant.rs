use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use rocket_okapi::okapi::schemars::JsonSchema;

/// Consultant profile surfaced in the app's expert listing.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConsultantExpert {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub name: String,
    pub short_desc: String,
    pub long_desc: String,
    pub expertise: Vec<String>,
    pub image: String,
    pub is_active: bool,

    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateConsultantExpertDto {
    pub name: String,
    pub short_desc: String,
    pub long_desc: String,
    pub expertise: Vec<String>,
    pub image: String,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateConsultantExpertDto {
    pub name: Option<String>,
    pub short_desc: Option<String>,
    pub long_desc: Option<String>,
    pub expertise: Option<Vec<String>>,
    pub image: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ConsultantExpertResponse {
    pub id: String,
    pub name: String,
    pub short_desc: String,
    pub long_desc: String,
    pub expertise: Vec<String>,
    pub image: String,
    pub is_active: bool,
}

impl From<ConsultantExpert> for ConsultantExpertResponse {
    fn from(expert: ConsultantExpert) -> Self {
        ConsultantExpertResponse {
            id: expert.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: expert.name,
            short_desc: expert.short_desc,
            long_desc: expert.long_desc,
            expertise: expert.expertise,
            image: expert.image,
            is_active: expert.is_active,
        }
    }
}

/// Banner shown on the consultation screen. Four slots, unique per banner.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConsultantBanner {
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
pub struct CreateConsultantBannerDto {
    pub position: i32,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    pub is_active: Option<bool>,
    pub order: Option<i32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateConsultantBannerDto {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub is_active: Option<bool>,
    pub order: Option<i32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct BannerPositionDto {
    pub position: i32,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ConsultantBannerResponse {
    pub id: String,
    pub position: i32,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    pub is_active: bool,
    pub order: i32,
}

impl From<ConsultantBanner> for ConsultantBannerResponse {
    fn from(banner: ConsultantBanner) -> Self {
        ConsultantBannerResponse {
            id: banner.id.map(|id| id.to_hex()).unwrap_or_default(),
            position: banner.position,
            title: banner.title,
            description: banner.description,
            image_url: banner.image_url,
            link_url: banner.link_url,
            is_active: banner.is_active,
            order: banner.order,
        }
    }
}
