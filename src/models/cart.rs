use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use rocket_okapi::okapi::schemars::JsonSchema;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CartItem {
    pub service_id: ObjectId,
    pub quantity: i32,
}

/// One cart document per user.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Cart {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub items: Vec<CartItem>,
    pub updated_at: DateTime,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CartItemDto {
    pub service_id: String,
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CartQuantityDto {
    pub service_id: String,
    pub amount: Option<i32>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct CartItemResponse {
    pub service_id: String,
    pub quantity: i32,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct CartResponse {
    pub id: Option<String>,
    pub items: Vec<CartItemResponse>,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        CartResponse {
            id: cart.id.map(|id| id.to_hex()),
            items: cart
                .items
                .into_iter()
                .map(|item| CartItemResponse {
                    service_id: item.service_id.to_hex(),
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}
