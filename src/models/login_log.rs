use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// One document per login attempt, written after the OTP dispatch at login.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoginLog {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub ip: Option<String>,
    pub login_time: DateTime,
}
