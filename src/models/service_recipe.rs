use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How much of a product one service normally consumes.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecipe {
    pub id: i32,
    pub service_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewServiceRecipe {
    pub service_id: i32,
    pub product_id: i32,
    pub quantity: i32,
}
