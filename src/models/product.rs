use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A consumable kept in stock. `stock_quantity` is signed: completions never floor it at zero.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub stock_quantity: i32,
    pub buy_price: f64,
    pub supplier_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub stock_quantity: i32,
    pub buy_price: f64,
    #[serde(default)]
    pub supplier_id: Option<i32>,
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            stock_quantity: product.stock_quantity,
            buy_price: product.buy_price,
            supplier_id: product.supplier_id,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetails {
    #[serde(flatten)]
    pub product: Product,
    pub supplier_name: Option<String>,
}
