use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ParseEnumError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceCategory {
    Hair,
    Face,
    Body,
    Nails,
}

impl ServiceCategory {
    pub const ALL: [ServiceCategory; 4] = [
        ServiceCategory::Hair,
        ServiceCategory::Face,
        ServiceCategory::Body,
        ServiceCategory::Nails,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceCategory::Hair => "hair",
            ServiceCategory::Face => "face",
            ServiceCategory::Body => "body",
            ServiceCategory::Nails => "nails",
        }
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceCategory {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError {
                kind: "service category",
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for ServiceCategory {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A priced treatment ("ritual") offered to clients.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: i32,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub category: ServiceCategory,
    pub price: f64,
    pub duration_minutes: i32,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInput {
    pub name: String,
    pub category: ServiceCategory,
    pub price: f64,
    pub duration_minutes: i32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl From<&Service> for ServiceInput {
    fn from(service: &Service) -> Self {
        Self {
            name: service.name.clone(),
            category: service.category,
            price: service.price,
            duration_minutes: service.duration_minutes,
            description: service.description.clone(),
            active: service.active,
        }
    }
}
