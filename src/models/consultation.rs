use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Appointment, Client, ParseEnumError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::Transfer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Transfer => "transfer",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            PaymentMethod::Cash => PaymentMethod::Card,
            PaymentMethod::Card => PaymentMethod::Transfer,
            PaymentMethod::Transfer => PaymentMethod::Cash,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError {
                kind: "payment method",
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for PaymentMethod {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One product consumed during a consultation.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProductLine {
    pub product_id: i32,
    pub quantity: i32,
}

/// The receipt written when an appointment is completed.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Consultation {
    pub id: i32,
    pub appointment_id: i32,
    pub client_id: i32,
    #[sqlx(skip)]
    pub products: Vec<ProductLine>,
    pub amount: f64,
    #[sqlx(try_from = "String")]
    pub payment_method: PaymentMethod,
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewConsultation {
    pub appointment_id: i32,
    pub client_id: i32,
    pub products: Vec<ProductLine>,
    pub amount: f64,
    pub payment_method: PaymentMethod,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

/// Input of the completion workflow.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CompleteAppointment {
    /// Taken from the URL path over HTTP.
    #[serde(default)]
    pub appointment_id: i32,
    #[serde(default)]
    pub products: Vec<ProductLine>,
    pub amount: f64,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub next_date: Option<NaiveDate>,
    #[serde(default)]
    pub next_time: Option<String>,
    #[serde(default)]
    pub next_service_ids: Option<Vec<i32>>,
    /// Replaces the appointment's service list when present.
    #[serde(default)]
    pub service_ids: Option<Vec<i32>>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationDetails {
    #[serde(flatten)]
    pub consultation: Consultation,
    pub client: Option<Client>,
    pub appointment: Option<Appointment>,
}
