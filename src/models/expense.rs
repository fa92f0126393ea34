use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ParseEnumError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Stock,
    Rent,
    Salary,
    Utilities,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 5] = [
        ExpenseCategory::Stock,
        ExpenseCategory::Rent,
        ExpenseCategory::Salary,
        ExpenseCategory::Utilities,
        ExpenseCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Stock => "stock",
            ExpenseCategory::Rent => "rent",
            ExpenseCategory::Salary => "salary",
            ExpenseCategory::Utilities => "utilities",
            ExpenseCategory::Other => "other",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseCategory {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError {
                kind: "expense category",
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for ExpenseCategory {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BusinessExpense {
    pub id: i32,
    pub description: String,
    pub amount: f64,
    #[sqlx(try_from = "String")]
    pub category: ExpenseCategory,
    pub date: NaiveDate,
    pub supplier_id: Option<i32>,
    pub product_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseInput {
    pub description: String,
    pub amount: f64,
    pub category: ExpenseCategory,
    pub date: NaiveDate,
    #[serde(default)]
    pub supplier_id: Option<i32>,
    #[serde(default)]
    pub product_id: Option<i32>,
}

impl From<&BusinessExpense> for ExpenseInput {
    fn from(expense: &BusinessExpense) -> Self {
        Self {
            description: expense.description.clone(),
            amount: expense.amount,
            category: expense.category,
            date: expense.date,
            supplier_id: expense.supplier_id,
            product_id: expense.product_id,
        }
    }
}
