use chrono::NaiveDate;

use crate::db::Store;
use crate::error::{SalonError, SalonResult};
use crate::models::{BusinessExpense, ExpenseInput};

use super::{require_non_negative, require_text};

fn validate(input: ExpenseInput) -> SalonResult<ExpenseInput> {
    require_text("Description", &input.description)?;
    require_non_negative("Amount", input.amount)?;
    Ok(ExpenseInput {
        description: input.description.trim().to_string(),
        ..input
    })
}

/// Expenses newest first, optionally limited to an inclusive `from..=to` range.
pub async fn list_expenses(
    store: &dyn Store,
    range: Option<(NaiveDate, NaiveDate)>,
) -> SalonResult<Vec<BusinessExpense>> {
    let expenses = store.list_expenses().await?;
    Ok(match range {
        Some((from, to)) => expenses
            .into_iter()
            .filter(|e| e.date >= from && e.date <= to)
            .collect(),
        None => expenses,
    })
}

pub async fn get_expense(store: &dyn Store, id: i32) -> SalonResult<BusinessExpense> {
    store
        .get_expense(id)
        .await?
        .ok_or_else(|| SalonError::not_found("Expense", id))
}

pub async fn create_expense(store: &dyn Store, input: ExpenseInput) -> SalonResult<BusinessExpense> {
    let input = validate(input)?;
    let expense = store.insert_expense(&input).await?;
    tracing::info!(
        expense_id = expense.id,
        category = %expense.category,
        amount = expense.amount,
        "Expense recorded"
    );
    Ok(expense)
}

pub async fn update_expense(
    store: &dyn Store,
    id: i32,
    input: ExpenseInput,
) -> SalonResult<BusinessExpense> {
    let input = validate(input)?;
    let expense = store
        .update_expense(id, &input)
        .await?
        .ok_or_else(|| SalonError::not_found("Expense", id))?;
    tracing::info!(expense_id = id, "Expense updated");
    Ok(expense)
}

pub async fn delete_expense(store: &dyn Store, id: i32) -> SalonResult<()> {
    if !store.delete_expense(id).await? {
        return Err(SalonError::not_found("Expense", id));
    }
    tracing::info!(expense_id = id, "Expense deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::ExpenseCategory;

    fn expense(description: &str, day: u32) -> ExpenseInput {
        ExpenseInput {
            description: description.to_string(),
            amount: 120.0,
            category: ExpenseCategory::Rent,
            date: NaiveDate::from_ymd_opt(2024, 4, day).unwrap(),
            supplier_id: None,
            product_id: None,
        }
    }

    #[tokio::test]
    async fn test_list_expenses_in_range() {
        let store = MemoryStore::new();
        create_expense(&store, expense("Rent", 1)).await.unwrap();
        create_expense(&store, expense("Electricity", 15)).await.unwrap();
        create_expense(&store, expense("Water", 30)).await.unwrap();

        let from = NaiveDate::from_ymd_opt(2024, 4, 10).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 4, 30).unwrap();
        let listed = list_expenses(&store, Some((from, to))).await.unwrap();

        let descriptions: Vec<&str> = listed.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Water", "Electricity"]);
        assert_eq!(list_expenses(&store, None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_negative_amount_rejected() {
        let store = MemoryStore::new();
        let mut input = expense("Refund", 2);
        input.amount = -5.0;
        assert!(matches!(
            create_expense(&store, input).await,
            Err(SalonError::Validation(_))
        ));
    }
}
