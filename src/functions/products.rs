use chrono::NaiveDate;

use crate::db::Store;
use crate::error::{SalonError, SalonResult};
use crate::models::{ExpenseCategory, ExpenseInput, Product, ProductDetails, ProductInput};

use super::{require_non_negative, require_text};

fn validate(input: ProductInput) -> SalonResult<ProductInput> {
    require_text("Name", &input.name)?;
    require_non_negative("Buy price", input.buy_price)?;
    Ok(ProductInput {
        name: input.name.trim().to_string(),
        ..input
    })
}

/// Products with their supplier's name, fetched one supplier at a time.
pub async fn list_products(store: &dyn Store) -> SalonResult<Vec<ProductDetails>> {
    let products = store.list_products().await?;
    let mut details = Vec::with_capacity(products.len());

    for product in products {
        let supplier_name = match product.supplier_id {
            Some(supplier_id) => store.get_supplier(supplier_id).await?.map(|s| s.name),
            None => None,
        };
        details.push(ProductDetails {
            product,
            supplier_name,
        });
    }

    tracing::debug!("Fetched {} products", details.len());
    Ok(details)
}

pub async fn get_product(store: &dyn Store, id: i32) -> SalonResult<Product> {
    store
        .get_product(id)
        .await?
        .ok_or_else(|| SalonError::ProductNotFound(id))
}

pub async fn list_low_stock(store: &dyn Store, threshold: i32) -> SalonResult<Vec<Product>> {
    let products = store.list_products().await?;
    Ok(products
        .into_iter()
        .filter(|p| p.stock_quantity <= threshold)
        .collect())
}

pub async fn create_product(store: &dyn Store, input: ProductInput) -> SalonResult<Product> {
    let input = validate(input)?;
    let product = store.insert_product(&input).await?;
    tracing::info!(product_id = product.id, name = %product.name, "Product created");
    Ok(product)
}

/// Overwrite a product, including its absolute stock quantity.
///
/// Raising the quantity is treated as a purchase: a `stock` expense worth
/// `(new - old) * buy_price` is logged against the product and its supplier. Lowering it
/// logs nothing.
pub async fn update_product(
    store: &dyn Store,
    id: i32,
    input: ProductInput,
    today: NaiveDate,
) -> SalonResult<Product> {
    let input = validate(input)?;
    let previous = get_product(store, id).await?;
    let added = input
        .stock_quantity
        .checked_sub(previous.stock_quantity)
        .ok_or_else(|| SalonError::validation("Stock quantity out of range"))?;

    let product = store
        .update_product(id, &input)
        .await?
        .ok_or_else(|| SalonError::ProductNotFound(id))?;
    tracing::info!(product_id = id, "Product updated");

    if added > 0 {
        let expense = store
            .insert_expense(&ExpenseInput {
                description: format!("Restock: {} x{}", product.name, added),
                amount: f64::from(added) * product.buy_price,
                category: ExpenseCategory::Stock,
                date: today,
                supplier_id: product.supplier_id,
                product_id: Some(product.id),
            })
            .await?;
        tracing::info!(
            product_id = id,
            expense_id = expense.id,
            amount = expense.amount,
            "Logged restock expense"
        );
    }

    Ok(product)
}

/// Recipes, appointments and receipts referencing the product are left untouched.
pub async fn delete_product(store: &dyn Store, id: i32) -> SalonResult<()> {
    if !store.delete_product(id).await? {
        return Err(SalonError::ProductNotFound(id));
    }
    tracing::info!(product_id = id, "Product deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::SupplierInput;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
    }

    async fn seed(store: &MemoryStore) -> Product {
        let supplier = store
            .insert_supplier(&SupplierInput {
                name: "Cosmetica".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        create_product(
            store,
            ProductInput {
                name: "Hair mask".to_string(),
                stock_quantity: 3,
                buy_price: 7.5,
                supplier_id: Some(supplier.id),
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_restock_logs_expense() {
        let store = MemoryStore::new();
        let product = seed(&store).await;

        let mut input = ProductInput::from(&product);
        input.stock_quantity = 7;
        update_product(&store, product.id, input, today()).await.unwrap();

        let expenses = store.list_expenses().await.unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].category, ExpenseCategory::Stock);
        assert_eq!(expenses[0].amount, 30.0);
        assert_eq!(expenses[0].product_id, Some(product.id));
        assert_eq!(expenses[0].supplier_id, product.supplier_id);
        assert_eq!(expenses[0].date, today());
    }

    #[tokio::test]
    async fn test_lowering_stock_logs_nothing() {
        let store = MemoryStore::new();
        let product = seed(&store).await;

        let mut input = ProductInput::from(&product);
        input.stock_quantity = 1;
        let updated = update_product(&store, product.id, input, today()).await.unwrap();

        assert_eq!(updated.stock_quantity, 1);
        assert!(store.list_expenses().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_restock_out_of_range_is_rejected() {
        let store = MemoryStore::new();
        let product = seed(&store).await;
        store.set_product_stock(product.id, -10).await.unwrap();

        let mut input = ProductInput::from(&product);
        input.stock_quantity = i32::MAX;
        let err = update_product(&store, product.id, input, today()).await.unwrap_err();

        assert!(matches!(err, SalonError::Validation(_)));
        assert_eq!(get_product(&store, product.id).await.unwrap().stock_quantity, -10);
        assert!(store.list_expenses().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_products_joins_supplier_name() {
        let store = MemoryStore::new();
        seed(&store).await;

        let products = list_products(&store).await.unwrap();
        assert_eq!(products[0].supplier_name.as_deref(), Some("Cosmetica"));

        assert_eq!(list_low_stock(&store, 5).await.unwrap().len(), 1);
        assert!(list_low_stock(&store, 2).await.unwrap().is_empty());
    }
}
