use crate::db::Store;
use crate::error::{SalonError, SalonResult};
use crate::models::{Supplier, SupplierInput};

use super::{blank_to_none, require_text};

fn validate(input: SupplierInput) -> SalonResult<SupplierInput> {
    require_text("Name", &input.name)?;
    Ok(SupplierInput {
        name: input.name.trim().to_string(),
        phone: blank_to_none(input.phone),
        email: blank_to_none(input.email),
        notes: blank_to_none(input.notes),
    })
}

pub async fn list_suppliers(store: &dyn Store) -> SalonResult<Vec<Supplier>> {
    store.list_suppliers().await
}

pub async fn get_supplier(store: &dyn Store, id: i32) -> SalonResult<Supplier> {
    store
        .get_supplier(id)
        .await?
        .ok_or_else(|| SalonError::not_found("Supplier", id))
}

pub async fn create_supplier(store: &dyn Store, input: SupplierInput) -> SalonResult<Supplier> {
    let input = validate(input)?;
    let supplier = store.insert_supplier(&input).await?;
    tracing::info!(supplier_id = supplier.id, "Supplier created");
    Ok(supplier)
}

pub async fn update_supplier(
    store: &dyn Store,
    id: i32,
    input: SupplierInput,
) -> SalonResult<Supplier> {
    let input = validate(input)?;
    let supplier = store
        .update_supplier(id, &input)
        .await?
        .ok_or_else(|| SalonError::not_found("Supplier", id))?;
    tracing::info!(supplier_id = id, "Supplier updated");
    Ok(supplier)
}

/// Products pointing at the supplier keep their (now dangling) reference.
pub async fn delete_supplier(store: &dyn Store, id: i32) -> SalonResult<()> {
    if !store.delete_supplier(id).await? {
        return Err(SalonError::not_found("Supplier", id));
    }
    tracing::info!(supplier_id = id, "Supplier deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::ProductInput;

    #[tokio::test]
    async fn test_delete_supplier_referenced_by_product() {
        let store = MemoryStore::new();
        let supplier = create_supplier(
            &store,
            SupplierInput {
                name: "Beauty Wholesale".to_string(),
                phone: Some("021 000 000".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let product = store
            .insert_product(&ProductInput {
                name: "Argan oil".to_string(),
                stock_quantity: 4,
                buy_price: 12.0,
                supplier_id: Some(supplier.id),
            })
            .await
            .unwrap();

        delete_supplier(&store, supplier.id).await.unwrap();

        let product = store.get_product(product.id).await.unwrap().unwrap();
        assert_eq!(product.supplier_id, Some(supplier.id));
        assert!(get_supplier(&store, supplier.id).await.is_err());
    }
}
