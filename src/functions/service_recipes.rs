use std::collections::BTreeMap;

use crate::db::Store;
use crate::error::{SalonError, SalonResult};
use crate::models::{NewServiceRecipe, ProductLine, ServiceRecipe};

pub async fn list_recipes(store: &dyn Store) -> SalonResult<Vec<ServiceRecipe>> {
    store.list_recipes().await
}

pub async fn list_recipes_for_service(
    store: &dyn Store,
    service_id: i32,
) -> SalonResult<Vec<ServiceRecipe>> {
    let recipes = store.list_recipes().await?;
    Ok(recipes
        .into_iter()
        .filter(|r| r.service_id == service_id)
        .collect())
}

pub async fn add_recipe(store: &dyn Store, recipe: NewServiceRecipe) -> SalonResult<ServiceRecipe> {
    if recipe.quantity <= 0 {
        return Err(SalonError::validation("Quantity must be at least 1"));
    }
    let recipe = store.insert_recipe(&recipe).await?;
    tracing::info!(
        recipe_id = recipe.id,
        service_id = recipe.service_id,
        product_id = recipe.product_id,
        "Recipe line added"
    );
    Ok(recipe)
}

pub async fn delete_recipe(store: &dyn Store, id: i32) -> SalonResult<()> {
    if !store.delete_recipe(id).await? {
        return Err(SalonError::not_found("Recipe", id));
    }
    tracing::info!(recipe_id = id, "Recipe line deleted");
    Ok(())
}

/// Product lines a set of services normally consumes, summed per product.
///
/// A service listed twice counts twice. Lines come back ordered by product id.
pub async fn suggested_products(
    store: &dyn Store,
    service_ids: &[i32],
) -> SalonResult<Vec<ProductLine>> {
    let recipes = store.list_recipes().await?;
    let mut totals: BTreeMap<i32, i32> = BTreeMap::new();

    for service_id in service_ids {
        for recipe in recipes.iter().filter(|r| r.service_id == *service_id) {
            *totals.entry(recipe.product_id).or_insert(0) += recipe.quantity;
        }
    }

    Ok(totals
        .into_iter()
        .map(|(product_id, quantity)| ProductLine {
            product_id,
            quantity,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn line(service_id: i32, product_id: i32, quantity: i32) -> NewServiceRecipe {
        NewServiceRecipe {
            service_id,
            product_id,
            quantity,
        }
    }

    #[tokio::test]
    async fn test_suggested_products_sums_per_product() {
        let store = MemoryStore::new();
        add_recipe(&store, line(1, 10, 2)).await.unwrap();
        add_recipe(&store, line(1, 11, 1)).await.unwrap();
        add_recipe(&store, line(2, 10, 3)).await.unwrap();
        add_recipe(&store, line(3, 12, 1)).await.unwrap();

        let lines = suggested_products(&store, &[1, 2]).await.unwrap();
        assert_eq!(
            lines,
            vec![
                ProductLine { product_id: 10, quantity: 5 },
                ProductLine { product_id: 11, quantity: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn test_add_recipe_rejects_zero_quantity() {
        let store = MemoryStore::new();
        assert!(add_recipe(&store, line(1, 10, 0)).await.is_err());
        assert!(list_recipes_for_service(&store, 1).await.unwrap().is_empty());
    }
}
