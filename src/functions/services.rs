use crate::db::Store;
use crate::error::{SalonError, SalonResult};
use crate::models::{Service, ServiceInput};

use super::{blank_to_none, require_non_negative, require_text};

fn validate(input: ServiceInput) -> SalonResult<ServiceInput> {
    require_text("Name", &input.name)?;
    require_non_negative("Price", input.price)?;
    if input.duration_minutes <= 0 {
        return Err(SalonError::validation("Duration must be at least one minute"));
    }

    Ok(ServiceInput {
        name: input.name.trim().to_string(),
        description: blank_to_none(input.description),
        ..input
    })
}

/// Services shown on the public booking page.
pub async fn list_active_services(store: &dyn Store) -> SalonResult<Vec<Service>> {
    let services = store.list_services().await?;
    Ok(services.into_iter().filter(|s| s.active).collect())
}

pub async fn list_services(store: &dyn Store) -> SalonResult<Vec<Service>> {
    store.list_services().await
}

pub async fn get_service(store: &dyn Store, id: i32) -> SalonResult<Service> {
    store
        .get_service(id)
        .await?
        .ok_or_else(|| SalonError::not_found("Service", id))
}

pub async fn create_service(store: &dyn Store, input: ServiceInput) -> SalonResult<Service> {
    let input = validate(input)?;
    let service = store.insert_service(&input).await?;
    tracing::info!(service_id = service.id, name = %service.name, "Service created");
    Ok(service)
}

pub async fn update_service(store: &dyn Store, id: i32, input: ServiceInput) -> SalonResult<Service> {
    let input = validate(input)?;
    let service = store
        .update_service(id, &input)
        .await?
        .ok_or_else(|| SalonError::not_found("Service", id))?;
    tracing::info!(service_id = id, "Service updated");
    Ok(service)
}

pub async fn set_service_active(store: &dyn Store, id: i32, active: bool) -> SalonResult<Service> {
    let current = get_service(store, id).await?;
    let input = ServiceInput {
        active,
        ..ServiceInput::from(&current)
    };
    let service = store
        .update_service(id, &input)
        .await?
        .ok_or_else(|| SalonError::not_found("Service", id))?;
    tracing::info!(service_id = id, active, "Service visibility changed");
    Ok(service)
}

/// Appointments and recipes that still reference the service are left as they are.
pub async fn delete_service(store: &dyn Store, id: i32) -> SalonResult<()> {
    if !store.delete_service(id).await? {
        return Err(SalonError::not_found("Service", id));
    }
    tracing::info!(service_id = id, "Service deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::ServiceCategory;

    fn input(name: &str, active: bool) -> ServiceInput {
        ServiceInput {
            name: name.to_string(),
            category: ServiceCategory::Hair,
            price: 40.0,
            duration_minutes: 60,
            description: Some("  ".to_string()),
            active,
        }
    }

    #[tokio::test]
    async fn test_public_list_hides_inactive_services() {
        let store = MemoryStore::new();
        create_service(&store, input("Keratin ritual", true)).await.unwrap();
        let hidden = create_service(&store, input("Old ritual", false)).await.unwrap();

        let visible = list_active_services(&store).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Keratin ritual");

        set_service_active(&store, hidden.id, true).await.unwrap();
        assert_eq!(list_active_services(&store).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_service_validates_fields() {
        let store = MemoryStore::new();

        let mut bad = input(" ", true);
        assert!(create_service(&store, bad.clone()).await.is_err());

        bad.name = "Cut".to_string();
        bad.duration_minutes = 0;
        assert!(create_service(&store, bad).await.is_err());

        let created = create_service(&store, input("Cut", true)).await.unwrap();
        assert_eq!(created.description, None);
    }
}
