use crate::db::Store;
use crate::error::{SalonError, SalonResult};
use crate::models::{Appointment, Client, ClientInput};

use super::{blank_to_none, require_text};

pub(crate) fn validate(input: ClientInput) -> SalonResult<ClientInput> {
    require_text("Name", &input.name)?;
    require_text("Phone", &input.phone)?;
    Ok(ClientInput {
        name: input.name.trim().to_string(),
        phone: input.phone.trim().to_string(),
        email: blank_to_none(input.email),
        instagram: blank_to_none(input.instagram),
        notes: blank_to_none(input.notes),
    })
}

pub async fn list_clients(store: &dyn Store) -> SalonResult<Vec<Client>> {
    store.list_clients().await
}

/// Case-insensitive substring match on name or phone. An empty query returns everyone.
pub async fn search_clients(store: &dyn Store, query: &str) -> SalonResult<Vec<Client>> {
    let needle = query.trim().to_lowercase();
    let clients = store.list_clients().await?;
    if needle.is_empty() {
        return Ok(clients);
    }

    Ok(clients
        .into_iter()
        .filter(|c| c.name.to_lowercase().contains(&needle) || c.phone.contains(&needle))
        .collect())
}

pub async fn get_client(store: &dyn Store, id: i32) -> SalonResult<Client> {
    store
        .get_client(id)
        .await?
        .ok_or_else(|| SalonError::not_found("Client", id))
}

pub async fn create_client(store: &dyn Store, input: ClientInput) -> SalonResult<Client> {
    let input = validate(input)?;
    let client = store.insert_client(&input).await?;
    tracing::info!(client_id = client.id, "Client created");
    Ok(client)
}

pub async fn update_client(store: &dyn Store, id: i32, input: ClientInput) -> SalonResult<Client> {
    let input = validate(input)?;
    let client = store
        .update_client(id, &input)
        .await?
        .ok_or_else(|| SalonError::not_found("Client", id))?;
    tracing::info!(client_id = id, "Client updated");
    Ok(client)
}

/// Deletes the client record only; their appointments and receipts stay behind.
pub async fn delete_client(store: &dyn Store, id: i32) -> SalonResult<()> {
    if !store.delete_client(id).await? {
        return Err(SalonError::not_found("Client", id));
    }
    tracing::info!(client_id = id, "Client deleted");
    Ok(())
}

/// The client's appointments, newest first.
pub async fn client_history(store: &dyn Store, id: i32) -> SalonResult<Vec<Appointment>> {
    let appointments = store.list_appointments().await?;
    Ok(appointments
        .into_iter()
        .filter(|a| a.client_id == id)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::functions::appointments;
    use crate::models::BookingRequest;
    use chrono::NaiveDate;

    fn input(name: &str, phone: &str) -> ClientInput {
        ClientInput {
            name: name.to_string(),
            phone: phone.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_search_matches_name_or_phone() {
        let store = MemoryStore::new();
        create_client(&store, input("Amina Belkacem", "0550000000")).await.unwrap();
        create_client(&store, input("Sara Haddad", "0661112233")).await.unwrap();

        assert_eq!(search_clients(&store, "amina").await.unwrap().len(), 1);
        assert_eq!(search_clients(&store, "0661").await.unwrap()[0].name, "Sara Haddad");
        assert_eq!(search_clients(&store, "  ").await.unwrap().len(), 2);
        assert!(search_clients(&store, "zzz").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_client_requires_phone() {
        let store = MemoryStore::new();
        let err = create_client(&store, input("No Phone", " ")).await.unwrap_err();
        assert!(matches!(err, SalonError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_missing_client() {
        let store = MemoryStore::new();
        let err = update_client(&store, 42, input("Ghost", "1")).await.unwrap_err();
        assert!(matches!(err, SalonError::NotFound { id: 42, .. }));
    }

    #[tokio::test]
    async fn test_delete_client_keeps_appointments() {
        let store = MemoryStore::new();
        let booked = appointments::create_appointment(
            &store,
            BookingRequest {
                service_ids: vec![1],
                date: NaiveDate::from_ymd_opt(2030, 5, 2).unwrap(),
                time: "10:30".to_string(),
                name: "Lina".to_string(),
                phone: "0770000001".to_string(),
                email: None,
                instagram: None,
                message: None,
            },
        )
        .await
        .unwrap();

        delete_client(&store, booked.client_id).await.unwrap();
        assert!(store.get_client(booked.client_id).await.unwrap().is_none());

        let details = appointments::get_appointment(&store, booked.id).await.unwrap();
        assert_eq!(details.appointment.client_id, booked.client_id);
        assert!(details.client.is_none());
        assert_eq!(client_history(&store, booked.client_id).await.unwrap().len(), 1);

        appointments::delete_appointment(&store, booked.id).await.unwrap();
        assert!(store.get_appointment(booked.id).await.unwrap().is_none());
    }
}
