use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::config::Config;
use crate::db::Store;
use crate::error::{SalonError, SalonResult};
use crate::models::{
    Appointment, AppointmentDetails, AppointmentPatch, AppointmentStatus, BookingRequest,
    ClientInput, NewAppointment,
};

use super::{blank_to_none, clients, parse_time};

/// A bookable start time and whether someone already holds it.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub time: String,
    pub booked: bool,
}

fn normalize_time(value: &str) -> SalonResult<String> {
    Ok(parse_time(value)?.format("%H:%M").to_string())
}

fn require_services(service_ids: &[i32]) -> SalonResult<()> {
    if service_ids.is_empty() {
        return Err(SalonError::validation("Select at least one service"));
    }
    Ok(())
}

async fn with_details(store: &dyn Store, appointment: Appointment) -> SalonResult<AppointmentDetails> {
    let client = store.get_client(appointment.client_id).await?;
    let mut services = Vec::with_capacity(appointment.service_ids.len());
    for service_id in &appointment.service_ids {
        if let Some(service) = store.get_service(*service_id).await? {
            services.push(service);
        }
    }

    Ok(AppointmentDetails {
        appointment,
        client,
        services,
    })
}

/// Public booking.
///
/// The client is matched on phone number: an existing record is reused exactly as stored,
/// otherwise a new one is created from the submitted details. The appointment starts `pending`.
/// Overlapping bookings are accepted.
pub async fn create_appointment(store: &dyn Store, request: BookingRequest) -> SalonResult<Appointment> {
    require_services(&request.service_ids)?;
    let time = normalize_time(&request.time)?;
    let details = clients::validate(ClientInput {
        name: request.name,
        phone: request.phone,
        email: request.email,
        instagram: request.instagram,
        notes: None,
    })?;

    let client = match store.find_client_by_phone(&details.phone).await? {
        Some(client) => {
            tracing::debug!(client_id = client.id, "Booking matched an existing client");
            client
        }
        None => {
            let client = store.insert_client(&details).await?;
            tracing::info!(client_id = client.id, "Client created from booking");
            client
        }
    };

    let appointment = store
        .insert_appointment(&NewAppointment {
            client_id: client.id,
            service_ids: request.service_ids,
            date: request.date,
            time,
            status: AppointmentStatus::Pending,
            notes: None,
            message: blank_to_none(request.message),
        })
        .await?;

    tracing::info!(
        appointment_id = appointment.id,
        client_id = client.id,
        date = %appointment.date,
        time = %appointment.time,
        "Appointment booked"
    );
    Ok(appointment)
}

/// Back-office booking for a client that already exists.
pub async fn create_admin_appointment(
    store: &dyn Store,
    appointment: NewAppointment,
) -> SalonResult<Appointment> {
    require_services(&appointment.service_ids)?;
    let time = normalize_time(&appointment.time)?;
    clients::get_client(store, appointment.client_id).await?;

    let appointment = store
        .insert_appointment(&NewAppointment {
            time,
            notes: blank_to_none(appointment.notes),
            message: blank_to_none(appointment.message),
            ..appointment
        })
        .await?;
    tracing::info!(
        appointment_id = appointment.id,
        status = %appointment.status,
        "Appointment created"
    );
    Ok(appointment)
}

/// Every appointment with its client and services, newest first.
pub async fn list_appointments(store: &dyn Store) -> SalonResult<Vec<AppointmentDetails>> {
    let appointments = store.list_appointments().await?;
    let mut details = Vec::with_capacity(appointments.len());
    for appointment in appointments {
        details.push(with_details(store, appointment).await?);
    }
    tracing::debug!("Fetched {} appointments", details.len());
    Ok(details)
}

pub async fn list_appointments_by_date(
    store: &dyn Store,
    date: NaiveDate,
) -> SalonResult<Vec<AppointmentDetails>> {
    let appointments = store.list_appointments_on(date).await?;
    let mut details = Vec::with_capacity(appointments.len());
    for appointment in appointments {
        details.push(with_details(store, appointment).await?);
    }
    Ok(details)
}

pub async fn get_appointment(store: &dyn Store, id: i32) -> SalonResult<AppointmentDetails> {
    let appointment = store
        .get_appointment(id)
        .await?
        .ok_or(SalonError::AppointmentNotFound(id))?;
    with_details(store, appointment).await
}

pub async fn update_appointment(
    store: &dyn Store,
    id: i32,
    patch: AppointmentPatch,
) -> SalonResult<Appointment> {
    if let Some(service_ids) = &patch.service_ids {
        require_services(service_ids)?;
    }
    let time = patch.time.as_deref().map(normalize_time).transpose()?;

    let appointment = store
        .patch_appointment(id, &AppointmentPatch { time, ..patch })
        .await?
        .ok_or(SalonError::AppointmentNotFound(id))?;
    tracing::info!(appointment_id = id, "Appointment updated");
    Ok(appointment)
}

/// Any status can be set from any other; transitions are not checked.
pub async fn set_appointment_status(
    store: &dyn Store,
    id: i32,
    status: AppointmentStatus,
) -> SalonResult<Appointment> {
    let patch = AppointmentPatch {
        status: Some(status),
        ..Default::default()
    };
    let appointment = store
        .patch_appointment(id, &patch)
        .await?
        .ok_or(SalonError::AppointmentNotFound(id))?;
    tracing::info!(appointment_id = id, status = %status, "Appointment status changed");
    Ok(appointment)
}

/// A consultation written for the appointment keeps pointing at it.
pub async fn delete_appointment(store: &dyn Store, id: i32) -> SalonResult<()> {
    if !store.delete_appointment(id).await? {
        return Err(SalonError::AppointmentNotFound(id));
    }
    tracing::info!(appointment_id = id, "Appointment deleted");
    Ok(())
}

/// Start times already held on `date` by appointments that are not cancelled.
pub async fn booked_times(store: &dyn Store, date: NaiveDate) -> SalonResult<Vec<String>> {
    let mut times: Vec<String> = store
        .list_appointments_on(date)
        .await?
        .into_iter()
        .filter(|a| a.status != AppointmentStatus::Cancelled)
        .map(|a| a.time)
        .collect();
    times.sort();
    times.dedup();
    Ok(times)
}

/// The day's grid of start times, from opening time up to (excluding) closing time.
///
/// Booked slots are flagged for display only; booking one is still allowed.
pub async fn available_slots(
    store: &dyn Store,
    config: &Config,
    date: NaiveDate,
) -> SalonResult<Vec<TimeSlot>> {
    let opening = parse_time(&config.opening_time)?;
    let closing = parse_time(&config.closing_time)?;
    if config.slot_minutes == 0 {
        return Err(SalonError::validation("Slot length must be at least one minute"));
    }
    let step = Duration::minutes(i64::from(config.slot_minutes));
    let booked = booked_times(store, date).await?;

    let mut slots = Vec::new();
    let mut current = opening;
    while current < closing {
        let time = current.format("%H:%M").to_string();
        slots.push(TimeSlot {
            booked: booked.contains(&time),
            time,
        });

        let (next, wrapped) = current.overflowing_add_signed(step);
        if wrapped != 0 {
            break;
        }
        current = next;
    }

    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn booking(phone: &str, time: &str) -> BookingRequest {
        BookingRequest {
            service_ids: vec![1],
            date: date(),
            time: time.to_string(),
            name: "Lina".to_string(),
            phone: phone.to_string(),
            email: None,
            instagram: Some("@lina".to_string()),
            message: Some("First visit".to_string()),
        }
    }

    #[tokio::test]
    async fn test_booking_reuses_client_with_same_phone() {
        let store = MemoryStore::new();
        let existing = store
            .insert_client(&ClientInput {
                name: "Lina B.".to_string(),
                phone: "0550000000".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let appointment = create_appointment(&store, booking("0550000000", "10:00"))
            .await
            .unwrap();

        assert_eq!(appointment.client_id, existing.id);
        assert_eq!(appointment.status, AppointmentStatus::Pending);
        assert_eq!(appointment.message.as_deref(), Some("First visit"));

        let clients = store.list_clients().await.unwrap();
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].name, "Lina B.");
    }

    #[tokio::test]
    async fn test_booking_creates_client_for_new_phone() {
        let store = MemoryStore::new();
        let appointment = create_appointment(&store, booking("0770000000", "9:30"))
            .await
            .unwrap();

        assert_eq!(appointment.time, "09:30");
        let client = store.get_client(appointment.client_id).await.unwrap().unwrap();
        assert_eq!(client.instagram.as_deref(), Some("@lina"));
    }

    #[tokio::test]
    async fn test_booking_requires_a_service() {
        let store = MemoryStore::new();
        let mut request = booking("0550000000", "10:00");
        request.service_ids.clear();

        assert!(create_appointment(&store, request).await.is_err());
        assert!(store.list_clients().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_booked_times_skip_cancelled() {
        let store = MemoryStore::new();
        create_appointment(&store, booking("1", "10:00")).await.unwrap();
        let cancelled = create_appointment(&store, booking("2", "11:00")).await.unwrap();
        create_appointment(&store, booking("3", "10:00")).await.unwrap();

        set_appointment_status(&store, cancelled.id, AppointmentStatus::Cancelled)
            .await
            .unwrap();

        assert_eq!(booked_times(&store, date()).await.unwrap(), vec!["10:00"]);
    }

    #[tokio::test]
    async fn test_available_slots_flag_booked_times() {
        let store = MemoryStore::new();
        create_appointment(&store, booking("1", "10:00")).await.unwrap();

        let config = Config {
            opening_time: "09:00".to_string(),
            closing_time: "11:00".to_string(),
            slot_minutes: 30,
            ..Config::default()
        };
        let slots = available_slots(&store, &config, date()).await.unwrap();

        let times: Vec<&str> = slots.iter().map(|s| s.time.as_str()).collect();
        assert_eq!(times, vec!["09:00", "09:30", "10:00", "10:30"]);
        assert!(slots[2].booked);
        assert!(!slots[0].booked);
    }

    #[tokio::test]
    async fn test_admin_appointment_needs_existing_client() {
        let store = MemoryStore::new();
        let new = NewAppointment {
            client_id: 99,
            service_ids: vec![1],
            date: date(),
            time: "10:00".to_string(),
            status: AppointmentStatus::Confirmed,
            notes: None,
            message: None,
        };
        let err = create_admin_appointment(&store, new).await.unwrap_err();
        assert!(matches!(err, SalonError::NotFound { entity: "Client", id: 99 }));
    }

    #[tokio::test]
    async fn test_update_missing_appointment() {
        let store = MemoryStore::new();
        let err = update_appointment(&store, 7, AppointmentPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SalonError::AppointmentNotFound(7)));
    }
}
