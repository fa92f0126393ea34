use chrono::NaiveDate;
use serde::Serialize;

use crate::db::Store;
use crate::error::{SalonError, SalonResult};
use crate::models::{
    Appointment, AppointmentPatch, AppointmentStatus, CompleteAppointment, Consultation,
    ConsultationDetails, NewAppointment, NewConsultation,
};

use super::{blank_to_none, parse_time, require_non_negative};

/// What completing an appointment wrote.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOutcome {
    pub consultation: Consultation,
    pub appointment: Appointment,
    pub next_appointment: Option<Appointment>,
}

fn validate(input: &CompleteAppointment) -> SalonResult<()> {
    require_non_negative("Amount", input.amount)?;
    if input.products.iter().any(|line| line.quantity <= 0) {
        return Err(SalonError::validation("Product quantities must be at least 1"));
    }
    if let Some(time) = &input.next_time {
        parse_time(time)?;
    }
    if matches!(&input.service_ids, Some(ids) if ids.is_empty()) {
        return Err(SalonError::validation("Select at least one service"));
    }
    Ok(())
}

/// Close out an appointment.
///
/// Deducts each product line from stock, writes the receipt, marks the appointment
/// completed and, when both a next date and time are given, books the follow-up as
/// `confirmed` for the same client. Each write lands as it happens; a failure part way
/// through leaves the earlier writes in place, and calling this twice deducts twice.
pub async fn complete_appointment(
    store: &dyn Store,
    input: CompleteAppointment,
    today: NaiveDate,
) -> SalonResult<CompletionOutcome> {
    validate(&input)?;

    let appointment = store
        .get_appointment(input.appointment_id)
        .await?
        .ok_or(SalonError::AppointmentNotFound(input.appointment_id))?;

    for line in &input.products {
        let product = store
            .get_product(line.product_id)
            .await?
            .ok_or(SalonError::ProductNotFound(line.product_id))?;

        let remaining = product
            .stock_quantity
            .checked_sub(line.quantity)
            .ok_or_else(|| SalonError::validation("Stock quantity out of range"))?;
        store.set_product_stock(product.id, remaining).await?;
        if remaining < 0 {
            tracing::warn!(
                product_id = product.id,
                stock_quantity = remaining,
                "Stock went negative"
            );
        }
    }

    let notes = blank_to_none(input.notes);
    let consultation = store
        .insert_consultation(&NewConsultation {
            appointment_id: appointment.id,
            client_id: appointment.client_id,
            products: input.products,
            amount: input.amount,
            payment_method: input.payment_method,
            date: today,
            notes: notes.clone(),
        })
        .await?;

    let current_services = input
        .service_ids
        .clone()
        .unwrap_or_else(|| appointment.service_ids.clone());
    let completed = store
        .patch_appointment(
            appointment.id,
            &AppointmentPatch {
                status: Some(AppointmentStatus::Completed),
                service_ids: input.service_ids,
                notes,
                ..Default::default()
            },
        )
        .await?
        .ok_or(SalonError::AppointmentNotFound(appointment.id))?;

    let next_appointment = match (input.next_date, input.next_time) {
        (Some(date), Some(time)) => {
            let service_ids = input
                .next_service_ids
                .filter(|ids| !ids.is_empty())
                .unwrap_or(current_services);
            let next = store
                .insert_appointment(&NewAppointment {
                    client_id: appointment.client_id,
                    service_ids,
                    date,
                    time: parse_time(&time)?.format("%H:%M").to_string(),
                    status: AppointmentStatus::Confirmed,
                    notes: None,
                    message: None,
                })
                .await?;
            tracing::info!(
                appointment_id = next.id,
                client_id = next.client_id,
                "Follow-up appointment booked"
            );
            Some(next)
        }
        _ => None,
    };

    tracing::info!(
        appointment_id = appointment.id,
        consultation_id = consultation.id,
        amount = consultation.amount,
        payment_method = %consultation.payment_method,
        "Appointment completed"
    );

    Ok(CompletionOutcome {
        consultation,
        appointment: completed,
        next_appointment,
    })
}

async fn with_details(store: &dyn Store, consultation: Consultation) -> SalonResult<ConsultationDetails> {
    let client = store.get_client(consultation.client_id).await?;
    let appointment = store.get_appointment(consultation.appointment_id).await?;
    Ok(ConsultationDetails {
        consultation,
        client,
        appointment,
    })
}

/// Receipts, newest first, each joined with its client and appointment.
pub async fn list_consultations(store: &dyn Store) -> SalonResult<Vec<ConsultationDetails>> {
    let consultations = store.list_consultations().await?;
    let mut details = Vec::with_capacity(consultations.len());
    for consultation in consultations {
        details.push(with_details(store, consultation).await?);
    }
    tracing::debug!("Fetched {} consultations", details.len());
    Ok(details)
}

pub async fn get_consultation(store: &dyn Store, id: i32) -> SalonResult<ConsultationDetails> {
    let consultation = store
        .get_consultation(id)
        .await?
        .ok_or_else(|| SalonError::not_found("Consultation", id))?;
    with_details(store, consultation).await
}

pub async fn get_consultation_by_appointment(
    store: &dyn Store,
    appointment_id: i32,
) -> SalonResult<Option<Consultation>> {
    let consultations = store.list_consultations().await?;
    Ok(consultations
        .into_iter()
        .find(|c| c.appointment_id == appointment_id))
}

/// Removes the receipt. Stock deducted when it was written is not given back.
pub async fn delete_consultation(store: &dyn Store, id: i32) -> SalonResult<()> {
    if !store.delete_consultation(id).await? {
        return Err(SalonError::not_found("Consultation", id));
    }
    tracing::info!(consultation_id = id, "Consultation deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{ClientInput, PaymentMethod, ProductInput, ProductLine};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    struct Fixture {
        store: MemoryStore,
        appointment: Appointment,
        shampoo: i32,
        serum: i32,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let client = store
            .insert_client(&ClientInput {
                name: "Yasmine".to_string(),
                phone: "0550000000".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let appointment = store
            .insert_appointment(&NewAppointment {
                client_id: client.id,
                service_ids: vec![3, 4],
                date: today(),
                time: "14:00".to_string(),
                status: AppointmentStatus::Confirmed,
                notes: None,
                message: None,
            })
            .await
            .unwrap();

        let product = |name: &str, stock_quantity: i32| ProductInput {
            name: name.to_string(),
            stock_quantity,
            buy_price: 5.0,
            supplier_id: None,
        };
        let shampoo = store.insert_product(&product("Shampoo", 10)).await.unwrap().id;
        let serum = store.insert_product(&product("Serum", 1)).await.unwrap().id;

        Fixture {
            store,
            appointment,
            shampoo,
            serum,
        }
    }

    fn completion(appointment_id: i32, products: Vec<ProductLine>) -> CompleteAppointment {
        CompleteAppointment {
            appointment_id,
            products,
            amount: 80.0,
            payment_method: PaymentMethod::Card,
            next_date: None,
            next_time: None,
            next_service_ids: None,
            service_ids: None,
            notes: Some("Scalp was dry".to_string()),
        }
    }

    #[tokio::test]
    async fn test_completion_deducts_stock_and_writes_one_receipt() {
        let f = fixture().await;
        let lines = vec![
            ProductLine { product_id: f.shampoo, quantity: 2 },
            ProductLine { product_id: f.serum, quantity: 1 },
        ];

        let outcome = complete_appointment(&f.store, completion(f.appointment.id, lines), today())
            .await
            .unwrap();

        assert_eq!(f.store.get_product(f.shampoo).await.unwrap().unwrap().stock_quantity, 8);
        assert_eq!(f.store.get_product(f.serum).await.unwrap().unwrap().stock_quantity, 0);
        assert_eq!(f.store.list_consultations().await.unwrap().len(), 1);
        assert_eq!(outcome.consultation.products.len(), 2);
        assert_eq!(outcome.consultation.date, today());
        assert_eq!(outcome.appointment.status, AppointmentStatus::Completed);
        assert_eq!(outcome.appointment.notes.as_deref(), Some("Scalp was dry"));
        assert!(outcome.next_appointment.is_none());
    }

    #[tokio::test]
    async fn test_completion_lets_stock_go_negative() {
        let f = fixture().await;
        let lines = vec![ProductLine { product_id: f.serum, quantity: 3 }];

        complete_appointment(&f.store, completion(f.appointment.id, lines), today())
            .await
            .unwrap();

        assert_eq!(f.store.get_product(f.serum).await.unwrap().unwrap().stock_quantity, -2);
    }

    #[tokio::test]
    async fn test_completion_rejects_stock_overflow() {
        let f = fixture().await;
        f.store.set_product_stock(f.serum, -10).await.unwrap();
        let lines = vec![ProductLine { product_id: f.serum, quantity: i32::MAX }];

        let err = complete_appointment(&f.store, completion(f.appointment.id, lines), today())
            .await
            .unwrap_err();

        assert!(matches!(err, SalonError::Validation(_)));
        assert_eq!(f.store.get_product(f.serum).await.unwrap().unwrap().stock_quantity, -10);
        assert!(f.store.list_consultations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_completion_books_follow_up() {
        let f = fixture().await;
        let mut input = completion(f.appointment.id, vec![]);
        input.next_date = NaiveDate::from_ymd_opt(2024, 7, 1);
        input.next_time = Some("15:30".to_string());

        let outcome = complete_appointment(&f.store, input, today()).await.unwrap();

        let next = outcome.next_appointment.unwrap();
        assert_eq!(next.client_id, f.appointment.client_id);
        assert_eq!(next.status, AppointmentStatus::Confirmed);
        assert_eq!(next.service_ids, vec![3, 4]);
        assert_eq!(f.store.list_appointments().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_follow_up_needs_both_date_and_time() {
        let f = fixture().await;
        let mut input = completion(f.appointment.id, vec![]);
        input.next_date = NaiveDate::from_ymd_opt(2024, 7, 1);

        let outcome = complete_appointment(&f.store, input, today()).await.unwrap();

        assert!(outcome.next_appointment.is_none());
        assert_eq!(f.store.list_appointments().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_completing_missing_appointment() {
        let f = fixture().await;
        let err = complete_appointment(&f.store, completion(999, vec![]), today())
            .await
            .unwrap_err();

        assert!(matches!(err, SalonError::AppointmentNotFound(999)));
        assert!(f.store.list_consultations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_product_keeps_earlier_deductions() {
        let f = fixture().await;
        let lines = vec![
            ProductLine { product_id: f.shampoo, quantity: 1 },
            ProductLine { product_id: 4242, quantity: 1 },
        ];

        let err = complete_appointment(&f.store, completion(f.appointment.id, lines), today())
            .await
            .unwrap_err();

        assert!(matches!(err, SalonError::ProductNotFound(4242)));
        assert_eq!(f.store.get_product(f.shampoo).await.unwrap().unwrap().stock_quantity, 9);
        assert!(f.store.list_consultations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repeat_completion_deducts_twice() {
        let f = fixture().await;
        let lines = vec![ProductLine { product_id: f.shampoo, quantity: 2 }];

        for _ in 0..2 {
            complete_appointment(&f.store, completion(f.appointment.id, lines.clone()), today())
                .await
                .unwrap();
        }

        assert_eq!(f.store.get_product(f.shampoo).await.unwrap().unwrap().stock_quantity, 6);
        assert_eq!(f.store.list_consultations().await.unwrap().len(), 2);

        let found = get_consultation_by_appointment(&f.store, f.appointment.id)
            .await
            .unwrap();
        assert!(found.is_some());
    }
}
