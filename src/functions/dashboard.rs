use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::db::Store;
use crate::error::SalonResult;
use crate::models::{AppointmentDetails, AppointmentStatus};

use super::appointments;

const UPCOMING_LIMIT: usize = 5;

/// Figures shown on the admin home screen.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub today_appointments: usize,
    pub pending_appointments: usize,
    pub upcoming: Vec<AppointmentDetails>,
    pub month_revenue: f64,
    pub month_expenses: f64,
    pub month_net: f64,
    pub low_stock_products: usize,
    pub client_count: usize,
}

fn same_month(date: NaiveDate, today: NaiveDate) -> bool {
    date.year() == today.year() && date.month() == today.month()
}

pub async fn dashboard_stats(
    store: &dyn Store,
    today: NaiveDate,
    low_stock_threshold: i32,
) -> SalonResult<DashboardStats> {
    let appointments = appointments::list_appointments(store).await?;

    let today_appointments = appointments
        .iter()
        .filter(|a| a.appointment.date == today)
        .count();
    let pending_appointments = appointments
        .iter()
        .filter(|a| a.appointment.status == AppointmentStatus::Pending)
        .count();

    let mut upcoming: Vec<AppointmentDetails> = appointments
        .into_iter()
        .filter(|a| a.appointment.date >= today && a.appointment.status == AppointmentStatus::Confirmed)
        .collect();
    upcoming.sort_by(|a, b| {
        (a.appointment.date, &a.appointment.time).cmp(&(b.appointment.date, &b.appointment.time))
    });
    upcoming.truncate(UPCOMING_LIMIT);

    let month_revenue: f64 = store
        .list_consultations()
        .await?
        .iter()
        .filter(|c| same_month(c.date, today))
        .map(|c| c.amount)
        .sum();
    let month_expenses: f64 = store
        .list_expenses()
        .await?
        .iter()
        .filter(|e| same_month(e.date, today))
        .map(|e| e.amount)
        .sum();

    let low_stock_products = store
        .list_products()
        .await?
        .iter()
        .filter(|p| p.stock_quantity <= low_stock_threshold)
        .count();
    let client_count = store.list_clients().await?.len();

    Ok(DashboardStats {
        today_appointments,
        pending_appointments,
        upcoming,
        month_revenue,
        month_expenses,
        month_net: month_revenue - month_expenses,
        low_stock_products,
        client_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{
        ClientInput, ExpenseCategory, ExpenseInput, NewAppointment, NewConsultation,
        PaymentMethod, ProductInput,
    };

    fn day(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    #[tokio::test]
    async fn test_dashboard_figures() {
        let store = MemoryStore::new();
        let today = day(5, 20);

        let client = store
            .insert_client(&ClientInput {
                name: "Nour".to_string(),
                phone: "0555".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        for (date, time, status) in [
            (today, "10:00", AppointmentStatus::Pending),
            (day(5, 22), "11:00", AppointmentStatus::Confirmed),
            (day(5, 21), "09:00", AppointmentStatus::Confirmed),
            (day(5, 1), "09:00", AppointmentStatus::Confirmed),
        ] {
            store
                .insert_appointment(&NewAppointment {
                    client_id: client.id,
                    service_ids: vec![1],
                    date,
                    time: time.to_string(),
                    status,
                    notes: None,
                    message: None,
                })
                .await
                .unwrap();
        }

        for (date, amount) in [(day(5, 2), 60.0), (day(4, 28), 500.0)] {
            store
                .insert_consultation(&NewConsultation {
                    appointment_id: 1,
                    client_id: client.id,
                    products: vec![],
                    amount,
                    payment_method: PaymentMethod::Cash,
                    date,
                    notes: None,
                })
                .await
                .unwrap();
        }
        store
            .insert_expense(&ExpenseInput {
                description: "Rent".to_string(),
                amount: 25.0,
                category: ExpenseCategory::Rent,
                date: day(5, 3),
                supplier_id: None,
                product_id: None,
            })
            .await
            .unwrap();
        store
            .insert_product(&ProductInput {
                name: "Wax".to_string(),
                stock_quantity: 2,
                buy_price: 3.0,
                supplier_id: None,
            })
            .await
            .unwrap();

        let stats = dashboard_stats(&store, today, 5).await.unwrap();

        assert_eq!(stats.today_appointments, 1);
        assert_eq!(stats.pending_appointments, 1);
        let upcoming: Vec<NaiveDate> = stats.upcoming.iter().map(|a| a.appointment.date).collect();
        assert_eq!(upcoming, vec![day(5, 21), day(5, 22)]);
        assert_eq!(stats.month_revenue, 60.0);
        assert_eq!(stats.month_expenses, 25.0);
        assert_eq!(stats.month_net, 35.0);
        assert_eq!(stats.low_stock_products, 1);
        assert_eq!(stats.client_count, 1);
    }
}
