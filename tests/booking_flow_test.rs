use chrono::NaiveDate;

use salon_manager::db::MemoryStore;
use salon_manager::functions::{
    appointments, clients, consultations, dashboard, products, service_recipes, services,
};
use salon_manager::models::{
    AppointmentStatus, BookingRequest, CompleteAppointment, NewServiceRecipe, PaymentMethod,
    ProductInput, ProductLine, ServiceCategory, ServiceInput,
};
use salon_manager::receipt_gen::Receipt;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 3, d).unwrap()
}

#[tokio::test]
async fn test_booking_to_receipt() {
    let store = MemoryStore::new();

    let facial = services::create_service(
        &store,
        ServiceInput {
            name: "Hydrating facial".to_string(),
            category: ServiceCategory::Face,
            price: 60.0,
            duration_minutes: 60,
            description: None,
            active: true,
        },
    )
    .await
    .unwrap();
    let serum = products::create_product(
        &store,
        ProductInput {
            name: "Serum".to_string(),
            stock_quantity: 3,
            buy_price: 12.0,
            supplier_id: None,
        },
    )
    .await
    .unwrap();
    service_recipes::add_recipe(
        &store,
        NewServiceRecipe {
            service_id: facial.id,
            product_id: serum.id,
            quantity: 2,
        },
    )
    .await
    .unwrap();

    // A new client books from the public page.
    let booked = appointments::create_appointment(
        &store,
        BookingRequest {
            service_ids: vec![facial.id],
            date: day(12),
            time: "14:00".to_string(),
            name: "Yasmine".to_string(),
            phone: "0770 12 34 56".to_string(),
            email: Some("yasmine@example.com".to_string()),
            instagram: None,
            message: Some("First visit".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(booked.status, AppointmentStatus::Pending);
    assert_eq!(clients::list_clients(&store).await.unwrap().len(), 1);

    appointments::set_appointment_status(&store, booked.id, AppointmentStatus::Confirmed)
        .await
        .unwrap();

    // The recipe pre-fills what the treatment uses.
    let suggested = service_recipes::suggested_products(&store, &[facial.id]).await.unwrap();
    assert_eq!(suggested, vec![ProductLine { product_id: serum.id, quantity: 2 }]);

    let outcome = consultations::complete_appointment(
        &store,
        CompleteAppointment {
            appointment_id: booked.id,
            products: suggested,
            amount: 60.0,
            payment_method: PaymentMethod::Card,
            next_date: Some(day(26)),
            next_time: Some("14:00".to_string()),
            next_service_ids: None,
            service_ids: None,
            notes: Some("Sensitive skin".to_string()),
        },
        day(12),
    )
    .await
    .unwrap();

    assert_eq!(outcome.appointment.status, AppointmentStatus::Completed);
    assert_eq!(products::get_product(&store, serum.id).await.unwrap().stock_quantity, 1);

    let next = outcome.next_appointment.unwrap();
    assert_eq!(next.status, AppointmentStatus::Confirmed);
    assert_eq!(next.date, day(26));
    assert_eq!(next.service_ids, vec![facial.id]);

    let history = clients::client_history(&store, booked.client_id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, next.id);

    let stats = dashboard::dashboard_stats(&store, day(12), 1).await.unwrap();
    assert_eq!(stats.month_revenue, 60.0);
    assert_eq!(stats.low_stock_products, 1);
    assert_eq!(stats.upcoming.len(), 1);

    let receipt = Receipt::load(&store, outcome.consultation.id).await.unwrap();
    let markdown = receipt.to_markdown("Studio Lumiere");
    assert!(markdown.contains("Studio Lumiere"));
    assert!(markdown.contains("Yasmine"));
    assert!(markdown.contains("Hydrating facial"));
    assert!(markdown.contains("Serum"));
}

#[tokio::test]
async fn test_returning_client_is_matched_by_phone() {
    let store = MemoryStore::new();
    let service = services::create_service(
        &store,
        ServiceInput {
            name: "Gel nails".to_string(),
            category: ServiceCategory::Nails,
            price: 35.0,
            duration_minutes: 90,
            description: None,
            active: true,
        },
    )
    .await
    .unwrap();

    let request = |name: &str| BookingRequest {
        service_ids: vec![service.id],
        date: day(5),
        time: "11:00".to_string(),
        name: name.to_string(),
        phone: "0555 98 76 54".to_string(),
        email: None,
        instagram: None,
        message: None,
    };

    let first = appointments::create_appointment(&store, request("Sara")).await.unwrap();
    let second = appointments::create_appointment(&store, request("Sara B.")).await.unwrap();

    assert_eq!(first.client_id, second.client_id);
    let client = clients::get_client(&store, first.client_id).await.unwrap();
    assert_eq!(client.name, "Sara");

    // Both bookings hold the same slot; overlaps are not refused.
    assert_eq!(appointments::booked_times(&store, day(5)).await.unwrap(), vec!["11:00"]);
}
