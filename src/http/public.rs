use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::db::Database;
use crate::error::SalonResult;
use crate::functions::appointments::{self, TimeSlot};
use crate::functions::services;
use crate::models::{Appointment, BookingRequest, Service};

use super::{ApiJson, ApiQuery, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/services", get(list_services))
        .route("/api/booking/slots", get(booking_slots))
        .route("/api/booking/appointments", post(book_appointment))
}

async fn list_services(State(db): State<Database>) -> SalonResult<Json<Vec<Service>>> {
    Ok(Json(services::list_active_services(db.as_ref()).await?))
}

#[derive(Deserialize)]
struct SlotsQuery {
    date: NaiveDate,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SlotsResponse {
    date: NaiveDate,
    slots: Vec<TimeSlot>,
}

async fn booking_slots(
    State(db): State<Database>,
    State(config): State<Arc<Config>>,
    ApiQuery(query): ApiQuery<SlotsQuery>,
) -> SalonResult<Json<SlotsResponse>> {
    let slots = appointments::available_slots(db.as_ref(), &config, query.date).await?;
    Ok(Json(SlotsResponse {
        date: query.date,
        slots,
    }))
}

async fn book_appointment(
    State(db): State<Database>,
    ApiJson(request): ApiJson<BookingRequest>,
) -> SalonResult<Json<Appointment>> {
    Ok(Json(appointments::create_appointment(db.as_ref(), request).await?))
}
