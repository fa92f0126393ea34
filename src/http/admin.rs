//! Back-office endpoints. None of these check a session: the console keeps its own
//! logged-in flag after a successful `/api/admin/login`.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::config::Config;
use crate::db::Database;
use crate::error::{SalonError, SalonResult};
use crate::functions::appointments;
use crate::functions::consultations::{self, CompletionOutcome};
use crate::functions::dashboard::{self, DashboardStats};
use crate::functions::{
    admins, clients, expenses, products, service_recipes, services, suppliers,
};
use crate::mailer;
use crate::models::{
    Appointment, AppointmentDetails, AppointmentPatch, AppointmentStatus, BusinessExpense, Client,
    ClientInput, CompleteAppointment, Consultation, ConsultationDetails, ExpenseInput,
    NewAppointment, NewServiceRecipe, Product, ProductDetails, ProductInput, ProductLine, Service,
    ServiceInput, ServiceRecipe, Supplier, SupplierInput,
};
use crate::receipt_gen::Receipt;

use super::{ApiJson, ApiPath, ApiQuery, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/login", post(login))
        .route("/api/admin/password", put(change_password))
        .route("/api/admin/dashboard", get(dashboard_stats))
        // services
        .route("/api/admin/services", get(list_services).post(create_service))
        .route(
            "/api/admin/services/:id",
            get(get_service).put(update_service).delete(delete_service),
        )
        .route("/api/admin/services/:id/active", put(set_service_active))
        // suppliers
        .route("/api/admin/suppliers", get(list_suppliers).post(create_supplier))
        .route(
            "/api/admin/suppliers/:id",
            get(get_supplier).put(update_supplier).delete(delete_supplier),
        )
        // products
        .route("/api/admin/products", get(list_products).post(create_product))
        .route("/api/admin/products/low-stock", get(list_low_stock))
        .route(
            "/api/admin/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        // recipes
        .route("/api/admin/recipes", get(list_recipes).post(add_recipe))
        .route("/api/admin/recipes/suggested", get(suggested_products))
        .route("/api/admin/recipes/:id", axum::routing::delete(delete_recipe))
        // clients
        .route("/api/admin/clients", get(search_clients).post(create_client))
        .route(
            "/api/admin/clients/:id",
            get(get_client).put(update_client).delete(delete_client),
        )
        .route("/api/admin/clients/:id/history", get(client_history))
        // appointments
        .route(
            "/api/admin/appointments",
            get(list_appointments).post(create_appointment),
        )
        .route(
            "/api/admin/appointments/:id",
            get(get_appointment)
                .patch(update_appointment)
                .delete(delete_appointment),
        )
        .route("/api/admin/appointments/:id/status", put(set_appointment_status))
        .route("/api/admin/appointments/:id/complete", post(complete_appointment))
        .route(
            "/api/admin/appointments/:id/consultation",
            get(consultation_for_appointment),
        )
        // consultations
        .route("/api/admin/consultations", get(list_consultations))
        .route(
            "/api/admin/consultations/:id",
            get(get_consultation).delete(delete_consultation),
        )
        .route("/api/admin/consultations/:id/receipt", get(consultation_receipt))
        .route("/api/admin/consultations/:id/email", post(email_receipt))
        // expenses
        .route("/api/admin/expenses", get(list_expenses).post(create_expense))
        .route(
            "/api/admin/expenses/:id",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn deleted() -> Json<Value> {
    Json(json!({ "success": true }))
}

// Auth

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

async fn login(
    State(db): State<Database>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> SalonResult<Json<Value>> {
    if !admins::login(db.as_ref(), &credentials.username, &credentials.password).await? {
        return Err(SalonError::InvalidCredentials);
    }
    Ok(Json(json!({ "success": true, "username": credentials.username })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordChange {
    username: String,
    current_password: String,
    new_password: String,
}

async fn change_password(
    State(db): State<Database>,
    ApiJson(change): ApiJson<PasswordChange>,
) -> SalonResult<Json<Value>> {
    admins::change_password(
        db.as_ref(),
        &change.username,
        &change.current_password,
        &change.new_password,
    )
    .await?;
    Ok(Json(json!({ "success": true })))
}

async fn dashboard_stats(
    State(db): State<Database>,
    State(config): State<Arc<Config>>,
) -> SalonResult<Json<DashboardStats>> {
    let stats = dashboard::dashboard_stats(db.as_ref(), today(), config.low_stock_threshold).await?;
    Ok(Json(stats))
}

// Services

async fn list_services(State(db): State<Database>) -> SalonResult<Json<Vec<Service>>> {
    Ok(Json(services::list_services(db.as_ref()).await?))
}

async fn get_service(State(db): State<Database>, ApiPath(id): ApiPath<i32>) -> SalonResult<Json<Service>> {
    Ok(Json(services::get_service(db.as_ref(), id).await?))
}

async fn create_service(
    State(db): State<Database>,
    ApiJson(input): ApiJson<ServiceInput>,
) -> SalonResult<Json<Service>> {
    Ok(Json(services::create_service(db.as_ref(), input).await?))
}

async fn update_service(
    State(db): State<Database>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(input): ApiJson<ServiceInput>,
) -> SalonResult<Json<Service>> {
    Ok(Json(services::update_service(db.as_ref(), id, input).await?))
}

#[derive(Deserialize)]
struct ActiveFlag {
    active: bool,
}

async fn set_service_active(
    State(db): State<Database>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(flag): ApiJson<ActiveFlag>,
) -> SalonResult<Json<Service>> {
    Ok(Json(services::set_service_active(db.as_ref(), id, flag.active).await?))
}

async fn delete_service(State(db): State<Database>, ApiPath(id): ApiPath<i32>) -> SalonResult<Json<Value>> {
    services::delete_service(db.as_ref(), id).await?;
    Ok(deleted())
}

// Suppliers

async fn list_suppliers(State(db): State<Database>) -> SalonResult<Json<Vec<Supplier>>> {
    Ok(Json(suppliers::list_suppliers(db.as_ref()).await?))
}

async fn get_supplier(State(db): State<Database>, ApiPath(id): ApiPath<i32>) -> SalonResult<Json<Supplier>> {
    Ok(Json(suppliers::get_supplier(db.as_ref(), id).await?))
}

async fn create_supplier(
    State(db): State<Database>,
    ApiJson(input): ApiJson<SupplierInput>,
) -> SalonResult<Json<Supplier>> {
    Ok(Json(suppliers::create_supplier(db.as_ref(), input).await?))
}

async fn update_supplier(
    State(db): State<Database>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(input): ApiJson<SupplierInput>,
) -> SalonResult<Json<Supplier>> {
    Ok(Json(suppliers::update_supplier(db.as_ref(), id, input).await?))
}

async fn delete_supplier(State(db): State<Database>, ApiPath(id): ApiPath<i32>) -> SalonResult<Json<Value>> {
    suppliers::delete_supplier(db.as_ref(), id).await?;
    Ok(deleted())
}

// Products

async fn list_products(State(db): State<Database>) -> SalonResult<Json<Vec<ProductDetails>>> {
    Ok(Json(products::list_products(db.as_ref()).await?))
}

async fn list_low_stock(
    State(db): State<Database>,
    State(config): State<Arc<Config>>,
) -> SalonResult<Json<Vec<Product>>> {
    Ok(Json(products::list_low_stock(db.as_ref(), config.low_stock_threshold).await?))
}

async fn get_product(State(db): State<Database>, ApiPath(id): ApiPath<i32>) -> SalonResult<Json<Product>> {
    Ok(Json(products::get_product(db.as_ref(), id).await?))
}

async fn create_product(
    State(db): State<Database>,
    ApiJson(input): ApiJson<ProductInput>,
) -> SalonResult<Json<Product>> {
    Ok(Json(products::create_product(db.as_ref(), input).await?))
}

async fn update_product(
    State(db): State<Database>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(input): ApiJson<ProductInput>,
) -> SalonResult<Json<Product>> {
    Ok(Json(products::update_product(db.as_ref(), id, input, today()).await?))
}

async fn delete_product(State(db): State<Database>, ApiPath(id): ApiPath<i32>) -> SalonResult<Json<Value>> {
    products::delete_product(db.as_ref(), id).await?;
    Ok(deleted())
}

// Recipes

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecipeQuery {
    service_id: Option<i32>,
}

async fn list_recipes(
    State(db): State<Database>,
    ApiQuery(query): ApiQuery<RecipeQuery>,
) -> SalonResult<Json<Vec<ServiceRecipe>>> {
    let recipes = match query.service_id {
        Some(service_id) => service_recipes::list_recipes_for_service(db.as_ref(), service_id).await?,
        None => service_recipes::list_recipes(db.as_ref()).await?,
    };
    Ok(Json(recipes))
}

async fn add_recipe(
    State(db): State<Database>,
    ApiJson(recipe): ApiJson<NewServiceRecipe>,
) -> SalonResult<Json<ServiceRecipe>> {
    Ok(Json(service_recipes::add_recipe(db.as_ref(), recipe).await?))
}

async fn delete_recipe(State(db): State<Database>, ApiPath(id): ApiPath<i32>) -> SalonResult<Json<Value>> {
    service_recipes::delete_recipe(db.as_ref(), id).await?;
    Ok(deleted())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestedQuery {
    /// Comma separated, e.g. `1,4,4`
    service_ids: String,
}

async fn suggested_products(
    State(db): State<Database>,
    ApiQuery(query): ApiQuery<SuggestedQuery>,
) -> SalonResult<Json<Vec<ProductLine>>> {
    let service_ids = query
        .service_ids
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.trim()
                .parse::<i32>()
                .map_err(|_| SalonError::validation(format!("Invalid service id '{s}'")))
        })
        .collect::<SalonResult<Vec<i32>>>()?;
    Ok(Json(service_recipes::suggested_products(db.as_ref(), &service_ids).await?))
}

// Clients

#[derive(Deserialize)]
struct ClientQuery {
    q: Option<String>,
}

async fn search_clients(
    State(db): State<Database>,
    ApiQuery(query): ApiQuery<ClientQuery>,
) -> SalonResult<Json<Vec<Client>>> {
    let clients = match query.q {
        Some(q) => clients::search_clients(db.as_ref(), &q).await?,
        None => clients::list_clients(db.as_ref()).await?,
    };
    Ok(Json(clients))
}

async fn get_client(State(db): State<Database>, ApiPath(id): ApiPath<i32>) -> SalonResult<Json<Client>> {
    Ok(Json(clients::get_client(db.as_ref(), id).await?))
}

async fn create_client(
    State(db): State<Database>,
    ApiJson(input): ApiJson<ClientInput>,
) -> SalonResult<Json<Client>> {
    Ok(Json(clients::create_client(db.as_ref(), input).await?))
}

async fn update_client(
    State(db): State<Database>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(input): ApiJson<ClientInput>,
) -> SalonResult<Json<Client>> {
    Ok(Json(clients::update_client(db.as_ref(), id, input).await?))
}

async fn delete_client(State(db): State<Database>, ApiPath(id): ApiPath<i32>) -> SalonResult<Json<Value>> {
    clients::delete_client(db.as_ref(), id).await?;
    Ok(deleted())
}

async fn client_history(
    State(db): State<Database>,
    ApiPath(id): ApiPath<i32>,
) -> SalonResult<Json<Vec<Appointment>>> {
    Ok(Json(clients::client_history(db.as_ref(), id).await?))
}

// Appointments

#[derive(Deserialize)]
struct DateQuery {
    date: Option<NaiveDate>,
}

async fn list_appointments(
    State(db): State<Database>,
    ApiQuery(query): ApiQuery<DateQuery>,
) -> SalonResult<Json<Vec<AppointmentDetails>>> {
    let appointments = match query.date {
        Some(date) => appointments::list_appointments_by_date(db.as_ref(), date).await?,
        None => appointments::list_appointments(db.as_ref()).await?,
    };
    Ok(Json(appointments))
}

async fn create_appointment(
    State(db): State<Database>,
    ApiJson(appointment): ApiJson<NewAppointment>,
) -> SalonResult<Json<Appointment>> {
    Ok(Json(appointments::create_admin_appointment(db.as_ref(), appointment).await?))
}

async fn get_appointment(
    State(db): State<Database>,
    ApiPath(id): ApiPath<i32>,
) -> SalonResult<Json<AppointmentDetails>> {
    Ok(Json(appointments::get_appointment(db.as_ref(), id).await?))
}

async fn update_appointment(
    State(db): State<Database>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(patch): ApiJson<AppointmentPatch>,
) -> SalonResult<Json<Appointment>> {
    Ok(Json(appointments::update_appointment(db.as_ref(), id, patch).await?))
}

#[derive(Deserialize)]
struct StatusChange {
    status: AppointmentStatus,
}

async fn set_appointment_status(
    State(db): State<Database>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(change): ApiJson<StatusChange>,
) -> SalonResult<Json<Appointment>> {
    Ok(Json(appointments::set_appointment_status(db.as_ref(), id, change.status).await?))
}

async fn delete_appointment(
    State(db): State<Database>,
    ApiPath(id): ApiPath<i32>,
) -> SalonResult<Json<Value>> {
    appointments::delete_appointment(db.as_ref(), id).await?;
    Ok(deleted())
}

async fn complete_appointment(
    State(db): State<Database>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(input): ApiJson<CompleteAppointment>,
) -> SalonResult<Json<CompletionOutcome>> {
    let input = CompleteAppointment {
        appointment_id: id,
        ..input
    };
    Ok(Json(consultations::complete_appointment(db.as_ref(), input, today()).await?))
}

async fn consultation_for_appointment(
    State(db): State<Database>,
    ApiPath(id): ApiPath<i32>,
) -> SalonResult<Json<Option<Consultation>>> {
    Ok(Json(consultations::get_consultation_by_appointment(db.as_ref(), id).await?))
}

// Consultations

async fn list_consultations(
    State(db): State<Database>,
) -> SalonResult<Json<Vec<ConsultationDetails>>> {
    Ok(Json(consultations::list_consultations(db.as_ref()).await?))
}

async fn get_consultation(
    State(db): State<Database>,
    ApiPath(id): ApiPath<i32>,
) -> SalonResult<Json<ConsultationDetails>> {
    Ok(Json(consultations::get_consultation(db.as_ref(), id).await?))
}

async fn delete_consultation(
    State(db): State<Database>,
    ApiPath(id): ApiPath<i32>,
) -> SalonResult<Json<Value>> {
    consultations::delete_consultation(db.as_ref(), id).await?;
    Ok(deleted())
}

/// The receipt as Markdown text.
async fn consultation_receipt(
    State(db): State<Database>,
    State(config): State<Arc<Config>>,
    ApiPath(id): ApiPath<i32>,
) -> SalonResult<impl IntoResponse> {
    let receipt = Receipt::load(db.as_ref(), id).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        receipt.to_markdown(&config.business_name),
    ))
}

async fn email_receipt(
    State(db): State<Database>,
    State(config): State<Arc<Config>>,
    ApiPath(id): ApiPath<i32>,
) -> SalonResult<Json<Value>> {
    let to = mailer::email_receipt(db.as_ref(), &config, id).await?;
    Ok(Json(json!({ "success": true, "to": to })))
}

// Expenses

#[derive(Deserialize)]
struct RangeQuery {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

async fn list_expenses(
    State(db): State<Database>,
    ApiQuery(query): ApiQuery<RangeQuery>,
) -> SalonResult<Json<Vec<BusinessExpense>>> {
    let range = match (query.from, query.to) {
        (Some(from), Some(to)) => Some((from, to)),
        (Some(from), None) => Some((from, NaiveDate::MAX)),
        (None, Some(to)) => Some((NaiveDate::MIN, to)),
        (None, None) => None,
    };
    Ok(Json(expenses::list_expenses(db.as_ref(), range).await?))
}

async fn get_expense(
    State(db): State<Database>,
    ApiPath(id): ApiPath<i32>,
) -> SalonResult<Json<BusinessExpense>> {
    Ok(Json(expenses::get_expense(db.as_ref(), id).await?))
}

async fn create_expense(
    State(db): State<Database>,
    ApiJson(input): ApiJson<ExpenseInput>,
) -> SalonResult<Json<BusinessExpense>> {
    Ok(Json(expenses::create_expense(db.as_ref(), input).await?))
}

async fn update_expense(
    State(db): State<Database>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(input): ApiJson<ExpenseInput>,
) -> SalonResult<Json<BusinessExpense>> {
    Ok(Json(expenses::update_expense(db.as_ref(), id, input).await?))
}

async fn delete_expense(State(db): State<Database>, ApiPath(id): ApiPath<i32>) -> SalonResult<Json<Value>> {
    expenses::delete_expense(db.as_ref(), id).await?;
    Ok(deleted())
}
