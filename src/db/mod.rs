use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::config::Config;
use crate::error::SalonResult;
use crate::models::{
    Admin, Appointment, AppointmentPatch, BusinessExpense, Client, ClientInput, Consultation,
    ExpenseInput, NewAppointment, NewConsultation, NewServiceRecipe, Product, ProductInput,
    Service, ServiceInput, ServiceRecipe, Supplier, SupplierInput,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Record store holding the nine business collections.
///
/// Every method is a single read or a single write. Nothing here spans more than one
/// collection; multi-step workflows compose these calls without a transaction.
/// Update and delete methods report whether a record with that id existed.
#[async_trait]
pub trait Store: Send + Sync {
    // Admin operations
    async fn find_admin(&self, username: &str) -> SalonResult<Option<Admin>>;
    async fn count_admins(&self) -> SalonResult<i64>;
    async fn insert_admin(&self, username: &str, password: &str) -> SalonResult<Admin>;
    async fn set_admin_password(&self, id: i32, password: &str) -> SalonResult<bool>;

    // Service operations
    async fn list_services(&self) -> SalonResult<Vec<Service>>;
    async fn get_service(&self, id: i32) -> SalonResult<Option<Service>>;
    async fn insert_service(&self, input: &ServiceInput) -> SalonResult<Service>;
    async fn update_service(&self, id: i32, input: &ServiceInput) -> SalonResult<Option<Service>>;
    async fn delete_service(&self, id: i32) -> SalonResult<bool>;

    // Supplier operations
    async fn list_suppliers(&self) -> SalonResult<Vec<Supplier>>;
    async fn get_supplier(&self, id: i32) -> SalonResult<Option<Supplier>>;
    async fn insert_supplier(&self, input: &SupplierInput) -> SalonResult<Supplier>;
    async fn update_supplier(&self, id: i32, input: &SupplierInput) -> SalonResult<Option<Supplier>>;
    async fn delete_supplier(&self, id: i32) -> SalonResult<bool>;

    // Product operations
    async fn list_products(&self) -> SalonResult<Vec<Product>>;
    async fn get_product(&self, id: i32) -> SalonResult<Option<Product>>;
    async fn insert_product(&self, input: &ProductInput) -> SalonResult<Product>;
    async fn update_product(&self, id: i32, input: &ProductInput) -> SalonResult<Option<Product>>;
    async fn set_product_stock(&self, id: i32, stock_quantity: i32) -> SalonResult<bool>;
    async fn delete_product(&self, id: i32) -> SalonResult<bool>;

    // Service recipe operations
    async fn list_recipes(&self) -> SalonResult<Vec<ServiceRecipe>>;
    async fn insert_recipe(&self, recipe: &NewServiceRecipe) -> SalonResult<ServiceRecipe>;
    async fn delete_recipe(&self, id: i32) -> SalonResult<bool>;

    // Client operations
    async fn list_clients(&self) -> SalonResult<Vec<Client>>;
    async fn get_client(&self, id: i32) -> SalonResult<Option<Client>>;
    async fn find_client_by_phone(&self, phone: &str) -> SalonResult<Option<Client>>;
    async fn insert_client(&self, input: &ClientInput) -> SalonResult<Client>;
    async fn update_client(&self, id: i32, input: &ClientInput) -> SalonResult<Option<Client>>;
    async fn delete_client(&self, id: i32) -> SalonResult<bool>;

    // Appointment operations
    async fn list_appointments(&self) -> SalonResult<Vec<Appointment>>;
    async fn list_appointments_on(&self, date: NaiveDate) -> SalonResult<Vec<Appointment>>;
    async fn get_appointment(&self, id: i32) -> SalonResult<Option<Appointment>>;
    async fn insert_appointment(&self, appointment: &NewAppointment) -> SalonResult<Appointment>;
    async fn patch_appointment(
        &self,
        id: i32,
        patch: &AppointmentPatch,
    ) -> SalonResult<Option<Appointment>>;
    async fn delete_appointment(&self, id: i32) -> SalonResult<bool>;

    // Consultation operations
    async fn list_consultations(&self) -> SalonResult<Vec<Consultation>>;
    async fn get_consultation(&self, id: i32) -> SalonResult<Option<Consultation>>;
    async fn insert_consultation(&self, consultation: &NewConsultation) -> SalonResult<Consultation>;
    async fn delete_consultation(&self, id: i32) -> SalonResult<bool>;

    // Business expense operations
    async fn list_expenses(&self) -> SalonResult<Vec<BusinessExpense>>;
    async fn get_expense(&self, id: i32) -> SalonResult<Option<BusinessExpense>>;
    async fn insert_expense(&self, input: &ExpenseInput) -> SalonResult<BusinessExpense>;
    async fn update_expense(&self, id: i32, input: &ExpenseInput) -> SalonResult<Option<BusinessExpense>>;
    async fn delete_expense(&self, id: i32) -> SalonResult<bool>;
}

/// Shared handle to whichever store backs this process.
pub type Database = Arc<dyn Store>;

/// Open the configured store: PostgreSQL normally, or a fresh in-memory store.
pub async fn init(config: &Config, in_memory: bool) -> Result<Database> {
    if in_memory {
        tracing::warn!("Using the in-memory store; nothing will be persisted");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = PgStore::connect(config.database_url()?).await?;
    store.migrate().await?;

    Ok(Arc::new(store))
}
