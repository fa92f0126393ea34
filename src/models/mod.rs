mod admin;
mod appointment;
mod client;
mod consultation;
mod expense;
mod product;
mod service;
mod service_recipe;
mod supplier;

pub use admin::Admin;
pub use appointment::{
    Appointment, AppointmentDetails, AppointmentPatch, AppointmentStatus, BookingRequest,
    NewAppointment,
};
pub use client::{Client, ClientInput};
pub use consultation::{
    CompleteAppointment, Consultation, ConsultationDetails, NewConsultation, PaymentMethod,
    ProductLine,
};
pub use expense::{BusinessExpense, ExpenseCategory, ExpenseInput};
pub use product::{Product, ProductDetails, ProductInput};
pub use service::{Service, ServiceCategory, ServiceInput};
pub use service_recipe::{NewServiceRecipe, ServiceRecipe};
pub use supplier::{Supplier, SupplierInput};

/// Returned when a stored or submitted string does not name a known variant.
#[derive(Debug, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}
