//! Salon booking and back-office: a public booking API, an admin API, and terminal front-ends
//! over one record store.

pub mod config;
pub mod db;
pub mod error;
pub mod functions;
pub mod http;
pub mod mailer;
pub mod models;
pub mod receipt_gen;
pub mod ui;
