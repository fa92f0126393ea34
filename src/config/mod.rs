use anyhow::{Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

/// Configuration for the application
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database connection URL. Only optional when running against the in-memory store.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Printed at the top of receipts
    #[serde(default = "default_business_name")]
    pub business_name: String,

    /// Address the HTTP server binds to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Credential pair seeded into an empty `admins` collection
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,

    /// Opening hours used to build booking slots, `HH:MM`
    #[serde(default = "default_opening_time")]
    pub opening_time: String,
    #[serde(default = "default_closing_time")]
    pub closing_time: String,
    #[serde(default = "default_slot_minutes")]
    pub slot_minutes: u32,

    /// Products at or below this quantity count as low stock
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i32,

    /// Where generated receipts are written
    #[serde(default = "default_receipts_dir")]
    pub receipts_dir: String,

    #[serde(default)]
    pub smtp_host: Option<String>,
    #[serde(default)]
    pub smtp_username: Option<String>,
    #[serde(default)]
    pub smtp_password: Option<String>,
    #[serde(default)]
    pub smtp_from: Option<String>,
}

fn default_business_name() -> String {
    "Salon".to_string()
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_password() -> String {
    "admin".to_string()
}

fn default_opening_time() -> String {
    "09:00".to_string()
}

fn default_closing_time() -> String {
    "19:00".to_string()
}

fn default_slot_minutes() -> u32 {
    30
}

fn default_low_stock_threshold() -> i32 {
    5
}

fn default_receipts_dir() -> String {
    "receipts".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            business_name: default_business_name(),
            bind_addr: default_bind_addr(),
            admin_username: default_admin_username(),
            admin_password: default_admin_password(),
            opening_time: default_opening_time(),
            closing_time: default_closing_time(),
            slot_minutes: default_slot_minutes(),
            low_stock_threshold: default_low_stock_threshold(),
            receipts_dir: default_receipts_dir(),
            smtp_host: None,
            smtp_username: None,
            smtp_password: None,
            smtp_from: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Variables from a `.env` file are loaded first if one exists.
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::from_env::<Config>()?;

        Ok(config)
    }

    /// The database URL, or an error when none is configured
    pub fn database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .ok_or_else(|| anyhow!("DATABASE_URL is not set (use --memory to run without a database)"))
    }

    /// SMTP settings, if all of host, username and password are present
    pub fn smtp(&self) -> Option<SmtpSettings<'_>> {
        match (&self.smtp_host, &self.smtp_username, &self.smtp_password) {
            (Some(host), Some(username), Some(password)) => Some(SmtpSettings {
                host,
                username,
                password,
                from: self.smtp_from.as_deref().unwrap_or(username),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SmtpSettings<'a> {
    pub host: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub from: &'a str,
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    Config::load()
}
