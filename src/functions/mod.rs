//! Server functions: one module per business entity, each a handful of named queries and
//! mutations over a [`Store`](crate::db::Store).
//!
//! Validation stops at field presence and format. No cross-module business rule is enforced.

pub mod admins;
pub mod appointments;
pub mod clients;
pub mod consultations;
pub mod dashboard;
pub mod expenses;
pub mod products;
pub mod service_recipes;
pub mod services;
pub mod suppliers;

use chrono::NaiveTime;

use crate::error::{SalonError, SalonResult};

pub(crate) fn require_text(field: &str, value: &str) -> SalonResult<()> {
    if value.trim().is_empty() {
        return Err(SalonError::validation(format!("{field} is required")));
    }
    Ok(())
}

pub(crate) fn require_non_negative(field: &str, value: f64) -> SalonResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(SalonError::validation(format!("{field} must be zero or more")));
    }
    Ok(())
}

/// Parse a `HH:MM` wall-clock time.
pub fn parse_time(value: &str) -> SalonResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| SalonError::validation(format!("Invalid time '{value}', expected HH:MM")))
}

/// Normalise an optional free-text field: blank becomes `None`.
pub(crate) fn blank_to_none(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("09:30").unwrap(), NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(parse_time(" 18:00 ").unwrap(), NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        assert!(parse_time("25:00").is_err());
        assert!(parse_time("9h30").is_err());
        assert!(parse_time("").is_err());
    }

    #[test]
    fn test_blank_to_none() {
        assert_eq!(blank_to_none(Some("  ".to_string())), None);
        assert_eq!(blank_to_none(Some(" @ana ".to_string())), Some("@ana".to_string()));
        assert_eq!(blank_to_none(None), None);
    }
}
