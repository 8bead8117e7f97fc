use crate::error::OracleError;
use serde::{Deserialize, Serialize};

/// Trait for configuration sections
pub trait ConfigSection: Serialize + for<'de> Deserialize<'de> + Default + Clone {
    fn section_name() -> &'static str;
    fn validate(&self) -> Result<(), OracleError>;
}

/// Shared range check used by the section validators.
pub(crate) fn ensure_unit_interval(section: &str, field: &str, value: f64) -> Result<(), OracleError> {
    if !(0.0..=1.0).contains(&value) || value.is_nan() {
        return Err(OracleError::Configuration(format!(
            "{}.{} must be between 0 and 1, got {}",
            section, field, value
        )));
    }
    Ok(())
}

pub(crate) fn ensure_positive(section: &str, field: &str, value: f64) -> Result<(), OracleError> {
    if !(value > 0.0) || !value.is_finite() {
        return Err(OracleError::Configuration(format!(
            "{}.{} must be positive, got {}",
            section, field, value
        )));
    }
    Ok(())
}
