//! Input validation for plan generation requests.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation error types.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Numeric field outside its accepted range.
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        actual: f64,
    },
    /// Value not among the accepted choices.
    InvalidChoice {
        field: &'static str,
        allowed: &'static str,
    },
    /// Empty value where one is required.
    Empty(&'static str),
    /// Value too long.
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::OutOfRange {
                field,
                min,
                max,
                actual,
            } => write!(f, "{} must be between {} and {} (got {})", field, min, max, actual),
            ValidationError::InvalidChoice { field, allowed } => {
                write!(f, "{} must be one of: {}", field, allowed)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum allowed length for device identifiers.
pub const MAX_DEVICE_ID_LENGTH: usize = 255;

/// Accepted plan lengths in days.
pub const PLAN_PERIODS: [i64; 2] = [7, 30];

/// Default plan length when the request leaves it unset.
pub const DEFAULT_PLAN_PERIOD: i64 = 30;

/// A plan generation request as submitted by a client.
///
/// Heights and circumferences are in cm, weight in kg.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub device_id: Option<String>,
    pub age: i64,
    pub height: f64,
    pub weight: f64,
    pub gender: String,
    pub activity_level: String,
    pub neck_circumference: f64,
    pub waist_circumference: f64,
    pub hip_circumference: Option<f64>,
    pub plan_period: Option<i64>,
}

impl GenerationRequest {
    /// The requested plan length, defaulted when absent.
    pub fn plan_period_or_default(&self) -> i64 {
        self.plan_period.unwrap_or(DEFAULT_PLAN_PERIOD)
    }
}

fn check_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            min,
            max,
            actual: value,
        });
    }
    Ok(())
}

/// Validate a generation request.
///
/// Field ranges follow what the physical-metric formulas can sensibly
/// handle; a request outside them is rejected before any session exists.
pub fn validate_generation_request(request: &GenerationRequest) -> Result<(), ValidationError> {
    if let Some(ref device_id) = request.device_id {
        if device_id.len() > MAX_DEVICE_ID_LENGTH {
            return Err(ValidationError::TooLong {
                field: "device_id",
                max: MAX_DEVICE_ID_LENGTH,
                actual: device_id.len(),
            });
        }
    }

    check_range("age", request.age as f64, 1.0, 120.0)?;
    check_range("height", request.height, 50.0, 300.0)?;
    check_range("weight", request.weight, 20.0, 500.0)?;

    if request.gender != "male" && request.gender != "female" {
        return Err(ValidationError::InvalidChoice {
            field: "gender",
            allowed: "male, female",
        });
    }

    if request.activity_level.trim().is_empty() {
        return Err(ValidationError::Empty("activity_level"));
    }

    check_range("neck_circumference", request.neck_circumference, 10.0, 100.0)?;
    check_range("waist_circumference", request.waist_circumference, 30.0, 200.0)?;

    if let Some(hip) = request.hip_circumference {
        check_range("hip_circumference", hip, 30.0, 200.0)?;
    }

    if let Some(period) = request.plan_period {
        if !PLAN_PERIODS.contains(&period) {
            return Err(ValidationError::InvalidChoice {
                field: "plan_period",
                allowed: "7, 30",
            });
        }
    }

    Ok(())
}
