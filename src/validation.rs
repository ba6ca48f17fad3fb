//! Request-shape validation for list endpoints.
//!
//! Runs before the filter dispatcher and rejects structurally invalid
//! parameters (page size, radius, sort tokens, inverted ranges) with a 422
//! that names the offending field. Filter *values* are not checked here: a
//! malformed value only disables its own predicate.

use sea_orm::EntityTrait;
use serde::Serialize;
use std::fmt;

use crate::filtering::conditions::{parse_date, parse_number};
use crate::filtering::geo::{MAX_RADIUS_KM, MIN_RADIUS_KM};
use crate::filtering::pagination::{MAX_PER_PAGE, MIN_PER_PAGE};
use crate::filtering::spec::FilterSpec;
use crate::models::ParameterMap;

/// Validation error with field name and message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// The parameter that failed validation
    pub field: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Record the error of a validator, if any.
    pub fn check(&mut self, outcome: Result<(), ValidationError>) {
        if let Err(error) = outcome {
            self.add(error);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Convert to Result
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed with {} error(s):", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Helper validators for query-string values
pub mod validators {
    use super::ValidationError;
    use std::fmt;
    use std::str::FromStr;

    /// Parse a value, naming the field on failure.
    pub fn parse<T: FromStr>(field: &str, value: &str, expected: &str) -> Result<T, ValidationError> {
        value
            .trim()
            .parse::<T>()
            .map_err(|_| ValidationError::new(field, format!("Must be {expected}")))
    }

    /// Validate number is within range
    pub fn validate_range<T: PartialOrd + fmt::Display>(
        field: &str,
        value: T,
        min: Option<T>,
        max: Option<T>,
    ) -> Result<(), ValidationError> {
        if let Some(min_val) = min {
            if value < min_val {
                return Err(ValidationError::new(field, format!("Must be at least {min_val}")));
            }
        }

        if let Some(max_val) = max {
            if value > max_val {
                return Err(ValidationError::new(field, format!("Must be at most {max_val}")));
            }
        }

        Ok(())
    }

    /// Validate value is one of an allow-list (case-insensitive)
    pub fn validate_one_of(field: &str, value: &str, allowed: &[&str]) -> Result<(), ValidationError> {
        let value = value.trim();
        if allowed.iter().any(|candidate| candidate.eq_ignore_ascii_case(value)) {
            Ok(())
        } else {
            Err(ValidationError::new(
                field,
                format!("Must be one of: {}", allowed.join(", ")),
            ))
        }
    }
}

use validators::{parse, validate_one_of, validate_range};

fn present<'a>(params: &'a ParameterMap, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn validate_integer_range(field: &str, value: &str, min: u64, max: Option<u64>) -> Result<(), ValidationError> {
    let number: i64 = parse(field, value, "an integer")?;
    let min = i64::try_from(min).unwrap_or(i64::MAX);
    let max = max.map(|max| i64::try_from(max).unwrap_or(i64::MAX));
    validate_range(field, number, Some(min), max)
}

fn validate_number_range(field: &str, value: &str, min: f64, max: f64) -> Result<(), ValidationError> {
    let number: f64 = parse(field, value, "a number")?;
    if !number.is_finite() {
        return Err(ValidationError::new(field, "Must be a number"));
    }
    validate_range(field, number, Some(min), Some(max))
}

/// Whether a `min`/`max` pair is inverted. Two dates compare as dates,
/// anything else as numbers. Pairs that parse as neither are left to the
/// filters, which ignore malformed values.
fn is_inverted(min: &str, max: &str) -> bool {
    if let (Some(min), Some(max)) = (parse_date(min), parse_date(max)) {
        return max < min;
    }
    match (parse_number(min), parse_number(max)) {
        (Some(min), Some(max)) => max < min,
        _ => false,
    }
}

/// Check the structural parameters of a list request against `spec`.
///
/// Every failing field is reported, not just the first one.
pub fn validate_list_params<E: EntityTrait>(
    spec: &FilterSpec<E>,
    params: &ParameterMap,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if let Some(per_page) = present(params, "per_page") {
        errors.check(validate_integer_range(
            "per_page",
            per_page,
            MIN_PER_PAGE,
            Some(MAX_PER_PAGE),
        ));
    }
    if let Some(page) = present(params, "page") {
        errors.check(validate_integer_range("page", page, 1, None));
    }
    if let Some(order) = present(params, "order") {
        errors.check(validate_one_of("order", order, &["asc", "desc"]));
    }
    if let Some(sort) = present(params, "sort") {
        let sortable: Vec<&str> = spec.sortable_columns().iter().map(|(name, _)| *name).collect();
        errors.check(validate_one_of("sort", sort, &sortable));
    }

    let recognizes = |name: &str| spec.handler(name).is_some();
    if recognizes("trashed") {
        if let Some(trashed) = present(params, "trashed") {
            errors.check(validate_one_of("trashed", trashed, &["with", "only"]));
        }
    }
    if recognizes("near_lat") {
        if let Some(radius) = present(params, "radius") {
            errors.check(validate_number_range("radius", radius, MIN_RADIUS_KM, MAX_RADIUS_KM));
        }
        if let Some(lat) = present(params, "near_lat") {
            errors.check(validate_number_range("near_lat", lat, -90.0, 90.0));
        }
        if let Some(lng) = present(params, "near_lng") {
            errors.check(validate_number_range("near_lng", lng, -180.0, 180.0));
        }
    }

    for (min_name, max_name) in spec.ranges() {
        if let (Some(min), Some(max)) = (present(params, min_name), present(params, max_name)) {
            if is_inverted(min, max) {
                errors.add(ValidationError::new(
                    *max_name,
                    format!("Must be greater than or equal to {min_name}"),
                ));
            }
        }
    }

    if !errors.is_empty() {
        tracing::debug!(spec = spec.name(), errors = %errors, "Rejected list parameters");
    }
    errors.result()
}
