//! Input validation utilities

use serde::Serialize;
use validator::{Validate, ValidationErrors};

use crate::models::{LoginRequest, MovieQuery, movie::{MovieInput, NewMovie}};

/// A single violated constraint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every constraint an input broke, sorted by field name
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}", summary(.violations))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

fn summary(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    fn from_violations(mut violations: Vec<Violation>) -> Self {
        violations.sort_by(|a, b| a.field.cmp(&b.field).then(a.message.cmp(&b.message)));
        Self { violations }
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::from_violations(vec![Violation::new(field, message)])
    }
}

impl From<ValidationErrors> for ValidationError {
    fn from(errors: ValidationErrors) -> Self {
        let violations = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    Violation::new(field.to_string(), message)
                })
            })
            .collect();

        Self::from_violations(violations)
    }
}

/// Validate a movie payload
pub fn validate_movie(input: MovieInput) -> Result<NewMovie, ValidationError> {
    input.validate()?;

    match (
        input.title,
        input.overview,
        input.year,
        input.rating,
        input.category,
    ) {
        (Some(title), Some(overview), Some(year), Some(rating), Some(category)) => Ok(NewMovie {
            id: input.id,
            title,
            overview,
            year,
            rating,
            category,
        }),
        _ => Err(ValidationError::single("movie", "incomplete record")),
    }
}

/// Validate the category and year lookup parameters
pub fn validate_search(query: &MovieQuery) -> Result<(String, i32), ValidationError> {
    let mut violations = Vec::new();

    let category = match query.category.as_deref() {
        Some(category) => Some(category.to_string()),
        None => {
            violations.push(Violation::new("category", "field required"));
            None
        }
    };

    let year = match query.year.as_deref().map(str::trim) {
        Some(year) => match year.parse::<i32>() {
            Ok(year) => Some(year),
            Err(_) => {
                violations.push(Violation::new("year", "year must be an integer"));
                None
            }
        },
        None => {
            violations.push(Violation::new("year", "field required"));
            None
        }
    };

    match (category, year) {
        (Some(category), Some(year)) => Ok((category, year)),
        _ => Err(ValidationError::from_violations(violations)),
    }
}

/// Validate the shape of a login request
pub fn validate_login(request: &LoginRequest) -> Result<(), ValidationError> {
    let mut violations = Vec::new();

    if request.user.trim().is_empty() {
        violations.push(Violation::new("user", "User is required"));
    }

    if request.password.is_empty() {
        violations.push(Violation::new("password", "Password is required"));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::from_violations(violations))
    }
}
