//! Movie models for the API service

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

pub const MAX_TITLE_LENGTH: u64 = 15;
pub const MAX_YEAR: i32 = 2023;
pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 10.0;

/// Movie as stored in the `movies` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub overview: String,
    pub year: i32,
    pub rating: f64,
    pub category: String,
}

/// A movie that passed validation and can be written to the store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMovie {
    /// Requested id; the store assigns one when absent
    pub id: Option<i64>,
    pub title: String,
    pub overview: String,
    pub year: i32,
    pub rating: f64,
    pub category: String,
}

impl NewMovie {
    /// Whether a stored row holds exactly these values, ignoring the id
    pub fn matches(&self, movie: &Movie) -> bool {
        self.title == movie.title
            && self.overview == movie.overview
            && self.year == movie.year
            && self.rating == movie.rating
            && self.category == movie.category
    }
}

/// Movie payload as received on `POST /movies` and `PUT /movies/:id`
///
/// Every field is optional at the shape level so that a missing field is
/// reported together with the other violations.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct MovieInput {
    pub id: Option<i64>,

    #[validate(
        required(message = "field required"),
        length(max = 15, message = "title must be at most 15 characters")
    )]
    pub title: Option<String>,

    #[validate(required(message = "field required"))]
    pub overview: Option<String>,

    #[validate(
        required(message = "field required"),
        range(max = 2023, message = "year must be 2023 or earlier")
    )]
    pub year: Option<i32>,

    #[validate(
        required(message = "field required"),
        range(min = 1.0, max = 10.0, message = "rating must be between 1.0 and 10.0")
    )]
    pub rating: Option<f64>,

    #[validate(required(message = "field required"))]
    pub category: Option<String>,
}
