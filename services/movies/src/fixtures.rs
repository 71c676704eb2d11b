//! Seed dataset loaded into an empty `movies` table when `MOVIES_SEED_FIXTURES` is set

use crate::models::movie::NewMovie;

const AVATAR_OVERVIEW: &str =
    "On the lush alien world of Pandora live the Na'vi, beings who appear primitive but are highly evolved...";

/// The seed rows. The two entries are identical on purpose: titles are not unique.
pub fn seed_movies() -> Vec<NewMovie> {
    (0..2)
        .map(|_| NewMovie {
            id: None,
            title: "Avatar".to_string(),
            overview: AVATAR_OVERVIEW.to_string(),
            year: 2009,
            rating: 7.8,
            category: "Acción".to_string(),
        })
        .collect()
}
