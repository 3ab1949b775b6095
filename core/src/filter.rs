//! Multi-criteria concert filter.
//!
//! [`FilterEngine::evaluate`] is a pure function: it never reorders its
//! input, keeps no state between calls, and costs
//! O(concerts × lineup size) per call.

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogIndex;
use crate::types::{Concert, GenreId, VenueId};

/// Sentinel the presentation layer uses for "no restriction".
pub const ALL: &str = "all";

/// Either every value passes, or only one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selection<T> {
    /// Pass everything
    #[default]
    All,
    /// Pass only this value
    Only(T),
}

impl<T: From<String>> Selection<T> {
    /// Parses a select-box value; empty or `"all"` means [`Selection::All`].
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.is_empty() || value == ALL {
            Self::All
        } else {
            Self::Only(T::from(value.to_string()))
        }
    }
}

impl<T: PartialEq> Selection<T> {
    /// Returns true if `value` passes this selection
    #[must_use]
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Self::All => true,
            Self::Only(only) => only == value,
        }
    }
}

/// User-composed concert query. Held by the caller, never by the core.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterQuery {
    /// Case-insensitive substring over title and venue name
    pub text: String,
    /// Genre restriction
    pub genre: Selection<GenreId>,
    /// Venue restriction
    pub venue: Selection<VenueId>,
}

impl FilterQuery {
    /// Query that passes every concert
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Sets the search text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Restricts to one genre
    #[must_use]
    pub fn with_genre(mut self, genre: impl Into<GenreId>) -> Self {
        self.genre = Selection::Only(genre.into());
        self
    }

    /// Restricts to one venue
    #[must_use]
    pub fn with_venue(mut self, venue: impl Into<VenueId>) -> Self {
        self.venue = Selection::Only(venue.into());
        self
    }

    /// Builds a query from raw form values (`"all"` for no restriction)
    #[must_use]
    pub fn from_form(text: &str, genre: &str, venue: &str) -> Self {
        Self {
            text: text.to_string(),
            genre: Selection::parse(genre),
            venue: Selection::parse(venue),
        }
    }
}

/// Stateless predicate evaluator over concerts.
#[derive(Clone, Copy, Debug, Default)]
pub struct FilterEngine;

impl FilterEngine {
    /// Returns the concerts matching every predicate of `query`, in input
    /// order.
    ///
    /// Concerts whose venue or lineup artists do not resolve in `index` fail
    /// the predicates that need them.
    #[must_use]
    pub fn evaluate<'a>(
        index: &CatalogIndex,
        concerts: &'a [Concert],
        query: &FilterQuery,
    ) -> Vec<&'a Concert> {
        let needle = query.text.to_lowercase();

        let matches: Vec<&Concert> = concerts
            .iter()
            .filter(|concert| {
                text_matches(index, concert, &needle)
                    && genre_matches(index, concert, &query.genre)
                    && query.venue.admits(&concert.venue_id)
            })
            .collect();

        tracing::debug!(
            text = %query.text,
            genre = ?query.genre,
            venue = ?query.venue,
            matched = matches.len(),
            total = concerts.len(),
            "Concert filter evaluated"
        );

        matches
    }

    /// Evaluates `query` over the catalog's own concerts.
    #[must_use]
    pub fn evaluate_all<'a>(index: &'a CatalogIndex, query: &FilterQuery) -> Vec<&'a Concert> {
        Self::evaluate(index, index.concerts(), query)
    }
}

fn text_matches(index: &CatalogIndex, concert: &Concert, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let Ok(venue) = index.venue(&concert.venue_id) else {
        return false;
    };
    format!("{} {}", concert.title, venue.name)
        .to_lowercase()
        .contains(needle)
}

fn genre_matches(index: &CatalogIndex, concert: &Concert, genre: &Selection<GenreId>) -> bool {
    match genre {
        Selection::All => true,
        Selection::Only(genre) => concert.lineup.iter().any(|slot| {
            index
                .artist(&slot.artist_id)
                .is_ok_and(|artist| artist.has_genre(genre))
        }),
    }
}
