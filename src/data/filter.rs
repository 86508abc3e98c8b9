use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::error::{DataError, Result};
use super::model::Movie;
use super::table::MovieTable;

// ---------------------------------------------------------------------------
// Thresholds – the tunable business rules behind the quick filters
// ---------------------------------------------------------------------------

/// Cut-offs used by the blockbuster and hidden-gem quick filters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Revenue a movie must exceed to count as a blockbuster.
    pub blockbuster_revenue: f64,
    /// Budget a hidden gem must stay under.
    pub hidden_gem_max_budget: f64,
    /// Minimum rating of a hidden gem.
    pub hidden_gem_min_rating: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            blockbuster_revenue: 500_000_000.0,
            hidden_gem_max_budget: 20_000_000.0,
            hidden_gem_min_rating: 7.0,
        }
    }
}

// ---------------------------------------------------------------------------
// FilterSpec – which rows to keep
// ---------------------------------------------------------------------------

/// Declarative row filter. Every unset option is "no constraint"; active
/// options combine with logical AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    /// Inclusive release year bounds; rows without a year never match.
    pub year_range: Option<(i32, i32)>,
    /// Inclusive budget bounds in dollars.
    pub budget_range: Option<(f64, f64)>,
    /// Rows without a rating never match.
    pub min_rating: Option<f64>,
    /// Primary genres to keep; empty keeps every genre.
    pub genres: BTreeSet<String>,
    pub profitable_only: bool,
    pub blockbusters_only: bool,
    pub hidden_gems_only: bool,
    pub thresholds: Thresholds,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn year_range(mut self, min: i32, max: i32) -> Self {
        self.year_range = Some((min, max));
        self
    }

    pub fn budget_range(mut self, min: f64, max: f64) -> Self {
        self.budget_range = Some((min, max));
        self
    }

    pub fn min_rating(mut self, rating: f64) -> Self {
        self.min_rating = Some(rating);
        self
    }

    pub fn genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn profitable_only(mut self, on: bool) -> Self {
        self.profitable_only = on;
        self
    }

    pub fn blockbusters_only(mut self, on: bool) -> Self {
        self.blockbusters_only = on;
        self
    }

    pub fn hidden_gems_only(mut self, on: bool) -> Self {
        self.hidden_gems_only = on;
        self
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Reject ranges whose lower bound exceeds the upper bound.
    pub fn validate(&self) -> Result<()> {
        if let Some((min, max)) = self.year_range {
            if min > max {
                return Err(DataError::InvalidRange {
                    option: "year_range",
                    min: min as f64,
                    max: max as f64,
                });
            }
        }
        if let Some((min, max)) = self.budget_range {
            if min > max || min.is_nan() || max.is_nan() {
                return Err(DataError::InvalidRange {
                    option: "budget_range",
                    min,
                    max,
                });
            }
        }
        Ok(())
    }

    /// Whether a single row passes every active constraint.
    pub fn matches(&self, movie: &Movie) -> bool {
        if let Some((min, max)) = self.year_range {
            match movie.year {
                Some(y) if min <= y && y <= max => {}
                _ => return false,
            }
        }
        if let Some((min, max)) = self.budget_range {
            if !(min <= movie.budget && movie.budget <= max) {
                return false;
            }
        }
        if let Some(min_rating) = self.min_rating {
            if !movie.vote_average.is_some_and(|r| r >= min_rating) {
                return false;
            }
        }
        if !self.genres.is_empty() && !self.genres.contains(&movie.primary_genre) {
            return false;
        }
        if self.profitable_only && !movie.is_profitable {
            return false;
        }
        if self.blockbusters_only && movie.revenue <= self.thresholds.blockbuster_revenue {
            return false;
        }
        if self.hidden_gems_only {
            let cheap = movie.budget < self.thresholds.hidden_gem_max_budget;
            let acclaimed = movie
                .vote_average
                .is_some_and(|r| r >= self.thresholds.hidden_gem_min_rating);
            if !(cheap && acclaimed) {
                return false;
            }
        }
        true
    }
}

/// Return the rows of `table` that pass `spec`, original order preserved.
///
/// An invalid spec is rejected as a whole; no partially filtered view is
/// produced.
pub fn filter(table: &MovieTable, spec: &FilterSpec) -> Result<MovieTable> {
    spec.validate()?;
    Ok(table.where_(|m| spec.matches(m)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::derive::{derive_movie, RawMovie};
    use crate::data::model::Column;

    fn movie(title: &str, budget: f64, revenue: f64, rating: f64, genres: &str, date: &str) -> Movie {
        let mut raw = RawMovie::new()
            .with(Column::Title, title)
            .with(Column::Budget, budget)
            .with(Column::Revenue, revenue)
            .with(Column::VoteAverage, rating)
            .with(Column::ReleaseDate, date);
        if !genres.is_empty() {
            raw = raw.with(Column::Genres, genres);
        }
        derive_movie(&raw).movie
    }

    fn table() -> MovieTable {
        MovieTable::from_movies(vec![
            movie("Titan", 200e6, 900e6, 7.5, "Action|Adventure", "2012-05-04"),
            movie("Small Wonder", 5e6, 40e6, 8.1, "Drama", "2003-10-10"),
            movie("Flop", 90e6, 20e6, 4.2, "Comedy", "1998-02-02"),
            movie("Undated", 1e6, 3e6, 7.2, "Drama", "tbd"),
            movie("Sequel Hit", 150e6, 600e6, 0.0, "", "2015-07-01"),
        ])
    }

    #[test]
    fn empty_spec_keeps_everything() {
        let t = table();
        assert_eq!(filter(&t, &FilterSpec::new()).unwrap(), t);
    }

    #[test]
    fn year_range_drops_rows_without_year() {
        let v = filter(&table(), &FilterSpec::new().year_range(1990, 2020)).unwrap();
        assert_eq!(v.titles(), vec!["Titan", "Small Wonder", "Flop", "Sequel Hit"]);
    }

    #[test]
    fn budget_range_is_inclusive() {
        let v = filter(&table(), &FilterSpec::new().budget_range(5e6, 150e6)).unwrap();
        assert_eq!(v.titles(), vec!["Small Wonder", "Flop", "Sequel Hit"]);
    }

    #[test]
    fn genre_set_matches_primary_genre() {
        let v = filter(&table(), &FilterSpec::new().genres(["Drama", "Unknown"])).unwrap();
        assert_eq!(v.titles(), vec!["Small Wonder", "Undated", "Sequel Hit"]);
        // "Adventure" is only a secondary genre of Titan.
        let v = filter(&table(), &FilterSpec::new().genres(["Adventure"])).unwrap();
        assert!(v.is_empty());
    }

    #[test]
    fn quick_filters() {
        let t = table();
        let profitable = filter(&t, &FilterSpec::new().profitable_only(true)).unwrap();
        assert_eq!(profitable.titles(), vec!["Titan", "Small Wonder", "Undated", "Sequel Hit"]);

        let blockbusters = filter(&t, &FilterSpec::new().blockbusters_only(true)).unwrap();
        assert_eq!(blockbusters.titles(), vec!["Titan", "Sequel Hit"]);

        let gems = filter(&t, &FilterSpec::new().hidden_gems_only(true)).unwrap();
        assert_eq!(gems.titles(), vec!["Small Wonder", "Undated"]);
    }

    #[test]
    fn thresholds_are_configurable() {
        let strict = Thresholds {
            blockbuster_revenue: 800e6,
            ..Thresholds::default()
        };
        let v = filter(
            &table(),
            &FilterSpec::new().blockbusters_only(true).with_thresholds(strict),
        )
        .unwrap();
        assert_eq!(v.titles(), vec!["Titan"]);
    }

    #[test]
    fn inverted_ranges_are_rejected() {
        let err = filter(&table(), &FilterSpec::new().year_range(2010, 2000)).unwrap_err();
        assert!(matches!(
            err,
            DataError::InvalidRange { option: "year_range", .. }
        ));
        let err = filter(&table(), &FilterSpec::new().budget_range(10.0, 1.0)).unwrap_err();
        assert!(matches!(
            err,
            DataError::InvalidRange { option: "budget_range", .. }
        ));
    }

    #[test]
    fn no_matches_is_an_empty_table() {
        let v = filter(&table(), &FilterSpec::new().min_rating(9.5)).unwrap();
        assert!(v.is_empty());
    }
}
