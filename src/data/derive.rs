//! Derivation rules: raw cells in, one [`Movie`] out.
//!
//! Everything here is a pure function of a single source row. Malformed
//! cells never fail a row; they degrade to null (or to the `0` sentinel for
//! budget and revenue) and are reported back to the caller.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use super::model::{Column, Movie, Value};

/// Separator between labels in the raw `genres` string.
pub const GENRE_DELIMITER: char = '|';

/// Primary genre of rows without any genre label.
pub const UNKNOWN_GENRE: &str = "Unknown";

static NULL: Value = Value::Null;

// ---------------------------------------------------------------------------
// RawMovie – the required cells of one source row
// ---------------------------------------------------------------------------

/// Required raw cells of one source row, keyed by column.
/// Absent cells read as [`Value::Null`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMovie {
    cells: BTreeMap<Column, Value>,
}

impl RawMovie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter, mostly for fixtures.
    pub fn with(mut self, column: Column, value: impl Into<Value>) -> Self {
        self.set(column, value.into());
        self
    }

    pub fn set(&mut self, column: Column, value: Value) {
        self.cells.insert(column, value);
    }

    pub fn get(&self, column: Column) -> &Value {
        self.cells.get(&column).unwrap_or(&NULL)
    }
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

enum Cell<T> {
    Present(T),
    Missing,
    Malformed,
}

fn number_cell(value: &Value) -> Cell<f64> {
    match value {
        Value::Null => Cell::Missing,
        Value::Integer(i) => Cell::Present(*i as f64),
        // `+ 0.0` folds a `-0` cell into `0`
        Value::Float(f) if f.is_finite() => Cell::Present(*f + 0.0),
        Value::Text(s) if s.trim().is_empty() => Cell::Missing,
        Value::Text(s) => match s.trim().parse::<f64>() {
            Ok(f) if f.is_finite() => Cell::Present(f + 0.0),
            _ => Cell::Malformed,
        },
        _ => Cell::Malformed,
    }
}

fn text_cell(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Text(s) if s.trim().is_empty() => None,
        Value::Text(s) => Some(s.clone()),
        Value::Float(f) => Some(f.to_string()),
        other => Some(other.to_string()),
    }
}

fn date_cell(value: &Value) -> Cell<NaiveDate> {
    match value {
        Value::Null => Cell::Missing,
        Value::Date(d) => Cell::Present(*d),
        Value::Text(s) if s.trim().is_empty() => Cell::Missing,
        Value::Text(s) => match parse_release_date(s) {
            Some(d) => Cell::Present(d),
            None => Cell::Malformed,
        },
        _ => Cell::Malformed,
    }
}

/// Collects the columns whose cells had to be degraded.
#[derive(Default)]
struct Coercer {
    degraded: Vec<Column>,
}

impl Coercer {
    fn number(&mut self, raw: &RawMovie, column: Column) -> Option<f64> {
        match number_cell(raw.get(column)) {
            Cell::Present(v) => Some(v),
            Cell::Missing => None,
            Cell::Malformed => {
                self.degraded.push(column);
                None
            }
        }
    }

    fn date(&mut self, raw: &RawMovie, column: Column) -> Option<NaiveDate> {
        match date_cell(raw.get(column)) {
            Cell::Present(d) => Some(d),
            Cell::Missing => None,
            Cell::Malformed => {
                self.degraded.push(column);
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Result of deriving one row.
#[derive(Debug, Clone, PartialEq)]
pub struct Derived {
    pub movie: Movie,
    /// Columns whose cells were present but unusable.
    pub degraded: Vec<Column>,
}

/// Build a [`Movie`] with all derived columns from one raw row.
pub fn derive_movie(raw: &RawMovie) -> Derived {
    let mut c = Coercer::default();

    let budget = c.number(raw, Column::Budget).unwrap_or(0.0);
    let revenue = c.number(raw, Column::Revenue).unwrap_or(0.0);
    let vote_average = c.number(raw, Column::VoteAverage);
    let vote_count = c.number(raw, Column::VoteCount);
    let popularity = c.number(raw, Column::Popularity);
    let runtime = c.number(raw, Column::Runtime);
    let release_date = c.date(raw, Column::ReleaseDate);

    let genres_raw = text_cell(raw.get(Column::Genres));
    let genres = split_genres(genres_raw.as_deref());
    let primary_genre = primary_genre(&genres);

    let profit = profit(budget, revenue);
    let year = release_date.map(|d| d.year());

    let movie = Movie {
        title: text_cell(raw.get(Column::Title)).unwrap_or_default(),
        budget,
        revenue,
        vote_average,
        vote_count,
        popularity,
        runtime,
        release_date,
        genres_raw,
        genres,
        director: text_cell(raw.get(Column::Director)),
        tagline: text_cell(raw.get(Column::Tagline)),
        overview: text_cell(raw.get(Column::Overview)),
        profit,
        roi: roi(budget, profit),
        year,
        month: release_date.map(|d| d.month()),
        decade: decade(year),
        is_profitable: profit > 0.0,
        primary_genre,
    };

    Derived {
        movie,
        degraded: c.degraded,
    }
}

pub fn profit(budget: f64, revenue: f64) -> f64 {
    revenue - budget
}

/// Percent return on budget, `0` when there is no positive budget.
pub fn roi(budget: f64, profit: f64) -> f64 {
    if budget > 0.0 {
        profit / budget * 100.0
    } else {
        0.0
    }
}

pub fn decade(year: Option<i32>) -> Option<i32> {
    year.map(|y| y.div_euclid(10) * 10)
}

/// Parse a release date in `YYYY-MM-DD`, `M/D/YYYY` or `M/D/YY` form.
/// A trailing time part (`2015-06-09 00:00:00`, `2015-06-09T00:00`) is ignored.
pub fn parse_release_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    let s = s.split(['T', ' ']).next().unwrap_or(s);
    if s.contains('-') {
        return NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
    }
    let year_part = s.rsplit('/').next()?;
    let format = if year_part.len() == 2 {
        "%m/%d/%y"
    } else {
        "%m/%d/%Y"
    };
    NaiveDate::parse_from_str(s, format).ok()
}

/// Split the raw genre string into trimmed, non-empty labels.
pub fn split_genres(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(GENRE_DELIMITER)
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

pub fn primary_genre(genres: &[String]) -> String {
    genres
        .first()
        .cloned()
        .unwrap_or_else(|| UNKNOWN_GENRE.to_string())
}
