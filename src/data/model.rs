use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use super::error::DataError;

// ---------------------------------------------------------------------------
// Value – a single cell, raw or derived
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
/// Group labels end up as `BTreeMap` keys, so `Value` must be `Ord`.
/// Floats compare by `total_cmp` with `-0.0` folded into `0.0`, so equality,
/// ordering and hashing agree.
#[derive(Debug, Clone)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Null,
}

// -- Manual Eq/Ord so we can put Value in BTreeMap keys --

fn canonical(f: f64) -> f64 {
    // -0.0 + 0.0 == +0.0
    f + 0.0
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Date(_) => 4,
                Text(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => canonical(*a).total_cmp(&canonical(*b)),
            (Date(a), Date(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Text(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => canonical(*f).to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Date(d) => d.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v:.2}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Null => write!(f, "<null>"),
        }
    }
}

impl Value {
    /// Interpret the value as an `f64` for numeric aggregation.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Full-precision text for delimited export; nulls become empty fields.
    pub fn to_field(&self) -> String {
        match self {
            Value::Float(v) => v.to_string(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    fn from_opt_f64(v: Option<f64>) -> Self {
        v.map(Value::Float).unwrap_or(Value::Null)
    }

    fn from_opt_str(s: Option<&str>) -> Self {
        s.map(|s| Value::Text(s.to_string())).unwrap_or(Value::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

// ---------------------------------------------------------------------------
// Movie – one row of the derived table
// ---------------------------------------------------------------------------

/// One movie: the raw fields as coerced at load time plus the derived
/// columns. Built once by the loader and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    pub title: String,
    /// Dollars; missing or non-numeric cells hold the `0` sentinel.
    pub budget: f64,
    /// Dollars; missing or non-numeric cells hold the `0` sentinel.
    pub revenue: f64,
    pub vote_average: Option<f64>,
    pub vote_count: Option<f64>,
    pub popularity: Option<f64>,
    /// Minutes.
    pub runtime: Option<f64>,
    pub release_date: Option<NaiveDate>,
    /// The `|`-joined genre string as it appeared in the source.
    pub genres_raw: Option<String>,
    /// Split, trimmed genre labels in source order.
    pub genres: Vec<String>,
    pub director: Option<String>,
    pub tagline: Option<String>,
    pub overview: Option<String>,

    pub profit: f64,
    /// Percent. `0` when `budget` is not positive: a sentinel, not break-even.
    pub roi: f64,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub decade: Option<i32>,
    pub is_profitable: bool,
    /// Never empty: the first genre label or `"Unknown"`.
    pub primary_genre: String,
}

impl Movie {
    /// Read any column of this row as a [`Value`].
    pub fn value(&self, column: Column) -> Value {
        match column {
            Column::Title => Value::Text(self.title.clone()),
            Column::Budget => Value::Float(self.budget),
            Column::Revenue => Value::Float(self.revenue),
            Column::VoteAverage => Value::from_opt_f64(self.vote_average),
            Column::VoteCount => Value::from_opt_f64(self.vote_count),
            Column::Popularity => Value::from_opt_f64(self.popularity),
            Column::Runtime => Value::from_opt_f64(self.runtime),
            Column::ReleaseDate => self.release_date.map(Value::Date).unwrap_or(Value::Null),
            Column::Genres => Value::from_opt_str(self.genres_raw.as_deref()),
            Column::Director => Value::from_opt_str(self.director.as_deref()),
            Column::Tagline => Value::from_opt_str(self.tagline.as_deref()),
            Column::Overview => Value::from_opt_str(self.overview.as_deref()),
            Column::Profit => Value::Float(self.profit),
            Column::Roi => Value::Float(self.roi),
            Column::Year => self.year.map(|y| Value::Integer(y as i64)).unwrap_or(Value::Null),
            Column::Month => self.month.map(|m| Value::Integer(m as i64)).unwrap_or(Value::Null),
            Column::Decade => self.decade.map(|d| Value::Integer(d as i64)).unwrap_or(Value::Null),
            Column::IsProfitable => Value::Bool(self.is_profitable),
            Column::PrimaryGenre => Value::Text(self.primary_genre.clone()),
        }
    }

    /// Numeric view of a column; `None` for nulls and non-numeric columns.
    pub fn number(&self, column: Column) -> Option<f64> {
        match column {
            Column::Budget => Some(self.budget),
            Column::Revenue => Some(self.revenue),
            Column::VoteAverage => self.vote_average,
            Column::VoteCount => self.vote_count,
            Column::Popularity => self.popularity,
            Column::Runtime => self.runtime,
            Column::Profit => Some(self.profit),
            Column::Roi => Some(self.roi),
            Column::Year => self.year.map(f64::from),
            Column::Month => self.month.map(f64::from),
            Column::Decade => self.decade.map(f64::from),
            _ => None,
        }
    }

    /// Release year as shown in labels (`N/A` when unknown).
    pub fn year_label(&self) -> String {
        self.year.map(|y| y.to_string()).unwrap_or_else(|| "N/A".to_string())
    }
}

// ---------------------------------------------------------------------------
// Column – the closed set of addressable columns
// ---------------------------------------------------------------------------

/// Every column a caller may name. Axis pickers and group selectors choose
/// from this list instead of passing free-form strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Title,
    Budget,
    Revenue,
    VoteAverage,
    VoteCount,
    Popularity,
    Runtime,
    ReleaseDate,
    Genres,
    Director,
    Tagline,
    Overview,
    Profit,
    Roi,
    Year,
    Month,
    Decade,
    IsProfitable,
    PrimaryGenre,
}

impl Column {
    /// Columns the raw source must provide, in canonical order.
    pub const RAW: [Column; 12] = [
        Column::Title,
        Column::Budget,
        Column::Revenue,
        Column::VoteAverage,
        Column::VoteCount,
        Column::Popularity,
        Column::Runtime,
        Column::ReleaseDate,
        Column::Genres,
        Column::Director,
        Column::Tagline,
        Column::Overview,
    ];

    /// Columns computed by the loader.
    pub const DERIVED: [Column; 7] = [
        Column::Profit,
        Column::Roi,
        Column::Year,
        Column::Month,
        Column::Decade,
        Column::IsProfitable,
        Column::PrimaryGenre,
    ];

    /// Numeric columns offered for chart axes and rankings.
    pub const NUMERIC_AXES: [Column; 11] = [
        Column::Budget,
        Column::Revenue,
        Column::Profit,
        Column::Roi,
        Column::VoteAverage,
        Column::VoteCount,
        Column::Popularity,
        Column::Runtime,
        Column::Year,
        Column::Month,
        Column::Decade,
    ];

    /// Columns offered as grouping / colour-by keys.
    pub const GROUPINGS: [Column; 7] = [
        Column::PrimaryGenre,
        Column::Genres,
        Column::Director,
        Column::Year,
        Column::Month,
        Column::Decade,
        Column::IsProfitable,
    ];

    pub fn all() -> impl Iterator<Item = Column> {
        Column::RAW.into_iter().chain(Column::DERIVED)
    }

    /// Column name as it appears in sources and exports.
    pub fn name(self) -> &'static str {
        match self {
            Column::Title => "original_title",
            Column::Budget => "budget",
            Column::Revenue => "revenue",
            Column::VoteAverage => "vote_average",
            Column::VoteCount => "vote_count",
            Column::Popularity => "popularity",
            Column::Runtime => "runtime",
            Column::ReleaseDate => "release_date",
            Column::Genres => "genres",
            Column::Director => "director",
            Column::Tagline => "tagline",
            Column::Overview => "overview",
            Column::Profit => "profit",
            Column::Roi => "roi",
            Column::Year => "year",
            Column::Month => "month",
            Column::Decade => "decade",
            Column::IsProfitable => "is_profitable",
            Column::PrimaryGenre => "primary_genre",
        }
    }

    /// Human-readable label for axis titles and headers.
    pub fn label(self) -> &'static str {
        match self {
            Column::Title => "Title",
            Column::Budget => "Budget",
            Column::Revenue => "Revenue",
            Column::VoteAverage => "Rating",
            Column::VoteCount => "Votes",
            Column::Popularity => "Popularity",
            Column::Runtime => "Runtime",
            Column::ReleaseDate => "Release Date",
            Column::Genres => "Genres",
            Column::Director => "Director",
            Column::Tagline => "Tagline",
            Column::Overview => "Overview",
            Column::Profit => "Profit",
            Column::Roi => "ROI",
            Column::Year => "Year",
            Column::Month => "Month",
            Column::Decade => "Decade",
            Column::IsProfitable => "Profitable",
            Column::PrimaryGenre => "Primary Genre",
        }
    }

    pub fn is_numeric(self) -> bool {
        Column::NUMERIC_AXES.contains(&self)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Column {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Column::all()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| DataError::UnknownColumn(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names_round_trip_through_from_str() {
        for col in Column::all() {
            assert_eq!(col.name().parse::<Column>().unwrap(), col);
        }
    }

    #[test]
    fn unknown_column_is_rejected() {
        let err = "box_office".parse::<Column>().unwrap_err();
        assert!(matches!(err, DataError::UnknownColumn(name) if name == "box_office"));
    }

    #[test]
    fn negative_zero_is_the_same_key_as_zero() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let hash = |v: &Value| {
            let mut h = DefaultHasher::new();
            v.hash(&mut h);
            h.finish()
        };
        let (pos, neg) = (Value::Float(0.0), Value::Float(-0.0));
        assert_eq!(pos, neg);
        assert_eq!(pos.cmp(&neg), std::cmp::Ordering::Equal);
        assert_eq!(hash(&pos), hash(&neg));
        assert_ne!(Value::Float(1.0), Value::Float(-1.0));
    }

    #[test]
    fn value_ordering_groups_by_kind_first() {
        let mut values = vec![
            Value::Text("Drama".into()),
            Value::Integer(2010),
            Value::Null,
            Value::Integer(2005),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Integer(2005),
                Value::Integer(2010),
                Value::Text("Drama".into()),
            ]
        );
    }

    #[test]
    fn export_fields_keep_full_precision() {
        assert_eq!(Value::Float(1234.5678).to_field(), "1234.5678");
        assert_eq!(Value::Null.to_field(), "");
        assert_eq!(Value::Float(1234.5678).to_string(), "1234.57");
    }
}
