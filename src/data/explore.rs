use std::collections::BTreeMap;

use super::aggregate::{genre_stats, median, summary, top_n, GenreStats, Summary};
use super::error::{DataError, Result};
use super::model::{Column, Movie, Value};
use super::table::MovieTable;

// ---------------------------------------------------------------------------
// Custom chart builder
// ---------------------------------------------------------------------------

/// Column choices of the custom scatter chart. Axes and marker size must be
/// numeric; colours come from a grouping column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartAxes {
    pub x: Column,
    pub y: Column,
    pub color_by: Column,
    pub size_by: Column,
}

impl Default for ChartAxes {
    fn default() -> Self {
        Self {
            x: Column::Budget,
            y: Column::Revenue,
            color_by: Column::PrimaryGenre,
            size_by: Column::Popularity,
        }
    }
}

impl ChartAxes {
    pub fn new(x: Column, y: Column, color_by: Column, size_by: Column) -> Result<Self> {
        let axes = ChartAxes {
            x,
            y,
            color_by,
            size_by,
        };
        axes.validate()?;
        Ok(axes)
    }

    pub fn validate(&self) -> Result<()> {
        for (column, role) in [(self.x, "x axis"), (self.y, "y axis"), (self.size_by, "marker size")] {
            if !column.is_numeric() {
                return Err(DataError::UnsupportedColumn {
                    column: column.name(),
                    role,
                });
            }
        }
        if !Column::GROUPINGS.contains(&self.color_by) {
            return Err(DataError::UnsupportedColumn {
                column: self.color_by.name(),
                role: "colour key",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub title: String,
    pub x: f64,
    pub y: f64,
    /// `None` when the size column is null for this row.
    pub size: Option<f64>,
}

/// Points of the custom chart grouped by colour key. Only rows with a
/// positive `x` and a non-zero `y` are plotted, and at most `limit` of them
/// in view order. Rows with a null colour key are grouped under
/// [`Value::Null`].
pub fn scatter(
    table: &MovieTable,
    axes: &ChartAxes,
    limit: usize,
) -> Result<BTreeMap<Value, Vec<ScatterPoint>>> {
    axes.validate()?;
    let mut series: BTreeMap<Value, Vec<ScatterPoint>> = BTreeMap::new();
    let plotted = table.iter().filter_map(|m| {
        let x = m.number(axes.x).filter(|&x| x > 0.0)?;
        let y = m.number(axes.y).filter(|&y| y != 0.0)?;
        Some((m, x, y))
    });
    for (movie, x, y) in plotted.take(limit) {
        series
            .entry(movie.value(axes.color_by))
            .or_default()
            .push(ScatterPoint {
                title: movie.title.clone(),
                x,
                y,
                size: movie.number(axes.size_by),
            });
    }
    Ok(series)
}

// ---------------------------------------------------------------------------
// Side-by-side comparison
// ---------------------------------------------------------------------------

/// Metrics shown when two movies are compared.
pub const COMPARISON_METRICS: [Column; 5] = [
    Column::Budget,
    Column::Revenue,
    Column::Profit,
    Column::VoteAverage,
    Column::Popularity,
];

/// Titles offered for comparison: the `n` highest grossing rows.
pub fn comparison_candidates(table: &MovieTable, n: usize) -> MovieTable {
    top_n(table, Column::Revenue, n, false)
}

/// `(metric, first, second)` for every comparison metric.
pub fn compare(first: &Movie, second: &Movie) -> Vec<(Column, Option<f64>, Option<f64>)> {
    COMPARISON_METRICS
        .iter()
        .map(|&c| (c, first.number(c), second.number(c)))
        .collect()
}

// ---------------------------------------------------------------------------
// Genre deep dive
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GenreDeepDive {
    pub genre: String,
    pub summary: Summary,
    /// `None` when no row has this primary genre.
    pub stats: Option<GenreStats>,
    pub median_revenue: Option<f64>,
    pub median_budget: Option<f64>,
    /// Highest grossing rows of the genre.
    pub top: MovieTable,
}

/// Statistics of the rows whose primary genre is `genre`.
pub fn genre_deep_dive(table: &MovieTable, genre: &str, top: usize) -> GenreDeepDive {
    let rows = table.where_(|m| m.primary_genre == genre);
    GenreDeepDive {
        genre: genre.to_string(),
        summary: summary(&rows),
        stats: genre_stats(&rows).into_iter().next(),
        median_revenue: median(&rows, Column::Revenue),
        median_budget: median(&rows, Column::Budget),
        top: top_n(&rows, Column::Revenue, top, false),
    }
}
