//! Batch analysis report: data-quality and headline statistics for a whole
//! movie table, rendered as plain text.

use std::fmt;

use serde::Serialize;

use crate::data::aggregate::{
    self, describe, genre_label_counts, group_count, group_mean, group_sum, median,
    pairwise_correlation, top_n, value_counts, Describe, InsightRules,
};
use crate::data::{Column, DataError, MovieTable, Value};

const TOP_MISSING: usize = 10;
const TOP_GENRE_COMBOS: usize = 10;
const TOP_PROFIT: usize = 5;
const TOP_DIRECTORS: usize = 5;
const TOP_YEARS: usize = 5;
const TOP_GENRES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingColumn {
    pub column: String,
    pub missing: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitRow {
    pub title: String,
    pub budget: f64,
    pub revenue: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub column: String,
    pub stats: Option<Describe>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownRow {
    pub label: String,
    pub movies: usize,
    pub mean_revenue: Option<f64>,
    pub median_revenue: Option<f64>,
}

/// Movie count and revenue per label of one grouping column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub column: String,
    /// Busiest label first; equal counts in label order.
    pub rows: Vec<BreakdownRow>,
}

impl Breakdown {
    pub fn build(table: &MovieTable, column: Column) -> crate::data::Result<Self> {
        if !Column::GROUPINGS.contains(&column) {
            return Err(DataError::UnsupportedColumn {
                column: column.name(),
                role: "breakdown key",
            });
        }
        let means = group_mean(table, column, Column::Revenue);
        let mut rows: Vec<BreakdownRow> = group_count(table, column)
            .into_iter()
            .map(|(label, movies)| {
                let members = table.where_(|m| m.value(column) == label);
                BreakdownRow {
                    movies,
                    mean_revenue: means.get(&label).copied(),
                    median_revenue: median(&members, Column::Revenue),
                    label: label.to_string(),
                }
            })
            .collect();
        rows.sort_by(|a, b| b.movies.cmp(&a.movies));
        Ok(Breakdown {
            column: column.name().to_string(),
            rows,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Rows of the loaded source; the quality figures refer to these.
    pub total_rows: usize,
    /// Rows the statistics below were computed over.
    pub analysed_rows: usize,
    pub total_columns: usize,
    pub complete_rows: usize,
    pub incomplete_rows: usize,
    /// Columns with the most missing cells first.
    pub missing: Vec<MissingColumn>,
    /// Most common raw genre strings.
    pub genre_combos: Vec<(String, usize)>,
    pub mean_budget: Option<f64>,
    pub mean_revenue: Option<f64>,
    pub most_profitable: Vec<ProfitRow>,
    /// High-grossing movies without a tagline.
    pub untagged_hits: Vec<(String, f64)>,
    pub zero_budget: usize,
    pub zero_revenue: usize,
    pub top_directors: Vec<(String, f64)>,
    pub busiest_years: Vec<(i64, usize)>,
    pub runtime_revenue_correlation: Option<f64>,
    pub popularity_revenue_correlation: Option<f64>,
    /// Most common individual genre labels.
    pub genres: Vec<(String, usize)>,
    pub money: Vec<ColumnStats>,
    /// Optional per-label section, see [`Breakdown`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<Breakdown>,
}

fn labelled<T>(pairs: Vec<(Value, T)>) -> Vec<(String, T)> {
    pairs.into_iter().map(|(v, n)| (v.to_string(), n)).collect()
}

impl Report {
    pub fn build(table: &MovieTable, rules: &InsightRules) -> Self {
        let source = table.source();
        let total_rows = table.base_len();

        let mut missing: Vec<MissingColumn> = source
            .columns
            .iter()
            .zip(&source.missing)
            .map(|(column, &missing)| MissingColumn {
                column: column.clone(),
                missing,
                percent: if total_rows == 0 {
                    0.0
                } else {
                    missing as f64 / total_rows as f64 * 100.0
                },
            })
            .collect();
        missing.sort_by(|a, b| b.missing.cmp(&a.missing));

        let mut genre_combos = labelled(value_counts(table, Column::Genres));
        genre_combos.truncate(TOP_GENRE_COMBOS);

        let most_profitable = top_n(table, Column::Profit, TOP_PROFIT, false)
            .iter()
            .map(|m| ProfitRow {
                title: m.title.clone(),
                budget: m.budget,
                revenue: m.revenue,
                profit: m.profit,
            })
            .collect();

        let untagged_hits = table
            .where_(|m| m.tagline.is_none() && m.revenue > rules.high_revenue_cutoff)
            .iter()
            .map(|m| (m.title.clone(), m.revenue))
            .collect();

        let mut top_directors: Vec<(Value, f64)> =
            group_sum(table, Column::Director, Column::Profit).into_iter().collect();
        top_directors.sort_by(|a, b| b.1.total_cmp(&a.1));
        top_directors.truncate(TOP_DIRECTORS);

        let busiest_years = value_counts(table, Column::Year)
            .into_iter()
            .filter_map(|(v, n)| match v {
                Value::Integer(y) => Some((y, n)),
                _ => None,
            })
            .take(TOP_YEARS)
            .collect();

        let mut genres = genre_label_counts(table);
        genres.truncate(TOP_GENRES);

        let money = [Column::Budget, Column::Revenue, Column::Profit]
            .into_iter()
            .map(|c| ColumnStats {
                column: c.name().to_string(),
                stats: describe(table, c),
            })
            .collect();

        Report {
            total_rows,
            analysed_rows: table.len(),
            total_columns: source.columns.len(),
            complete_rows: source.complete_rows,
            incomplete_rows: total_rows.saturating_sub(source.complete_rows),
            missing,
            genre_combos,
            mean_budget: aggregate::mean(table, Column::Budget),
            mean_revenue: aggregate::mean(table, Column::Revenue),
            most_profitable,
            untagged_hits,
            zero_budget: table.iter().filter(|m| m.budget == 0.0).count(),
            zero_revenue: table.iter().filter(|m| m.revenue == 0.0).count(),
            top_directors: labelled(top_directors),
            busiest_years,
            runtime_revenue_correlation: pairwise_correlation(
                table,
                Column::Runtime,
                Column::Revenue,
            ),
            popularity_revenue_correlation: pairwise_correlation(
                table,
                Column::Popularity,
                Column::Revenue,
            ),
            genres,
            money,
            breakdown: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

fn opt(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.2}")).unwrap_or_else(|| "n/a".to_string())
}

fn opt_corr(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.4}"))
        .unwrap_or_else(|| "undefined (fewer than two usable rows)".to_string())
}

fn counts(f: &mut fmt::Formatter<'_>, rows: &[(String, usize)]) -> fmt::Result {
    if rows.is_empty() {
        return writeln!(f, "  (none)");
    }
    for (label, n) in rows {
        writeln!(f, "  {label:<40} {n:>8}")?;
    }
    Ok(())
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total rows: {}", self.total_rows)?;
        writeln!(f, "Total columns: {}", self.total_columns)?;
        writeln!(f, "Complete rows: {}", self.complete_rows)?;
        writeln!(f, "Incomplete rows: {}", self.incomplete_rows)?;
        if self.analysed_rows != self.total_rows {
            writeln!(f, "Rows analysed: {}", self.analysed_rows)?;
        }

        writeln!(f, "\nTop {TOP_MISSING} Columns with Missing Values:")?;
        writeln!(f, "  {:<20} {:>14} {:>10}", "Column", "Missing Values", "Missing %")?;
        for m in self.missing.iter().take(TOP_MISSING) {
            writeln!(f, "  {:<20} {:>14} {:>10.2}", m.column, m.missing, m.percent)?;
        }

        writeln!(f, "\nTop {TOP_GENRE_COMBOS} Most Common Genre Combos:")?;
        counts(f, &self.genre_combos)?;

        writeln!(f, "\nAverage Budget and Revenue:")?;
        writeln!(f, "  budget   {}", opt(self.mean_budget))?;
        writeln!(f, "  revenue  {}", opt(self.mean_revenue))?;

        writeln!(f, "\nTop {TOP_PROFIT} Most Profitable Movies:")?;
        for r in &self.most_profitable {
            writeln!(
                f,
                "  {:<40} budget {:>15.0}  revenue {:>15.0}  profit {:>15.0}",
                r.title, r.budget, r.revenue, r.profit
            )?;
        }

        writeln!(f, "\nHigh Revenue Movies Without Taglines:")?;
        if self.untagged_hits.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for (title, revenue) in &self.untagged_hits {
            writeln!(f, "  {title:<40} {revenue:>15.0}")?;
        }

        writeln!(f, "\nMovies with 0 budget: {}", self.zero_budget)?;
        writeln!(f, "Movies with 0 revenue: {}", self.zero_revenue)?;

        writeln!(f, "\nTop {TOP_DIRECTORS} Most Profitable Directors:")?;
        for (director, profit) in &self.top_directors {
            writeln!(f, "  {director:<40} {profit:>15.0}")?;
        }

        writeln!(f, "\nTop {TOP_YEARS} Most Productive Release Years:")?;
        for (year, n) in &self.busiest_years {
            writeln!(f, "  {year:<40} {n:>8}")?;
        }

        writeln!(f, "\nCorrelation: Runtime vs Revenue: {}", opt_corr(self.runtime_revenue_correlation))?;
        writeln!(
            f,
            "Correlation: Popularity vs Revenue: {}",
            opt_corr(self.popularity_revenue_correlation)
        )?;

        writeln!(f, "\nMost Common Individual Genres (split):")?;
        counts(f, &self.genres)?;

        writeln!(f, "\nSummary Statistics:")?;
        writeln!(
            f,
            "  {:<8} {:>8} {:>16} {:>16} {:>16} {:>16} {:>16} {:>16} {:>16}",
            "", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
        )?;
        for c in &self.money {
            match &c.stats {
                Some(d) => writeln!(
                    f,
                    "  {:<8} {:>8} {:>16.2} {:>16} {:>16.2} {:>16.2} {:>16.2} {:>16.2} {:>16.2}",
                    c.column,
                    d.count,
                    d.mean,
                    opt(d.std),
                    d.min,
                    d.q25,
                    d.median,
                    d.q75,
                    d.max
                )?,
                None => writeln!(f, "  {:<8} {:>8}", c.column, 0)?,
            }
        }

        writeln!(f, "\nMedian Values:")?;
        for c in &self.money {
            writeln!(f, "  {:<8} {}", c.column, opt(c.stats.as_ref().map(|d| d.median)))?;
        }

        if let Some(b) = &self.breakdown {
            writeln!(f, "\nBreakdown by {}:", b.column)?;
            writeln!(
                f,
                "  {:<40} {:>8} {:>16} {:>16}",
                "", "movies", "mean revenue", "median revenue"
            )?;
            for r in &b.rows {
                writeln!(
                    f,
                    "  {:<40} {:>8} {:>16} {:>16}",
                    r.label,
                    r.movies,
                    opt(r.mean_revenue),
                    opt(r.median_revenue)
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::derive::{derive_movie, RawMovie};

    fn movie(title: &str, budget: f64, revenue: f64, director: &str, tagline: Option<&str>) -> crate::data::Movie {
        let mut raw = RawMovie::new()
            .with(Column::Title, title)
            .with(Column::Budget, budget)
            .with(Column::Revenue, revenue)
            .with(Column::Director, director)
            .with(Column::Genres, "Drama|Romance")
            .with(Column::ReleaseDate, "1997-12-19")
            .with(Column::Runtime, 120.0);
        if let Some(t) = tagline {
            raw = raw.with(Column::Tagline, t);
        }
        derive_movie(&raw).movie
    }

    fn table() -> MovieTable {
        MovieTable::from_movies(vec![
            movie("Ship", 200e6, 1800e6, "Jim", None),
            movie("Indie", 0.0, 0.0, "Sofia", Some("small")),
            movie("Sequel", 100e6, 400e6, "Jim", Some("again")),
        ])
    }

    #[test]
    fn report_collects_headline_numbers() {
        let r = Report::build(&table(), &InsightRules::default());
        assert_eq!(r.total_rows, 3);
        assert_eq!(r.analysed_rows, 3);
        assert_eq!(r.incomplete_rows, 0);
        assert_eq!(r.total_columns, 12);
        assert_eq!(r.zero_budget, 1);
        assert_eq!(r.zero_revenue, 1);
        assert_eq!(r.untagged_hits, vec![("Ship".to_string(), 1800e6)]);
        assert_eq!(r.top_directors[0], ("Jim".to_string(), 1900e6));
        assert_eq!(r.busiest_years, vec![(1997, 3)]);
        assert_eq!(r.genre_combos, vec![("Drama|Romance".to_string(), 3)]);
        assert_eq!(r.genres[0], ("Drama".to_string(), 3));
        assert_eq!(r.most_profitable[0].title, "Ship");
        // every runtime is 120, so the correlation is undefined
        assert_eq!(r.runtime_revenue_correlation, None);
    }

    #[test]
    fn breakdown_groups_by_a_grouping_column() {
        let t = table();
        let b = Breakdown::build(&t, "director".parse().unwrap()).unwrap();
        assert_eq!(b.column, "director");
        assert_eq!(b.rows.len(), 2);
        assert_eq!(b.rows[0].label, "Jim");
        assert_eq!(b.rows[0].movies, 2);
        assert_eq!(b.rows[0].mean_revenue, Some(1100e6));
        assert_eq!(b.rows[0].median_revenue, Some(1100e6));
        assert_eq!(b.rows[1].label, "Sofia");

        let mut r = Report::build(&t, &InsightRules::default());
        assert!(!r.to_string().contains("Breakdown by"));
        r.breakdown = Some(b);
        assert!(r.to_string().contains("Breakdown by director:"));

        let err = Breakdown::build(&t, Column::Budget).unwrap_err();
        assert!(matches!(err, DataError::UnsupportedColumn { column: "budget", .. }));
    }

    #[test]
    fn empty_tables_still_render() {
        let empty = table().where_(|_| false);
        let r = Report::build(&empty, &InsightRules::default());
        assert_eq!(r.mean_budget, None);
        assert!(r.money.iter().all(|c| c.stats.is_none()));
        let text = r.to_string();
        assert!(text.contains("Rows analysed: 0"));
        assert!(text.contains("undefined"));
    }
}
