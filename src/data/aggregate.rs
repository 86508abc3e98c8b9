//! Aggregate views over a (possibly filtered) [`MovieTable`].
//!
//! Every function here is pure. On an empty table they return empty maps,
//! zero counts or `None`; nulls are skipped, never counted as zero, and no
//! `NaN` reaches the caller.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::model::{Column, Movie, Value};
use super::table::MovieTable;

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Sum of `value` per distinct non-null `group` label. Null values add
/// nothing, so a group whose values are all null sums to `0`.
pub fn group_sum(table: &MovieTable, group: Column, value: Column) -> BTreeMap<Value, f64> {
    let mut sums: BTreeMap<Value, f64> = BTreeMap::new();
    for movie in table.iter() {
        let label = movie.value(group);
        if label.is_null() {
            continue;
        }
        let entry = sums.entry(label).or_insert(0.0);
        if let Some(v) = movie.number(value) {
            *entry += v;
        }
    }
    sums
}

/// Mean of `value` per non-null `group` label over non-null values.
/// Groups without a single value are left out.
pub fn group_mean(table: &MovieTable, group: Column, value: Column) -> BTreeMap<Value, f64> {
    let mut acc: BTreeMap<Value, (f64, usize)> = BTreeMap::new();
    for movie in table.iter() {
        let label = movie.value(group);
        if label.is_null() {
            continue;
        }
        if let Some(v) = movie.number(value) {
            let e = acc.entry(label).or_insert((0.0, 0));
            e.0 += v;
            e.1 += 1;
        }
    }
    acc.into_iter()
        .map(|(label, (sum, n))| (label, sum / n as f64))
        .collect()
}

/// Row count per non-null `group` label.
pub fn group_count(table: &MovieTable, group: Column) -> BTreeMap<Value, usize> {
    let mut counts: BTreeMap<Value, usize> = BTreeMap::new();
    for movie in table.iter() {
        let label = movie.value(group);
        if !label.is_null() {
            *counts.entry(label).or_insert(0) += 1;
        }
    }
    counts
}

/// Distinct non-null values of `column` with their row counts, most frequent
/// first; equal counts keep first-seen order.
pub fn value_counts(table: &MovieTable, column: Column) -> Vec<(Value, usize)> {
    counts_in_first_seen_order(table.iter().map(|m| m.value(column)).filter(|v| !v.is_null()))
}

/// Occurrences of every individual genre label across all rows' genre lists.
pub fn genre_label_counts(table: &MovieTable) -> Vec<(String, usize)> {
    counts_in_first_seen_order(table.iter().flat_map(|m| m.genres.iter().cloned()))
}

fn counts_in_first_seen_order<T, I>(items: I) -> Vec<(T, usize)>
where
    T: std::hash::Hash + Eq + Clone,
    I: Iterator<Item = T>,
{
    let mut index: HashMap<T, usize> = HashMap::new();
    let mut counts: Vec<(T, usize)> = Vec::new();
    for item in items {
        match index.get(&item) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(item.clone(), counts.len());
                counts.push((item, 1));
            }
        }
    }
    // stable: ties stay in first-seen order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

// ---------------------------------------------------------------------------
// Ranking and ordering
// ---------------------------------------------------------------------------

/// Order two cells with nulls after every non-null value.
fn cmp_nulls_last(a: &Value, b: &Value, ascending: bool) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => a.cmp(b),
            };
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        }
    }
}

/// Stable sort of the view by `column`; nulls go last in both directions.
pub fn sort_by(table: &MovieTable, column: Column, ascending: bool) -> MovieTable {
    let mut keyed: Vec<(usize, Value)> = table
        .entries()
        .map(|(pos, m)| (pos, m.value(column)))
        .collect();
    keyed.sort_by(|a, b| cmp_nulls_last(&a.1, &b.1, ascending));
    table.with_rows(keyed.into_iter().map(|(pos, _)| pos).collect())
}

/// The `n` rows with the largest (or, with `ascending`, smallest) `column`
/// values. Rows where the column is null are not ranked; ties keep view order.
pub fn top_n(table: &MovieTable, column: Column, n: usize, ascending: bool) -> MovieTable {
    let ranked = table.where_(|m| !m.value(column).is_null());
    sort_by(&ranked, column, ascending).head(n)
}

/// Rows whose title contains `needle`, ignoring case. An empty needle keeps
/// every row.
pub fn search_titles(table: &MovieTable, needle: &str) -> MovieTable {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return table.clone();
    }
    table.where_(|m| m.title.to_lowercase().contains(&needle))
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

fn numbers(table: &MovieTable, column: Column) -> Vec<f64> {
    table.iter().filter_map(|m| m.number(column)).collect()
}

/// Pearson correlation of two columns over rows where both are non-null.
///
/// `None` when fewer than two rows qualify or either column is constant,
/// since the coefficient is undefined there.
pub fn pairwise_correlation(table: &MovieTable, a: Column, b: Column) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = table
        .iter()
        .filter_map(|m| Some((m.number(a)?, m.number(b)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    if var_a == 0.0 || var_b == 0.0 {
        return None;
    }
    let r = cov / (var_a.sqrt() * var_b.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Descriptive statistics of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` for a single value.
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Linear-interpolated quantile of an ascending, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Count, mean, spread and quartiles of `column`; `None` when no row has a
/// value.
pub fn describe(table: &MovieTable, column: Column) -> Option<Describe> {
    let mut values = numbers(table, column);
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let std = (count > 1).then(|| {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (count - 1) as f64).sqrt()
    });
    Some(Describe {
        count,
        mean,
        std,
        min: values[0],
        q25: quantile(&values, 0.25),
        median: quantile(&values, 0.5),
        q75: quantile(&values, 0.75),
        max: values[count - 1],
    })
}

pub fn median(table: &MovieTable, column: Column) -> Option<f64> {
    describe(table, column).map(|d| d.median)
}

/// Mean over non-null values of `column`.
pub fn mean(table: &MovieTable, column: Column) -> Option<f64> {
    let values = numbers(table, column);
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

fn share_profitable<'a>(movies: impl Iterator<Item = &'a Movie>) -> Option<f64> {
    let (hits, total) = movies.fold((0usize, 0usize), |(h, t), m| {
        (h + usize::from(m.is_profitable), t + 1)
    });
    (total > 0).then(|| hits as f64 / total as f64)
}

// ---------------------------------------------------------------------------
// Dashboard views
// ---------------------------------------------------------------------------

/// Headline numbers of a selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub movies: usize,
    pub total_revenue: f64,
    pub total_profit: f64,
    pub mean_rating: Option<f64>,
    /// Share of profitable movies in `0..=1`.
    pub success_rate: Option<f64>,
}

pub fn summary(table: &MovieTable) -> Summary {
    Summary {
        movies: table.len(),
        total_revenue: table.iter().map(|m| m.revenue).sum(),
        total_profit: table.iter().map(|m| m.profit).sum(),
        mean_rating: mean(table, Column::VoteAverage),
        success_rate: share_profitable(table.iter()),
    }
}

/// Performance of one primary genre.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreStats {
    pub genre: String,
    pub movies: usize,
    pub total_revenue: f64,
    pub mean_revenue: f64,
    pub mean_profit: f64,
    pub mean_rating: Option<f64>,
    pub success_rate: f64,
}

/// Per primary genre statistics, highest total revenue first.
pub fn genre_stats(table: &MovieTable) -> Vec<GenreStats> {
    let mut groups: BTreeMap<&str, Vec<&Movie>> = BTreeMap::new();
    for movie in table.iter() {
        groups.entry(movie.primary_genre.as_str()).or_default().push(movie);
    }

    let mut stats: Vec<GenreStats> = groups
        .into_iter()
        .map(|(genre, movies)| {
            let n = movies.len() as f64;
            let total_revenue: f64 = movies.iter().map(|m| m.revenue).sum();
            let ratings: Vec<f64> = movies.iter().filter_map(|m| m.vote_average).collect();
            GenreStats {
                genre: genre.to_string(),
                movies: movies.len(),
                total_revenue,
                mean_revenue: total_revenue / n,
                mean_profit: movies.iter().map(|m| m.profit).sum::<f64>() / n,
                mean_rating: (!ratings.is_empty())
                    .then(|| ratings.iter().sum::<f64>() / ratings.len() as f64),
                success_rate: share_profitable(movies.iter().copied()).unwrap_or(0.0),
            }
        })
        .collect();
    stats.sort_by(|a, b| b.total_revenue.total_cmp(&a.total_revenue));
    stats
}

/// Output of one release year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearStats {
    pub year: i32,
    pub movies: usize,
    pub revenue: f64,
    pub mean_revenue: f64,
}

/// Movie count and revenue per release year, ascending. Undated rows are
/// skipped.
pub fn yearly_stats(table: &MovieTable) -> Vec<YearStats> {
    let mut years: BTreeMap<i32, (usize, f64)> = BTreeMap::new();
    for movie in table.iter() {
        if let Some(year) = movie.year {
            let e = years.entry(year).or_insert((0, 0.0));
            e.0 += 1;
            e.1 += movie.revenue;
        }
    }
    years
        .into_iter()
        .map(|(year, (movies, revenue))| YearStats {
            year,
            movies,
            revenue,
            mean_revenue: revenue / movies as f64,
        })
        .collect()
}

/// Eligibility rules for the highlight cards and flop ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightRules {
    /// Votes a movie needs before it can be "top rated".
    pub top_rated_min_votes: f64,
    /// Budget a movie needs before its ROI counts.
    pub best_roi_min_budget: f64,
    /// Budget a movie must exceed to be ranked as a flop.
    pub flop_min_budget: f64,
    /// Revenue above which a movie counts as high-grossing in reports.
    pub high_revenue_cutoff: f64,
}

impl Default for InsightRules {
    fn default() -> Self {
        Self {
            top_rated_min_votes: 500.0,
            best_roi_min_budget: 1_000_000.0,
            flop_min_budget: 10_000_000.0,
            high_revenue_cutoff: 100_000_000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Highlights<'a> {
    pub highest_grossing: Option<&'a Movie>,
    pub top_rated: Option<&'a Movie>,
    pub best_roi: Option<&'a Movie>,
}

/// First row holding the maximum of `key` among rows where it is defined.
fn first_max<'a>(
    movies: impl Iterator<Item = &'a Movie>,
    key: impl Fn(&Movie) -> Option<f64>,
) -> Option<&'a Movie> {
    let mut best: Option<(&Movie, f64)> = None;
    for m in movies {
        if let Some(k) = key(m) {
            if best.map_or(true, |(_, b)| k > b) {
                best = Some((m, k));
            }
        }
    }
    best.map(|(m, _)| m)
}

pub fn highlights<'a>(table: &'a MovieTable, rules: &InsightRules) -> Highlights<'a> {
    Highlights {
        highest_grossing: first_max(table.iter(), |m| Some(m.revenue)),
        top_rated: first_max(table.iter(), |m| {
            if m.vote_count? >= rules.top_rated_min_votes {
                m.vote_average
            } else {
                None
            }
        }),
        best_roi: first_max(table.iter(), |m| {
            (m.budget >= rules.best_roi_min_budget).then_some(m.roi)
        }),
    }
}

/// The `n` biggest losses among movies with a budget above the flop floor.
pub fn biggest_flops(table: &MovieTable, n: usize, rules: &InsightRules) -> MovieTable {
    let eligible = table.where_(|m| m.budget > rules.flop_min_budget);
    top_n(&eligible, Column::Profit, n, true)
}
