use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use cinemetrics::config::Settings;
use cinemetrics::data::aggregate::{group_count, search_titles, sort_by};
use cinemetrics::data::explore::{comparison_candidates, ChartAxes};
use cinemetrics::data::{
    filter, Column, DatasetCache, FilterSpec, Movie, MovieTable, Thresholds, Value,
};

use crate::color::GenreColors;

// ---------------------------------------------------------------------------
// Filter form – widget values behind the side panel
// ---------------------------------------------------------------------------

/// Extent of the loaded data, used to seed the form and to tell a narrowed
/// range from "no constraint".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub years: (i32, i32),
    /// Millions of dollars.
    pub budget_m: (f64, f64),
}

impl Bounds {
    pub fn of(table: &MovieTable) -> Self {
        let years = table
            .iter()
            .filter_map(|m| m.year)
            .fold(None, |acc: Option<(i32, i32)>, y| match acc {
                None => Some((y, y)),
                Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
            })
            .unwrap_or((0, 0));
        let budget_max = table.iter().map(|m| m.budget).fold(0.0, f64::max);
        Bounds {
            years,
            budget_m: (0.0, (budget_max / 1e6).ceil()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterForm {
    pub year_min: i32,
    pub year_max: i32,
    pub budget_min_m: f64,
    pub budget_max_m: f64,
    /// 0 disables the rating constraint so unrated movies stay visible.
    pub min_rating: f64,
    /// Empty selects every genre.
    pub genres: BTreeSet<String>,
    pub profitable_only: bool,
    pub blockbusters_only: bool,
    pub hidden_gems_only: bool,
}

impl FilterForm {
    pub fn new(bounds: &Bounds) -> Self {
        FilterForm {
            year_min: bounds.years.0,
            year_max: bounds.years.1,
            budget_min_m: bounds.budget_m.0,
            budget_max_m: bounds.budget_m.1,
            min_rating: 0.0,
            genres: BTreeSet::new(),
            profitable_only: false,
            blockbusters_only: false,
            hidden_gems_only: false,
        }
    }

    /// Only ranges narrowed from the data extent become constraints, so rows
    /// without a release year survive an untouched year slider.
    pub fn to_spec(&self, bounds: &Bounds, thresholds: Thresholds) -> FilterSpec {
        let mut spec = FilterSpec::new()
            .genres(self.genres.iter().cloned())
            .profitable_only(self.profitable_only)
            .blockbusters_only(self.blockbusters_only)
            .hidden_gems_only(self.hidden_gems_only)
            .with_thresholds(thresholds);
        if (self.year_min, self.year_max) != bounds.years {
            spec = spec.year_range(self.year_min, self.year_max);
        }
        if (self.budget_min_m, self.budget_max_m) != bounds.budget_m {
            spec = spec.budget_range(self.budget_min_m * 1e6, self.budget_max_m * 1e6);
        }
        if self.min_rating > 0.0 {
            spec = spec.min_rating(self.min_rating);
        }
        spec
    }
}

// ---------------------------------------------------------------------------
// Explorer / tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Dashboard,
    Interactive,
    Financial,
    Genres,
    Explorer,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Dashboard,
        Tab::Interactive,
        Tab::Financial,
        Tab::Genres,
        Tab::Explorer,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Interactive => "Interactive",
            Tab::Financial => "Financial",
            Tab::Genres => "Genres",
            Tab::Explorer => "Explorer",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerState {
    pub search: String,
    pub sort: Column,
    pub ascending: bool,
}

impl Default for ExplorerState {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: Column::Revenue,
            ascending: false,
        }
    }
}

/// How many of the highest grossing movies are offered for comparison.
pub const COMPARISON_POOL: usize = 200;

/// Selections of the Interactive tab.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractiveState {
    pub axes: ChartAxes,
    /// Positions in the comparison candidates; `None` picks a default.
    pub first: Option<usize>,
    pub second: Option<usize>,
    /// Primary genre of the deep dive; `None` picks the first one present.
    pub genre: Option<String>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub settings: Settings,
    cache: DatasetCache,

    /// Full table of the opened file (None until a file loads).
    pub dataset: Option<MovieTable>,
    pub source_path: Option<PathBuf>,
    pub bounds: Bounds,
    /// Primary genres present in the dataset, sorted.
    pub all_genres: Vec<String>,
    pub genre_colors: GenreColors,

    pub form: FilterForm,
    /// Rows passing the last accepted filter.
    pub view: Option<MovieTable>,

    pub explorer: ExplorerState,
    pub interactive: InteractiveState,
    pub tab: Tab,

    /// Rejected filters and export results, shown in the top bar.
    pub status_message: Option<String>,
    /// Set when opening a file failed; replaces the dashboard.
    pub load_error: Option<String>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let bounds = Bounds {
            years: (0, 0),
            budget_m: (0.0, 0.0),
        };
        Self {
            settings,
            cache: DatasetCache::new(),
            dataset: None,
            source_path: None,
            form: FilterForm::new(&bounds),
            bounds,
            all_genres: Vec::new(),
            genre_colors: GenreColors::default(),
            view: None,
            explorer: ExplorerState::default(),
            interactive: InteractiveState::default(),
            tab: Tab::default(),
            status_message: None,
            load_error: None,
        }
    }

    /// Load `path` through the cache and make it the current dataset.
    pub fn open_path(&mut self, path: &Path) {
        match self.cache.load(path) {
            Ok(table) => {
                log::info!("Opened {} ({} movies)", path.display(), table.len());
                self.set_dataset(table);
                self.source_path = Some(path.to_path_buf());
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                self.load_error = Some(format!("{e:#}"));
            }
        }
    }

    /// Ingest a newly loaded table and reset the filters to its extent.
    pub fn set_dataset(&mut self, table: MovieTable) {
        self.bounds = Bounds::of(&table);
        self.form = FilterForm::new(&self.bounds);
        self.all_genres = group_count(&table, Column::PrimaryGenre)
            .into_keys()
            .filter_map(|v| match v {
                Value::Text(s) => Some(s),
                _ => None,
            })
            .collect();
        self.genre_colors = GenreColors::new(self.all_genres.iter().map(String::as_str));
        self.view = Some(table.clone());
        self.dataset = Some(table);
        self.interactive = InteractiveState::default();
        self.status_message = None;
        self.load_error = None;
    }

    pub fn spec(&self) -> FilterSpec {
        self.form.to_spec(&self.bounds, self.settings.thresholds)
    }

    /// Recompute `view` after a form change. A rejected spec keeps the
    /// previous view.
    pub fn refilter(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        match filter(dataset, &self.spec()) {
            Ok(view) => {
                self.view = Some(view);
                self.status_message = None;
            }
            Err(e) => {
                log::warn!("Filter rejected: {e}");
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// The two movies to compare, picked from the top grossing visible rows.
    /// Selections beyond the current pool fall back to the first two rows.
    pub fn comparison(&self) -> Option<(MovieTable, Movie, Movie)> {
        let pool = comparison_candidates(self.view.as_ref()?, COMPARISON_POOL);
        let last = pool.len().checked_sub(1)?;
        let pick = |choice: Option<usize>, fallback: usize| {
            choice.filter(|&i| i <= last).unwrap_or(fallback.min(last))
        };
        let first = pool.get(pick(self.interactive.first, 0))?.clone();
        let second = pool.get(pick(self.interactive.second, 1))?.clone();
        Some((pool, first, second))
    }

    /// Primary genres of the visible rows, sorted.
    pub fn visible_primary_genres(&self) -> Vec<String> {
        self.view
            .as_ref()
            .map(|view| {
                group_count(view, Column::PrimaryGenre)
                    .into_keys()
                    .map(|v| v.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Primary genre of the deep dive, kept only while it is still visible.
    pub fn deep_dive_genre(&self) -> Option<String> {
        let present = self.visible_primary_genres();
        match &self.interactive.genre {
            Some(g) if present.contains(g) => Some(g.clone()),
            _ => present.into_iter().next(),
        }
    }

    /// Visible rows matching the explorer search, in explorer sort order.
    pub fn explorer_rows(&self) -> Option<MovieTable> {
        let view = self.view.as_ref()?;
        let found = search_titles(view, &self.explorer.search);
        Some(sort_by(&found, self.explorer.sort, self.explorer.ascending))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinemetrics::data::derive::{derive_movie, RawMovie};
    use cinemetrics::data::DataError;

    fn table() -> MovieTable {
        let rows = [
            ("Alpha", 100e6, 300e6, 7.5, "Action|Adventure", "2001-03-04"),
            ("Bravo", 20e6, 50e6, 6.0, "", "1999-05-06"),
            ("Charlie", 60e6, 150e6, 8.0, "Drama", "2010-07-08"),
            ("Delta", 5e6, 1e6, 5.0, "Drama", "n/a"),
        ];
        MovieTable::from_movies(
            rows.iter()
                .map(|&(title, budget, revenue, rating, genres, date)| {
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
                })
                .collect(),
        )
    }

    fn state() -> AppState {
        let mut s = AppState::new(Settings::default());
        s.set_dataset(table());
        s
    }

    #[test]
    fn fresh_dataset_shows_everything() {
        let s = state();
        assert_eq!(s.bounds.years, (1999, 2010));
        assert_eq!(s.bounds.budget_m, (0.0, 100.0));
        assert_eq!(s.all_genres, vec!["Action", "Drama", "Unknown"]);
        assert_eq!(s.spec(), FilterSpec::new());
        assert_eq!(s.view.as_ref().map(MovieTable::len), Some(4));
    }

    #[test]
    fn form_changes_narrow_the_view() {
        let mut s = state();
        s.form.min_rating = 7.0;
        s.refilter();
        assert_eq!(s.view.as_ref().unwrap().titles(), vec!["Alpha", "Charlie"]);

        s.form.min_rating = 0.0;
        s.form.genres.insert("Drama".to_string());
        s.refilter();
        assert_eq!(s.view.as_ref().unwrap().titles(), vec!["Charlie", "Delta"]);
    }

    #[test]
    fn narrowed_budget_is_in_millions() {
        let mut s = state();
        s.form.budget_max_m = 50.0;
        let spec = s.spec();
        assert_eq!(spec.budget_range, Some((0.0, 50e6)));
        s.refilter();
        assert_eq!(s.view.as_ref().unwrap().titles(), vec!["Bravo", "Delta"]);
    }

    #[test]
    fn inverted_range_keeps_previous_view() {
        let mut s = state();
        s.form.year_min = 2000;
        s.refilter();
        let before = s.view.clone().unwrap();
        assert_eq!(before.titles(), vec!["Alpha", "Charlie"]);

        s.form.year_min = 2010;
        s.form.year_max = 2000;
        s.refilter();
        assert_eq!(s.view.as_ref(), Some(&before));
        let expected = DataError::InvalidRange {
            option: "year_range",
            min: 2010.0,
            max: 2000.0,
        };
        assert_eq!(s.status_message, Some(expected.to_string()));
    }

    #[test]
    fn explorer_searches_and_sorts_the_view() {
        let mut s = state();
        s.explorer.search = "a".to_string();
        s.explorer.sort = Column::Budget;
        s.explorer.ascending = true;
        let rows = s.explorer_rows().unwrap();
        assert_eq!(rows.titles(), vec!["Delta", "Bravo", "Charlie", "Alpha"]);

        s.explorer.search = "ALP".to_string();
        assert_eq!(s.explorer_rows().unwrap().titles(), vec!["Alpha"]);
    }

    #[test]
    fn comparison_defaults_to_the_two_top_grossing_rows() {
        let mut s = state();
        let (pool, first, second) = s.comparison().unwrap();
        assert_eq!(pool.titles(), vec!["Alpha", "Charlie", "Bravo", "Delta"]);
        assert_eq!((first.title.as_str(), second.title.as_str()), ("Alpha", "Charlie"));

        s.interactive.second = Some(3);
        s.form.genres.insert("Action".to_string());
        s.refilter();
        let (pool, first, second) = s.comparison().unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(first.title, "Alpha");
        assert_eq!(second.title, "Alpha");

        s.form.min_rating = 9.9;
        s.refilter();
        assert!(s.comparison().is_none());
    }

    #[test]
    fn deep_dive_genre_follows_the_view() {
        let mut s = state();
        assert_eq!(s.visible_primary_genres(), vec!["Action", "Drama", "Unknown"]);
        assert_eq!(s.deep_dive_genre().as_deref(), Some("Action"));
        s.interactive.genre = Some("Drama".to_string());
        assert_eq!(s.deep_dive_genre().as_deref(), Some("Drama"));

        s.form.genres.insert("Unknown".to_string());
        s.refilter();
        assert_eq!(s.visible_primary_genres(), vec!["Unknown"]);
        assert_eq!(s.deep_dive_genre().as_deref(), Some("Unknown"));
    }

    #[test]
    fn failed_open_reports_error_and_keeps_data() {
        let mut s = state();
        s.open_path(Path::new("/definitely/not/here.csv"));
        assert!(s.load_error.is_some());
        assert_eq!(s.dataset.as_ref().map(MovieTable::len), Some(4));
    }
}
