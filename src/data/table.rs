use std::sync::Arc;

use super::model::{Column, Movie};

// ---------------------------------------------------------------------------
// SourceInfo – what the loader saw in the raw source
// ---------------------------------------------------------------------------

/// Shape and completeness of the raw source, kept next to the derived rows
/// for data-quality reporting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceInfo {
    /// All source column names in source order (required and extra).
    pub columns: Vec<String>,
    /// Missing cells per entry of `columns`.
    pub missing: Vec<usize>,
    /// Rows without a single missing cell.
    pub complete_rows: usize,
    /// Cells that were present but unusable and had to be degraded.
    pub degraded_cells: usize,
}

#[derive(Debug)]
struct Dataset {
    movies: Vec<Movie>,
    source: SourceInfo,
}

// ---------------------------------------------------------------------------
// MovieTable – an immutable, cheaply clonable view
// ---------------------------------------------------------------------------

/// A read-only table of movies.
///
/// The derived rows live behind an `Arc` shared by every view built from the
/// same load; a view only owns the positions of its rows. Filtering, ranking
/// and sorting produce new views and never touch the shared rows.
#[derive(Debug, Clone)]
pub struct MovieTable {
    base: Arc<Dataset>,
    rows: Arc<[usize]>,
}

impl MovieTable {
    pub fn new(movies: Vec<Movie>, source: SourceInfo) -> Self {
        let rows: Arc<[usize]> = (0..movies.len()).collect();
        MovieTable {
            base: Arc::new(Dataset { movies, source }),
            rows,
        }
    }

    /// A table without source bookkeeping, e.g. for fixtures.
    pub fn from_movies(movies: Vec<Movie>) -> Self {
        let source = SourceInfo {
            columns: Column::RAW.iter().map(|c| c.name().to_string()).collect(),
            missing: vec![0; Column::RAW.len()],
            complete_rows: movies.len(),
            degraded_cells: 0,
        };
        Self::new(movies, source)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in view order.
    pub fn iter(&self) -> impl Iterator<Item = &Movie> + '_ {
        self.rows.iter().map(move |&i| &self.base.movies[i])
    }

    pub fn get(&self, index: usize) -> Option<&Movie> {
        self.rows.get(index).map(|&i| &self.base.movies[i])
    }

    pub fn first(&self) -> Option<&Movie> {
        self.get(0)
    }

    pub fn titles(&self) -> Vec<&str> {
        self.iter().map(|m| m.title.as_str()).collect()
    }

    /// Raw-source bookkeeping of the load this view comes from.
    pub fn source(&self) -> &SourceInfo {
        &self.base.source
    }

    /// Row count of the full load this view comes from.
    pub fn base_len(&self) -> usize {
        self.base.movies.len()
    }

    /// The rows of this view that satisfy `predicate`, order preserved.
    pub fn where_(&self, predicate: impl Fn(&Movie) -> bool) -> MovieTable {
        let rows: Vec<usize> = self
            .rows
            .iter()
            .copied()
            .filter(|&i| predicate(&self.base.movies[i]))
            .collect();
        self.with_rows(rows)
    }

    /// The first `n` rows of this view.
    pub fn head(&self, n: usize) -> MovieTable {
        let end = n.min(self.rows.len());
        self.with_rows(self.rows[..end].to_vec())
    }

    /// Base positions paired with their rows, in view order.
    pub(crate) fn entries(&self) -> impl Iterator<Item = (usize, &Movie)> + '_ {
        self.rows.iter().map(move |&i| (i, &self.base.movies[i]))
    }

    /// A view over the same base with the given base positions.
    pub(crate) fn with_rows(&self, rows: Vec<usize>) -> MovieTable {
        MovieTable {
            base: Arc::clone(&self.base),
            rows: rows.into(),
        }
    }

    /// Whether two views share one loaded base.
    pub fn shares_base_with(&self, other: &MovieTable) -> bool {
        Arc::ptr_eq(&self.base, &other.base)
    }
}

/// Element-wise equality of the visible rows.
impl PartialEq for MovieTable {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}
