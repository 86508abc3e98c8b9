use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;

use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt32Type,
    UInt64Type,
};
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::derive::{derive_movie, RawMovie};
use super::error::{DataError, Result};
use super::model::{Column, Value};
use super::table::{MovieTable, SourceInfo};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a movie table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with at least the raw movie columns (recommended)
/// * `.json`    – `[{ "original_title": ..., "budget": ..., ... }, ...]`
/// * `.parquet` – one column per raw movie column
pub fn load_file(path: &Path) -> Result<MovieTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let frame = match ext.as_str() {
        "csv" => read_csv(path)?,
        "json" => read_json(path)?,
        "parquet" | "pq" => read_parquet(path)?,
        other => {
            return Err(DataError::unavailable(
                path,
                format!("unsupported file extension: .{other}"),
            ))
        }
    };

    let table = build_table(path, frame)?;
    log::info!(
        "Loaded {} movies from {} ({} source columns)",
        table.len(),
        path.display(),
        table.source().columns.len()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// RawFrame – column-aligned cells before derivation
// ---------------------------------------------------------------------------

/// Source cells as read, one `Vec<Value>` per row aligned with `columns`.
#[derive(Debug, Default)]
struct RawFrame {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl RawFrame {
    fn column_index(&mut self, name: &str) -> usize {
        match self.columns.iter().position(|c| c == name) {
            Some(i) => i,
            None => {
                self.columns.push(name.to_string());
                self.columns.len() - 1
            }
        }
    }
}

/// Check the schema, derive every row and tally source completeness.
fn build_table(path: &Path, frame: RawFrame) -> Result<MovieTable> {
    let missing: Vec<String> = Column::RAW
        .iter()
        .filter(|c| !frame.columns.iter().any(|name| name == c.name()))
        .map(|c| c.name().to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DataError::SchemaMismatch {
            path: path.to_path_buf(),
            missing,
        });
    }

    let positions: Vec<(Column, usize)> = Column::RAW
        .iter()
        .filter_map(|&c| {
            frame
                .columns
                .iter()
                .position(|name| name == c.name())
                .map(|i| (c, i))
        })
        .collect();

    let width = frame.columns.len();
    let mut source = SourceInfo {
        columns: frame.columns.clone(),
        missing: vec![0; width],
        complete_rows: 0,
        degraded_cells: 0,
    };

    let mut movies = Vec::with_capacity(frame.rows.len());
    for (row_no, cells) in frame.rows.iter().enumerate() {
        let mut complete = true;
        for col in 0..width {
            if cells.get(col).map_or(true, is_missing) {
                source.missing[col] += 1;
                complete = false;
            }
        }
        if complete {
            source.complete_rows += 1;
        }

        let mut raw = RawMovie::new();
        for &(column, idx) in &positions {
            raw.set(column, cells.get(idx).cloned().unwrap_or(Value::Null));
        }

        let derived = derive_movie(&raw);
        for column in &derived.degraded {
            log::debug!(
                "Row {row_no}: unusable {column} value {:?}, treated as missing",
                raw.get(*column)
            );
        }
        source.degraded_cells += derived.degraded.len();
        movies.push(derived.movie);
    }

    if source.degraded_cells > 0 {
        log::info!(
            "{} malformed cells in {} were degraded to null/sentinel values",
            source.degraded_cells,
            path.display()
        );
    }

    Ok(MovieTable::new(movies, source))
}

fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Text(s) => s.trim().is_empty(),
        Value::Float(f) => f.is_nan(),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one movie per record.
/// Cells stay text here; typing happens during derivation so that titles
/// like `"007"` survive untouched. Short records read as trailing nulls.
fn read_csv(path: &Path) -> Result<RawFrame> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| DataError::unavailable(path, e))?;

    let columns: Vec<String> = reader
        .byte_headers()
        .map_err(|e| DataError::unavailable(path, format!("reading CSV headers: {e}")))?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.byte_records().enumerate() {
        let record = result
            .map_err(|e| DataError::unavailable(path, format!("CSV row {row_no}: {e}")))?;
        let cells = (0..columns.len())
            .map(|i| match record.get(i) {
                Some(bytes) if !bytes.is_empty() => {
                    Value::Text(String::from_utf8_lossy(bytes).into_owned())
                }
                _ => Value::Null,
            })
            .collect();
        rows.push(cells);
    }

    Ok(RawFrame { columns, rows })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `to_json(orient='records')`):
///
/// ```json
/// [
///   { "original_title": "Avatar", "budget": 237000000, "genres": "Action|Adventure", ... },
///   ...
/// ]
/// ```
///
/// Keys missing from a record read as null.
fn read_json(path: &Path) -> Result<RawFrame> {
    let text = std::fs::read_to_string(path).map_err(|e| DataError::unavailable(path, e))?;
    let root: JsonValue = serde_json::from_str(&text)
        .map_err(|e| DataError::unavailable(path, format!("parsing JSON: {e}")))?;

    let records = root
        .as_array()
        .ok_or_else(|| DataError::unavailable(path, "expected top-level JSON array"))?;

    let mut frame = RawFrame::default();
    let mut keyed_rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| DataError::unavailable(path, format!("row {i} is not a JSON object")))?;
        let cells: Vec<(usize, Value)> = obj
            .iter()
            .map(|(key, val)| (frame.column_index(key), json_to_value(val)))
            .collect();
        keyed_rows.push(cells);
    }

    let width = frame.columns.len();
    frame.rows = keyed_rows
        .into_iter()
        .map(|cells| {
            let mut row = vec![Value::Null; width];
            for (idx, value) in cells {
                row[idx] = value;
            }
            row
        })
        .collect();
    Ok(frame)
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per raw movie column.
///
/// Strings, integers, floats, booleans and `Date32` are read natively; any
/// other Arrow type is read through its display form.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn read_parquet(path: &Path) -> Result<RawFrame> {
    let file = std::fs::File::open(path).map_err(|e| DataError::unavailable(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| DataError::unavailable(path, format!("reading parquet metadata: {e}")))?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder
        .build()
        .map_err(|e| DataError::unavailable(path, format!("building parquet reader: {e}")))?;
    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result
            .map_err(|e| DataError::unavailable(path, format!("reading parquet record batch: {e}")))?;
        for row in 0..batch.num_rows() {
            let cells = (0..batch.num_columns())
                .map(|col| arrow_to_value(batch.column(col), row))
                .collect();
            rows.push(cells);
        }
    }

    Ok(RawFrame { columns, rows })
}

// -- Parquet / Arrow helpers --

/// Days between 0001-01-01 (CE day 1) and the Unix epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Extract a single cell from an Arrow column at a given row.
fn arrow_to_value(col: &Arc<dyn Array>, row: usize) -> Value {
    if col.is_null(row) {
        return Value::Null;
    }
    match col.data_type() {
        DataType::Utf8 => Value::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Value::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => Value::Integer(col.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => Value::Integer(col.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => Value::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => Value::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt32 => Value::Integer(col.as_primitive::<UInt32Type>().value(row) as i64),
        DataType::UInt64 => Value::Float(col.as_primitive::<UInt64Type>().value(row) as f64),
        DataType::Float32 => Value::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => Value::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => Value::Bool(col.as_boolean().value(row)),
        DataType::Date32 => {
            let days = col.as_primitive::<arrow::datatypes::Date32Type>().value(row);
            NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
                .map(Value::Date)
                .unwrap_or(Value::Null)
        }
        _ => match arrow::util::display::array_value_to_string(col, row) {
            Ok(s) => Value::Text(s),
            Err(e) => {
                log::debug!("Unreadable {:?} cell at row {row}: {e}", col.data_type());
                Value::Null
            }
        },
    }
}

// ---------------------------------------------------------------------------
// DatasetCache – load once per source version
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct CachedTable {
    modified: Option<SystemTime>,
    table: MovieTable,
}

/// Keeps one derived table per source path and hands out cheap clones.
/// A path is re-read only when its modification time changes.
///
/// Owned by whoever drives the process and passed down explicitly. The lock
/// is never held while a source is read, so two callers missing on the same
/// path at once may both load it; the last insert wins.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: Mutex<HashMap<PathBuf, CachedTable>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<PathBuf, CachedTable>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn load(&self, path: &Path) -> Result<MovieTable> {
        let modified = match std::fs::metadata(path) {
            Ok(meta) => meta.modified().ok(),
            Err(e) => {
                self.invalidate(path);
                return Err(DataError::unavailable(path, e));
            }
        };

        {
            let mut entries = self.entries();
            if let Some(cached) = entries.get(path) {
                if cached.modified.is_some() && cached.modified == modified {
                    log::debug!("Serving {} from cache", path.display());
                    return Ok(cached.table.clone());
                }
            }
            // Stale: drop it now so a failed reload leaves nothing behind.
            entries.remove(path);
        }

        let table = load_file(path)?;
        self.entries().insert(
            path.to_path_buf(),
            CachedTable {
                modified,
                table: table.clone(),
            },
        );
        Ok(table)
    }

    pub fn invalidate(&self, path: &Path) {
        self.entries().remove(path);
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use super::*;

    const HEADER: &str = "id,original_title,budget,revenue,vote_average,vote_count,popularity,runtime,release_date,genres,director,tagline,overview";

    fn write_file(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    fn sample_csv() -> String {
        format!(
            "{HEADER}\n\
             1,Alpha,100,300,8.0,1200,10.5,120,2005-03-01,Action|Adventure,Ann,\"Big, loud\",Plot\n\
             2,Beta,oops,50,6.0,10,1.0,,6/9/15,,Bob,,Plot\n\
             3,007,200,150,9.0,800,3.2,95,someday,Drama,Cy,Quiet,\n"
        )
    }

    #[test]
    fn csv_rows_are_derived_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "movies.csv", &sample_csv());
        let table = load_file(&path).unwrap();

        assert_eq!(table.titles(), vec!["Alpha", "Beta", "007"]);
        let beta = table.get(1).unwrap();
        assert_eq!(beta.budget, 0.0);
        assert_eq!(beta.primary_genre, "Unknown");
        assert_eq!(beta.year, Some(2015));
        let third = table.get(2).unwrap();
        assert_eq!(third.year, None);
        assert_eq!(third.tagline.as_deref(), Some("Quiet"));
        assert_eq!(table.get(0).unwrap().tagline.as_deref(), Some("Big, loud"));
    }

    #[test]
    fn csv_source_info_counts_missing_and_degraded_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "movies.csv", &sample_csv());
        let table = load_file(&path).unwrap();
        let info = table.source();

        assert_eq!(info.columns.len(), 13);
        assert_eq!(info.complete_rows, 1);
        let missing_of = |name: &str| {
            let i = info.columns.iter().position(|c| c == name).unwrap();
            info.missing[i]
        };
        assert_eq!(missing_of("genres"), 1);
        assert_eq!(missing_of("tagline"), 1);
        assert_eq!(missing_of("overview"), 1);
        assert_eq!(missing_of("budget"), 0);
        // "oops" budget and "someday" date
        assert_eq!(info.degraded_cells, 2);
    }

    #[test]
    fn missing_required_column_is_a_schema_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "movies.csv", "original_title,budget\nA,1\n");
        match load_file(&path) {
            Err(DataError::SchemaMismatch { missing, .. }) => {
                assert!(missing.contains(&"revenue".to_string()));
                assert!(!missing.contains(&"budget".to_string()));
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, DataError::DataSourceUnavailable { .. }));
    }

    #[test]
    fn unknown_extension_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "movies.xlsx", "");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, DataError::DataSourceUnavailable { .. }));
    }

    #[test]
    fn json_records_load_with_absent_keys_as_null() {
        let dir = tempfile::tempdir().unwrap();
        let body = r#"[
            {"original_title": "Alpha", "budget": 100, "revenue": 300, "vote_average": 8.0,
             "vote_count": 5, "popularity": 1.5, "runtime": 90, "release_date": "2005-01-02",
             "genres": "Action", "director": "Ann", "tagline": null, "overview": "x"},
            {"original_title": "Beta", "budget": 0, "revenue": 50, "vote_average": 6.0,
             "vote_count": 1, "popularity": 0.5, "runtime": 80, "release_date": "2010-01-01",
             "director": "Bob", "tagline": "t", "overview": "y"}
        ]"#;
        let path = write_file(&dir, "movies.json", body);
        let table = load_file(&path).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0).unwrap().roi, 200.0);
        assert_eq!(table.get(1).unwrap().primary_genre, "Unknown");
        assert_eq!(table.get(1).unwrap().genres_raw, None);
    }

    #[test]
    fn parquet_tables_load() {
        use arrow::array::{Float64Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.parquet");

        let text = |v: Vec<Option<&str>>| Arc::new(StringArray::from(v)) as Arc<dyn Array>;
        let num = |v: Vec<Option<f64>>| Arc::new(Float64Array::from(v)) as Arc<dyn Array>;
        let mut fields = Vec::new();
        let mut arrays = Vec::new();
        for column in Column::RAW {
            let (dt, array) = match column {
                Column::Title => (DataType::Utf8, text(vec![Some("Alpha"), Some("Beta")])),
                Column::ReleaseDate => (DataType::Utf8, text(vec![Some("2001-05-04"), None])),
                Column::Genres => (DataType::Utf8, text(vec![Some("Comedy|Drama"), None])),
                Column::Director | Column::Tagline | Column::Overview => {
                    (DataType::Utf8, text(vec![Some("x"), Some("y")]))
                }
                Column::Budget => (DataType::Float64, num(vec![Some(10.0), Some(0.0)])),
                Column::Revenue => (DataType::Float64, num(vec![Some(25.0), Some(5.0)])),
                _ => (DataType::Float64, num(vec![Some(1.0), None])),
            };
            fields.push(Field::new(column.name(), dt, true));
            arrays.push(array);
        }
        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), arrays).unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.titles(), vec!["Alpha", "Beta"]);
        let alpha = table.get(0).unwrap();
        assert_eq!(alpha.profit, 15.0);
        assert_eq!(alpha.primary_genre, "Comedy");
        assert_eq!(alpha.decade, Some(2000));
        assert_eq!(table.get(1).unwrap().vote_average, None);
        assert_eq!(table.source().complete_rows, 1);
    }

    #[test]
    fn cache_serves_the_same_base_until_the_file_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "movies.csv", &sample_csv());
        let cache = DatasetCache::new();

        let first = cache.load(&path).unwrap();
        let second = cache.load(&path).unwrap();
        assert!(first.shares_base_with(&second));

        cache.invalidate(&path);
        let third = cache.load(&path).unwrap();
        assert!(!first.shares_base_with(&third));
        assert_eq!(first, third);
    }

    #[test]
    fn cache_reloads_when_the_modification_time_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "movies.csv", &sample_csv());
        let cache = DatasetCache::new();
        let first = cache.load(&path).unwrap();

        let body = format!("{HEADER}\n9,Gamma,10,20,5.0,3,1.0,90,2020-01-01,Horror,Di,,Plot\n");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f.set_modified(SystemTime::now() + Duration::from_secs(120)).unwrap();
        drop(f);

        let reloaded = cache.load(&path).unwrap();
        assert!(!first.shares_base_with(&reloaded));
        assert_eq!(reloaded.titles(), vec!["Gamma"]);
        assert!(cache.load(&path).unwrap().shares_base_with(&reloaded));
    }

    #[test]
    fn failed_reload_evicts_the_cached_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "movies.csv", &sample_csv());
        let cache = DatasetCache::new();
        cache.load(&path).unwrap();
        assert_eq!(cache.entries().len(), 1);

        std::fs::remove_file(&path).unwrap();
        let err = cache.load(&path).unwrap_err();
        assert!(matches!(err, DataError::DataSourceUnavailable { .. }));
        assert!(cache.entries().is_empty());
    }

    #[test]
    fn unreadable_reload_evicts_the_cached_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "movies.csv", &sample_csv());
        let cache = DatasetCache::new();
        cache.load(&path).unwrap();

        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"original_title,budget\nSolo,1\n").unwrap();
        f.set_modified(SystemTime::now() + Duration::from_secs(120)).unwrap();
        drop(f);
        assert!(matches!(
            cache.load(&path),
            Err(DataError::SchemaMismatch { .. })
        ));
        assert!(cache.entries().is_empty());
    }

    #[test]
    fn cache_reports_missing_sources() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DatasetCache::new();
        let err = cache.load(&dir.path().join("gone.csv")).unwrap_err();
        assert!(matches!(err, DataError::DataSourceUnavailable { .. }));
    }
}
