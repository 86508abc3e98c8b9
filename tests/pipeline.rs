use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use cinemetrics::data::aggregate::{group_mean, group_sum, pairwise_correlation, top_n, InsightRules};
use cinemetrics::data::export::{write_csv, DEFAULT_EXPORT_COLUMNS};
use cinemetrics::data::{filter, load_file, Column, DataError, DatasetCache, FilterSpec, Value};
use cinemetrics::report::Report;

const HEADER: &str = "original_title,budget,revenue,vote_average,vote_count,popularity,runtime,release_date,genres,director,tagline,overview";

fn write_source(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut text = String::from(HEADER);
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    std::fs::write(&path, text).unwrap();
    path
}

fn scenario(dir: &Path) -> PathBuf {
    write_source(
        dir,
        "scenario.csv",
        &[
            "Movie A,100,300,8.0,1200,12.5,110,2005-06-01,Action,Dir One,A tagline,About A",
            "Movie B,0,50,6.0,300,3.1,95,2010-02-14,,Dir Two,,About B",
            "Movie C,200,150,9.0,900,8.0,130,2010-11-20,Drama,Dir One,C tagline,About C",
        ],
    )
}

fn titles(table: &cinemetrics::data::MovieTable) -> BTreeSet<String> {
    table.titles().into_iter().map(str::to_string).collect()
}

#[test]
fn three_movie_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let table = load_file(&scenario(dir.path())).unwrap();
    assert_eq!(table.len(), 3);

    let b = table.get(1).unwrap();
    assert_eq!(b.primary_genre, "Unknown");
    assert_eq!(b.roi, 0.0);

    let rated = filter(&table, &FilterSpec::new().min_rating(7.0)).unwrap();
    assert_eq!(rated.titles(), vec!["Movie A", "Movie C"]);

    let top = top_n(&table, Column::Revenue, 1, false);
    assert_eq!(top.titles(), vec!["Movie A"]);

    let sums = group_sum(&table, Column::PrimaryGenre, Column::Revenue);
    let expected: BTreeMap<Value, f64> = [
        (Value::from("Action"), 300.0),
        (Value::from("Unknown"), 50.0),
        (Value::from("Drama"), 150.0),
    ]
    .into_iter()
    .collect();
    assert_eq!(sums, expected);

    let r = pairwise_correlation(&table, Column::Budget, Column::Revenue).unwrap();
    assert!((-1.0..=1.0).contains(&r));
}

#[test]
fn derived_columns_hold_for_every_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(
        dir.path(),
        "rows.csv",
        &[
            "Zero Zero,0,0,5.0,10,1.0,90,2001-01-01,Comedy,D,,O",
            "Zero Budget,0,1000000,5.0,10,1.0,90,2001-01-01,Comedy,D,,O",
            "Break Even,500,500,5.0,10,1.0,90,2001-01-01, | Horror ,D,,O",
            "Garbled,lots,2e6,n/a,10,1.0,90,someday,,D,,O",
            "Hit,1000000,4500000,7.1,10,1.0,90,6/9/15,Drama|Crime,D,,O",
        ],
    );
    let table = load_file(&path).unwrap();
    assert_eq!(table.len(), 5);

    for m in table.iter() {
        assert_eq!(m.profit, m.revenue - m.budget);
        assert_eq!(m.is_profitable, m.profit > 0.0);
        assert!(!m.primary_genre.is_empty());
        if m.budget == 0.0 {
            assert_eq!(m.roi, 0.0);
        }
    }

    let by_title = |t: &str| table.iter().find(|m| m.title == t).unwrap().clone();
    assert_eq!(by_title("Zero Budget").roi, 0.0);
    assert!(!by_title("Break Even").is_profitable);
    assert_eq!(by_title("Break Even").primary_genre, "Horror");

    let garbled = by_title("Garbled");
    assert_eq!(garbled.budget, 0.0);
    assert_eq!(garbled.revenue, 2e6);
    assert_eq!(garbled.vote_average, None);
    assert_eq!(garbled.year, None);
    assert_eq!(garbled.primary_genre, "Unknown");

    let hit = by_title("Hit");
    assert_eq!(hit.year, Some(2015));
    assert_eq!(hit.decade, Some(2010));
    assert!((hit.roi - 350.0).abs() < 1e-9);
    assert_eq!(hit.genres, vec!["Drama", "Crime"]);
}

#[test]
fn loading_twice_is_element_wise_identical() {
    let dir = tempfile::tempdir().unwrap();
    let path = scenario(dir.path());
    assert_eq!(load_file(&path).unwrap(), load_file(&path).unwrap());

    let cache = DatasetCache::new();
    let first = cache.load(&path).unwrap();
    let second = cache.load(&path).unwrap();
    assert!(first.shares_base_with(&second));
    assert_eq!(first, second);
}

#[test]
fn filters_compose_with_and() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(
        dir.path(),
        "mixed.csv",
        &[
            "Epic,200000000,900000000,7.8,5000,50,150,2012-05-04,Action,D,,O",
            "Noisy,180000000,650000000,6.1,4000,40,140,2014-07-01,Action,D,,O",
            "Quiet,3000000,9000000,7.4,800,5,100,2008-03-03,Drama,D,,O",
            "Meh,40000000,30000000,5.5,600,4,100,2011-09-09,Comedy,D,,O",
        ],
    );
    let table = load_file(&path).unwrap();

    let rated = filter(&table, &FilterSpec::new().min_rating(7.0)).unwrap();
    let blockbusters = filter(&table, &FilterSpec::new().blockbusters_only(true)).unwrap();
    let both = filter(
        &table,
        &FilterSpec::new().min_rating(7.0).blockbusters_only(true),
    )
    .unwrap();

    let intersection: BTreeSet<String> = titles(&rated)
        .intersection(&titles(&blockbusters))
        .cloned()
        .collect();
    assert_eq!(titles(&both), intersection);
    assert_eq!(both.titles(), vec!["Epic"]);
}

#[test]
fn inverted_year_range_leaves_previous_view() {
    let dir = tempfile::tempdir().unwrap();
    let table = load_file(&scenario(dir.path())).unwrap();

    let view = filter(&table, &FilterSpec::new().year_range(2000, 2010)).unwrap();
    let snapshot = view.clone();

    let err = filter(&table, &FilterSpec::new().year_range(2010, 2000)).unwrap_err();
    assert!(matches!(err, DataError::InvalidRange { .. }));
    assert_eq!(view, snapshot);
    assert_eq!(view.len(), 3);
}

#[test]
fn empty_selection_aggregates_gracefully() {
    let dir = tempfile::tempdir().unwrap();
    let table = load_file(&scenario(dir.path())).unwrap();
    let empty = filter(&table, &FilterSpec::new().min_rating(9.5)).unwrap();
    assert!(empty.is_empty());

    assert!(group_mean(&empty, Column::PrimaryGenre, Column::Revenue).is_empty());
    assert_eq!(pairwise_correlation(&empty, Column::Budget, Column::Revenue), None);
    assert!(top_n(&empty, Column::Revenue, 5, false).is_empty());

    let report = Report::build(&empty, &InsightRules::default());
    assert_eq!(report.analysed_rows, 0);
    assert!(!report.to_string().is_empty());
}

#[test]
fn load_failures_are_typed() {
    let dir = tempfile::tempdir().unwrap();

    let missing = load_file(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(missing, DataError::DataSourceUnavailable { .. }));

    let path = dir.path().join("partial.csv");
    std::fs::write(&path, "original_title,budget\nSolo,10\n").unwrap();
    match load_file(&path).unwrap_err() {
        DataError::SchemaMismatch { missing, .. } => {
            assert!(missing.contains(&"revenue".to_string()));
            assert!(!missing.contains(&"budget".to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn filtered_view_exports_in_row_order() {
    let dir = tempfile::tempdir().unwrap();
    let table = load_file(&scenario(dir.path())).unwrap();
    let view = filter(&table, &FilterSpec::new().genres(["Action", "Drama"])).unwrap();

    let mut out = Vec::new();
    write_csv(&view, &DEFAULT_EXPORT_COLUMNS, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("original_title,year,primary_genre"));
    assert!(lines[1].starts_with("Movie A,2005,Action"));
    assert!(lines[2].starts_with("Movie C,2010,Drama"));
}
