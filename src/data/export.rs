use std::io::Write;

use super::error::Result;
use super::model::Column;
use super::table::MovieTable;

/// Columns written when the caller does not pick any.
pub const DEFAULT_EXPORT_COLUMNS: [Column; 8] = [
    Column::Title,
    Column::Year,
    Column::PrimaryGenre,
    Column::Director,
    Column::Budget,
    Column::Revenue,
    Column::Profit,
    Column::VoteAverage,
];

/// Write the rows of `table` as CSV: a header of column names, then one
/// record per row in view order. Embedded delimiters, quotes and newlines
/// are quoted by the writer; nulls become empty fields.
pub fn write_csv<W: Write>(table: &MovieTable, columns: &[Column], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(columns.iter().map(|c| c.name()))?;
    for movie in table.iter() {
        writer.write_record(columns.iter().map(|&c| movie.value(c).to_field()))?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::derive::{derive_movie, RawMovie};

    #[test]
    fn quotes_embedded_delimiters_and_keeps_order() {
        let movies = ["Crouching Tiger, Hidden Dragon", "Say \"Hi\"", "Plain"]
            .iter()
            .map(|t| {
                derive_movie(
                    &RawMovie::new()
                        .with(Column::Title, *t)
                        .with(Column::Budget, 10.0)
                        .with(Column::Revenue, 25.5),
                )
                .movie
            })
            .collect();
        let table = MovieTable::from_movies(movies);

        let mut out = Vec::new();
        write_csv(&table, &[Column::Title, Column::Profit, Column::Year], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "original_title,profit,year\n\
             \"Crouching Tiger, Hidden Dragon\",15.5,\n\
             \"Say \"\"Hi\"\"\",15.5,\n\
             Plain,15.5,\n"
        );
    }

    #[test]
    fn quotes_embedded_newlines() {
        let movie = derive_movie(
            &RawMovie::new()
                .with(Column::Title, "Two\nLines")
                .with(Column::Tagline, "first\r\nsecond"),
        )
        .movie;
        let table = MovieTable::from_movies(vec![movie]);

        let mut out = Vec::new();
        write_csv(&table, &[Column::Title, Column::Tagline], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "original_title,tagline\n\"Two\nLines\",\"first\r\nsecond\"\n"
        );

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[0], "Two\nLines");
        assert_eq!(&record[1], "first\r\nsecond");
    }

    #[test]
    fn empty_table_writes_only_the_header() {
        let table = MovieTable::from_movies(Vec::new());
        let mut out = Vec::new();
        write_csv(&table, &DEFAULT_EXPORT_COLUMNS, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "original_title,year,primary_genre,director,budget,revenue,profit,vote_average\n"
        );
    }
}
