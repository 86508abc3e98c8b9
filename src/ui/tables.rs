use eframe::egui::{self, Align, Layout, RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use cinemetrics::data::aggregate::{genre_stats, highlights, summary, InsightRules};
use cinemetrics::data::export::{write_csv, DEFAULT_EXPORT_COLUMNS};
use cinemetrics::data::{Column, Movie, MovieTable};

use crate::color::GenreColors;
use crate::state::AppState;
use crate::ui::{fmt_money, fmt_opt};

const ROW_HEIGHT: f32 = 18.0;

fn cell_text(movie: &Movie, column: Column) -> String {
    match column {
        Column::Budget | Column::Revenue | Column::Profit => fmt_money(movie.number(column).unwrap_or(0.0)),
        _ => movie.value(column).to_string(),
    }
}

// ---------------------------------------------------------------------------
// Summary cards
// ---------------------------------------------------------------------------

fn card(ui: &mut Ui, title: &str, value: String, detail: Option<String>) {
    ui.group(|ui: &mut Ui| {
        ui.vertical(|ui: &mut Ui| {
            ui.weak(title);
            ui.heading(value);
            if let Some(detail) = detail {
                ui.small(detail);
            }
        });
    });
}

/// Headline numbers and the highest grossing / top rated / best ROI movies.
pub fn summary_cards(ui: &mut Ui, view: &MovieTable, rules: &InsightRules) {
    let s = summary(view);
    let h = highlights(view, rules);

    ui.horizontal_wrapped(|ui: &mut Ui| {
        card(ui, "Movies", s.movies.to_string(), None);
        card(ui, "Total revenue", fmt_money(s.total_revenue), None);
        card(ui, "Total profit", fmt_money(s.total_profit), None);
        card(ui, "Avg rating", fmt_opt(s.mean_rating, 1), None);
        card(
            ui,
            "Success rate",
            fmt_opt(s.success_rate.map(|r| r * 100.0), 1) + "%",
            None,
        );
    });
    ui.horizontal_wrapped(|ui: &mut Ui| {
        if let Some(m) = h.highest_grossing {
            card(ui, "Highest grossing", m.title.clone(), Some(fmt_money(m.revenue)));
        }
        if let Some(m) = h.top_rated {
            card(
                ui,
                "Top rated",
                m.title.clone(),
                Some(format!("{} ★", fmt_opt(m.vote_average, 1))),
            );
        }
        if let Some(m) = h.best_roi {
            card(ui, "Best ROI", m.title.clone(), Some(format!("{:.0}%", m.roi)));
        }
    });
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Rows of `table` in view order under the given columns.
pub fn movie_table(ui: &mut Ui, id: &str, table: &MovieTable, columns: &[Column]) {
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(Layout::left_to_right(Align::Center))
            .column(TableColumn::initial(220.0).at_least(80.0).clip(true))
            .columns(TableColumn::auto(), columns.len().saturating_sub(1))
            .header(20.0, |mut header| {
                for column in columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(column.label());
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, table.len(), |mut row| {
                    let Some(movie) = table.get(row.index()) else {
                        return;
                    };
                    for &column in columns {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell_text(movie, column));
                        });
                    }
                });
            });
    });
}

/// Per-genre performance, best earning genre first.
pub fn genre_table(ui: &mut Ui, view: &MovieTable, colors: &GenreColors) {
    let stats = genre_stats(view);
    ui.push_id("genre_stats", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .cell_layout(Layout::left_to_right(Align::Center))
            .columns(TableColumn::auto().at_least(90.0), 7)
            .header(20.0, |mut header| {
                for title in [
                    "Genre",
                    "Movies",
                    "Total revenue",
                    "Avg revenue",
                    "Avg profit",
                    "Avg rating",
                    "Success rate",
                ] {
                    header.col(|ui: &mut Ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, stats.len(), |mut row| {
                    let g = &stats[row.index()];
                    row.col(|ui: &mut Ui| {
                        ui.label(RichText::new(&g.genre).color(colors.color_for(&g.genre)));
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(g.movies.to_string());
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(fmt_money(g.total_revenue));
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(fmt_money(g.mean_revenue));
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(fmt_money(g.mean_profit));
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(fmt_opt(g.mean_rating, 1));
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(format!("{:.1}%", g.success_rate * 100.0));
                    });
                });
            });
    });
}

// ---------------------------------------------------------------------------
// Explorer
// ---------------------------------------------------------------------------

/// Searchable, sortable listing of the visible rows with CSV export.
pub fn explorer(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Search");
        ui.add(egui::TextEdit::singleline(&mut state.explorer.search).hint_text("title…"));

        ui.label("Sort by");
        egui::ComboBox::from_id_salt("explorer_sort")
            .selected_text(state.explorer.sort.label())
            .show_ui(ui, |ui: &mut Ui| {
                for column in std::iter::once(Column::Title).chain(Column::NUMERIC_AXES) {
                    ui.selectable_value(&mut state.explorer.sort, column, column.label());
                }
            });
        ui.checkbox(&mut state.explorer.ascending, "Ascending");
    });

    let Some(rows) = state.explorer_rows() else {
        return;
    };

    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("{} movies", rows.len()));
        if ui.button("Export CSV…").clicked() {
            export_dialog(state, &rows);
        }
    });
    ui.separator();

    movie_table(ui, "explorer_table", &rows, &DEFAULT_EXPORT_COLUMNS);
}

fn export_dialog(state: &mut AppState, rows: &MovieTable) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export movies")
        .set_file_name("movies.csv")
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return;
    };

    let result = std::fs::File::create(&path)
        .map_err(anyhow::Error::from)
        .and_then(|file| write_csv(rows, &DEFAULT_EXPORT_COLUMNS, file).map_err(anyhow::Error::from));
    state.status_message = Some(match result {
        Ok(()) => {
            log::info!("Exported {} movies to {}", rows.len(), path.display());
            format!("Exported {} movies to {}", rows.len(), path.display())
        }
        Err(e) => {
            log::error!("Export to {} failed: {e:#}", path.display());
            format!("Export failed: {e:#}")
        }
    });
}
