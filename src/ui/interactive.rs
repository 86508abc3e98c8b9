use eframe::egui::{self, Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot, Points};

use cinemetrics::data::explore::{compare, genre_deep_dive, scatter, ChartAxes};
use cinemetrics::data::{Column, Movie, MovieTable, Value};

use crate::color::GenreColors;
use crate::state::AppState;
use crate::ui::{fmt_money, fmt_opt, tables};

/// Most points the custom chart draws.
const SCATTER_LIMIT: usize = 400;
const DEEP_DIVE_TOP: usize = 10;

const FIRST_COLOR: Color32 = Color32::from_rgb(34, 211, 238);
const SECOND_COLOR: Color32 = Color32::from_rgb(245, 158, 11);

fn column_picker(ui: &mut Ui, id: &str, label: &str, current: &mut Column, choices: &[Column]) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(label);
        egui::ComboBox::from_id_salt(id)
            .selected_text(current.label())
            .show_ui(ui, |ui: &mut Ui| {
                for &column in choices {
                    ui.selectable_value(current, column, column.label());
                }
            });
    });
}

fn metric_text(column: Column, value: Option<f64>) -> String {
    match column {
        Column::Budget | Column::Revenue | Column::Profit => {
            value.map(fmt_money).unwrap_or_else(|| "–".to_string())
        }
        _ => fmt_opt(value, 1),
    }
}

// ---------------------------------------------------------------------------
// Custom chart builder
// ---------------------------------------------------------------------------

fn chart_builder(ui: &mut Ui, view: &MovieTable, axes: &mut ChartAxes, genre_colors: &GenreColors) {
    ui.heading("Custom chart");
    ui.horizontal(|ui: &mut Ui| {
        column_picker(ui, "chart_x", "X axis", &mut axes.x, &Column::NUMERIC_AXES);
        column_picker(ui, "chart_y", "Y axis", &mut axes.y, &Column::NUMERIC_AXES);
        column_picker(ui, "chart_color", "Colour by", &mut axes.color_by, &Column::GROUPINGS);
        column_picker(ui, "chart_size", "Size by", &mut axes.size_by, &Column::NUMERIC_AXES);
    });

    let series = match scatter(view, axes, SCATTER_LIMIT) {
        Ok(series) => series,
        Err(e) => {
            ui.colored_label(Color32::RED, e.to_string());
            return;
        }
    };

    let labels: Vec<String> = series.keys().map(Value::to_string).collect();
    let palette = if axes.color_by == Column::PrimaryGenre {
        genre_colors.clone()
    } else {
        GenreColors::new(labels.iter().map(String::as_str))
    };
    let max_size = series
        .values()
        .flatten()
        .filter_map(|p| p.size)
        .fold(0.0_f64, |acc, s| acc.max(s.abs()));

    Plot::new("custom_chart")
        .legend(Legend::default())
        .height(360.0)
        .x_axis_label(axes.x.label())
        .y_axis_label(axes.y.label())
        .show(ui, |plot_ui| {
            for (label, points) in series.iter().zip(&labels).map(|((_, p), l)| (l, p)) {
                let color = palette.color_for(label);
                for p in points {
                    let radius = match p.size {
                        Some(s) if max_size > 0.0 => 2.0 + 8.0 * (s.abs() / max_size).sqrt() as f32,
                        _ => 2.0,
                    };
                    plot_ui.points(
                        Points::new(vec![[p.x, p.y]])
                            .name(label)
                            .color(color)
                            .radius(radius),
                    );
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Side-by-side comparison
// ---------------------------------------------------------------------------

fn movie_card(ui: &mut Ui, movie: &Movie, color: Color32) {
    ui.group(|ui: &mut Ui| {
        ui.vertical(|ui: &mut Ui| {
            ui.colored_label(color, egui::RichText::new(&movie.title).strong());
            ui.label(format!(
                "{} • {}",
                movie.year_label(),
                movie.director.as_deref().unwrap_or("Unknown")
            ));
            ui.label(format!(
                "Budget {} • Revenue {}",
                fmt_money(movie.budget),
                fmt_money(movie.revenue)
            ));
            ui.label(format!(
                "Rating {} • {} votes",
                fmt_opt(movie.vote_average, 1),
                fmt_opt(movie.vote_count, 0)
            ));
        });
    });
}

fn comparison(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Movie comparison");
    let Some((pool, first, second)) = state.comparison() else {
        ui.label("No movies match the current filters.");
        return;
    };

    ui.horizontal(|ui: &mut Ui| {
        for (id, slot, current) in [
            ("compare_first", &mut state.interactive.first, &first),
            ("compare_second", &mut state.interactive.second, &second),
        ] {
            egui::ComboBox::from_id_salt(id)
                .width(240.0)
                .selected_text(current.title.as_str())
                .show_ui(ui, |ui: &mut Ui| {
                    for (i, movie) in pool.iter().enumerate() {
                        if ui.selectable_label(*slot == Some(i), &movie.title).clicked() {
                            *slot = Some(i);
                        }
                    }
                });
        }
    });

    let rows = compare(&first, &second);
    Plot::new("comparison")
        .legend(Legend::default())
        .height(220.0)
        .show(ui, |plot_ui| {
            let money: Vec<_> = rows
                .iter()
                .filter(|(c, _, _)| matches!(c, Column::Budget | Column::Revenue | Column::Profit))
                .enumerate()
                .collect();
            for (title, color, offset, pick) in [
                (&first.title, FIRST_COLOR, -0.2, 0),
                (&second.title, SECOND_COLOR, 0.2, 1),
            ] {
                let bars = money
                    .iter()
                    .map(|(i, (column, a, b))| {
                        let v = if pick == 0 { *a } else { *b };
                        Bar::new(*i as f64 + offset, v.unwrap_or(0.0) / 1e6)
                            .width(0.35)
                            .name(format!("{} ($M)", column.label()))
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).name(title).color(color));
            }
        });

    egui::Grid::new("comparison_metrics").striped(true).show(ui, |ui: &mut Ui| {
        ui.label("");
        ui.colored_label(FIRST_COLOR, &first.title);
        ui.colored_label(SECOND_COLOR, &second.title);
        ui.end_row();
        for (column, a, b) in &rows {
            ui.label(column.label());
            ui.label(metric_text(*column, *a));
            ui.label(metric_text(*column, *b));
            ui.end_row();
        }
    });

    ui.horizontal(|ui: &mut Ui| {
        movie_card(ui, &first, FIRST_COLOR);
        movie_card(ui, &second, SECOND_COLOR);
    });
}

// ---------------------------------------------------------------------------
// Genre deep dive
// ---------------------------------------------------------------------------

fn deep_dive(ui: &mut Ui, state: &mut AppState, view: &MovieTable) {
    ui.heading("Genre deep dive");
    let Some(genre) = state.deep_dive_genre() else {
        ui.label("No genres match the current filters.");
        return;
    };

    egui::ComboBox::from_id_salt("deep_dive_genre")
        .selected_text(genre.as_str())
        .show_ui(ui, |ui: &mut Ui| {
            for g in state.visible_primary_genres() {
                if ui.selectable_label(g == genre, &g).clicked() {
                    state.interactive.genre = Some(g);
                }
            }
        });

    let dive = genre_deep_dive(view, &genre, DEEP_DIVE_TOP);
    egui::Grid::new("deep_dive_stats").show(ui, |ui: &mut Ui| {
        ui.label("Movies");
        ui.label(dive.summary.movies.to_string());
        ui.end_row();
        ui.label("Avg revenue");
        ui.label(dive.stats.as_ref().map(|s| fmt_money(s.mean_revenue)).unwrap_or_default());
        ui.end_row();
        ui.label("Median revenue");
        ui.label(metric_text(Column::Revenue, dive.median_revenue));
        ui.end_row();
        ui.label("Median budget");
        ui.label(metric_text(Column::Budget, dive.median_budget));
        ui.end_row();
        ui.label("Avg rating");
        ui.label(fmt_opt(dive.summary.mean_rating, 1));
        ui.end_row();
        ui.label("Success rate");
        ui.label(fmt_opt(dive.summary.success_rate.map(|r| r * 100.0), 0) + "%");
        ui.end_row();
    });

    tables::movie_table(
        ui,
        "deep_dive_top",
        &dive.top,
        &[Column::Title, Column::Year, Column::Revenue, Column::Profit, Column::VoteAverage],
    );
}

/// Chart builder, comparison and deep dive over the visible rows.
pub fn interactive(ui: &mut Ui, state: &mut AppState) {
    let Some(view) = state.view.clone() else {
        return;
    };
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let colors = state.genre_colors.clone();
            chart_builder(ui, &view, &mut state.interactive.axes, &colors);
            ui.separator();
            comparison(ui, state);
            ui.separator();
            deep_dive(ui, state, &view);
        });
}
