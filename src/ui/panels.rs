use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use cinemetrics::data::aggregate::summary;

use crate::state::AppState;
use crate::ui::{fmt_money, fmt_opt};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    let bounds = state.bounds;
    let genres = state.all_genres.clone();
    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let form = &mut state.form;

            // ---- Ranges ----
            ui.strong("Release year");
            ui.horizontal(|ui: &mut Ui| {
                changed |= ui
                    .add(egui::DragValue::new(&mut form.year_min).range(bounds.years.0..=bounds.years.1))
                    .changed();
                ui.label("to");
                changed |= ui
                    .add(egui::DragValue::new(&mut form.year_max).range(bounds.years.0..=bounds.years.1))
                    .changed();
            });

            ui.strong("Budget ($M)");
            ui.horizontal(|ui: &mut Ui| {
                changed |= ui
                    .add(
                        egui::DragValue::new(&mut form.budget_min_m)
                            .range(bounds.budget_m.0..=bounds.budget_m.1)
                            .speed(1.0),
                    )
                    .changed();
                ui.label("to");
                changed |= ui
                    .add(
                        egui::DragValue::new(&mut form.budget_max_m)
                            .range(bounds.budget_m.0..=bounds.budget_m.1)
                            .speed(1.0),
                    )
                    .changed();
            });

            ui.strong("Minimum rating");
            changed |= ui
                .add(egui::Slider::new(&mut form.min_rating, 0.0..=10.0).step_by(0.1))
                .changed();
            ui.separator();

            // ---- Quick filters ----
            changed |= ui.checkbox(&mut form.profitable_only, "Profitable only").changed();
            changed |= ui.checkbox(&mut form.blockbusters_only, "Blockbusters only").changed();
            changed |= ui.checkbox(&mut form.hidden_gems_only, "Hidden gems only").changed();
            ui.separator();

            // ---- Genres ----
            let header = if form.genres.is_empty() {
                format!("Genres  (all {})", genres.len())
            } else {
                format!("Genres  ({}/{})", form.genres.len(), genres.len())
            };
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("genres")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    if ui.small_button("Clear").clicked() && !form.genres.is_empty() {
                        form.genres.clear();
                        changed = true;
                    }
                    for genre in &genres {
                        let mut checked = form.genres.contains(genre);
                        let text = RichText::new(genre).color(state.genre_colors.color_for(genre));
                        if ui.checkbox(&mut checked, text).changed() {
                            if checked {
                                form.genres.insert(genre.clone());
                            } else {
                                form.genres.remove(genre);
                            }
                            changed = true;
                        }
                    }
                });
            ui.separator();

            if ui.button("Reset filters").clicked() {
                *form = crate::state::FilterForm::new(&bounds);
                changed = true;
            }
        });

    if changed {
        state.refilter();
    }

    // ---- Selection stats ----
    if let Some(view) = &state.view {
        ui.separator();
        let s = summary(view);
        egui::Grid::new("selection_stats").show(ui, |ui: &mut Ui| {
            ui.label("Movies");
            ui.label(s.movies.to_string());
            ui.end_row();
            ui.label("Revenue");
            ui.label(fmt_money(s.total_revenue));
            ui.end_row();
            ui.label("Avg rating");
            ui.label(fmt_opt(s.mean_rating, 1));
            ui.end_row();
        });
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(view)) = (&state.dataset, &state.view) {
            ui.label(format!("{} movies loaded, {} visible", ds.len(), view.len()));
            if let Some(path) = &state.source_path {
                ui.weak(path.display().to_string());
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open movie data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}
