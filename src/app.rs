use std::path::Path;

use eframe::egui::{self, Color32, RichText, Ui};

use cinemetrics::config::Settings;
use cinemetrics::data::aggregate::{biggest_flops, genre_label_counts, top_n};
use cinemetrics::data::Column;

use crate::state::{AppState, Tab};
use crate::ui::{interactive, panels, plot, tables};

const TOP_LIST_LEN: usize = 10;

const LIST_COLUMNS: [Column; 5] = [
    Column::Title,
    Column::Year,
    Column::Budget,
    Column::Revenue,
    Column::Profit,
];

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CinemetricsApp {
    pub state: AppState,
}

impl CinemetricsApp {
    /// Open `initial` if it exists; otherwise start empty and wait for File → Open.
    pub fn new(settings: Settings, initial: &Path) -> Self {
        let mut state = AppState::new(settings);
        if initial.exists() {
            state.open_path(initial);
        } else {
            log::info!("{} not found, starting without data", initial.display());
        }
        Self { state }
    }
}

impl eframe::App for CinemetricsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: tabs ----
        egui::CentralPanel::default().show(ctx, |ui| {
            central_panel(ui, &mut self.state);
        });
    }
}

fn central_panel(ui: &mut Ui, state: &mut AppState) {
    if let Some(err) = &state.load_error {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(RichText::new(format!("Could not load data:\n{err}")).color(Color32::RED));
        });
        return;
    }
    if state.view.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a movie dataset  (File → Open…)");
        });
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.tab, tab, tab.label());
        }
    });
    ui.separator();

    match state.tab {
        Tab::Explorer => return tables::explorer(ui, state),
        Tab::Interactive => return interactive::interactive(ui, state),
        _ => {}
    }

    let Some(view) = state.view.clone() else {
        return;
    };
    let colors = &state.genre_colors;
    let insights = &state.settings.insights;

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match state.tab {
            Tab::Dashboard => {
                tables::summary_cards(ui, &view, insights);
                ui.separator();
                plot::revenue_by_genre(ui, &view, colors);
                plot::movies_by_year(ui, &view);
            }
            Tab::Financial => {
                let profitable = top_n(&view, Column::Profit, TOP_LIST_LEN, false);
                let flops = biggest_flops(&view, TOP_LIST_LEN, insights);

                plot::budget_vs_revenue(ui, &view, colors);
                ui.separator();
                ui.strong("Most profitable");
                plot::profit_bars(ui, "most_profitable", &profitable, Color32::from_rgb(60, 170, 90));
                tables::movie_table(ui, "most_profitable_table", &profitable, &LIST_COLUMNS);
                ui.separator();
                ui.strong("Biggest flops");
                plot::profit_bars(ui, "biggest_flops", &flops, Color32::from_rgb(200, 70, 60));
                tables::movie_table(ui, "biggest_flops_table", &flops, &LIST_COLUMNS);
            }
            Tab::Genres => {
                tables::genre_table(ui, &view, colors);
                ui.separator();
                ui.strong("Genre labels (all listed genres)");
                for (label, count) in genre_label_counts(&view) {
                    ui.horizontal(|ui: &mut Ui| {
                        ui.label(RichText::new(&label).color(colors.color_for(&label)));
                        ui.weak(count.to_string());
                    });
                }
            }
            Tab::Interactive | Tab::Explorer => {}
        });
}
