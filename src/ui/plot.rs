use std::collections::BTreeMap;

use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use cinemetrics::data::aggregate::{group_sum, pairwise_correlation, yearly_stats};
use cinemetrics::data::{Column, MovieTable};

use crate::color::GenreColors;
use crate::ui::fmt_opt;

const CHART_HEIGHT: f32 = 260.0;

fn chart(id: &str) -> Plot<'static> {
    Plot::new(id)
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .allow_drag(true)
        .allow_zoom(true)
        .allow_scroll(false)
}

// ---------------------------------------------------------------------------
// Dashboard charts
// ---------------------------------------------------------------------------

/// One bar per primary genre, tallest first, in the genre's colour.
pub fn revenue_by_genre(ui: &mut Ui, view: &MovieTable, colors: &GenreColors) {
    let mut sums: Vec<(String, f64)> = group_sum(view, Column::PrimaryGenre, Column::Revenue)
        .into_iter()
        .map(|(genre, revenue)| (genre.to_string(), revenue))
        .collect();
    sums.sort_by(|a, b| b.1.total_cmp(&a.1));

    ui.strong("Revenue by genre ($M)");
    chart("revenue_by_genre").show(ui, |plot_ui| {
        for (i, (genre, revenue)) in sums.iter().enumerate() {
            let color = colors.color_for(genre);
            let bar = Bar::new(i as f64, revenue / 1e6).name(genre).fill(color);
            plot_ui.bar_chart(BarChart::new(vec![bar]).name(genre).color(color));
        }
    });
}

/// Release counts as bars and total revenue as a line, per year.
pub fn movies_by_year(ui: &mut Ui, view: &MovieTable) {
    let years = yearly_stats(view);

    ui.strong("Movies per year");
    chart("movies_per_year").show(ui, |plot_ui| {
        let bars = years
            .iter()
            .map(|y| Bar::new(y.year as f64, y.movies as f64).width(0.8))
            .collect();
        plot_ui.bar_chart(BarChart::new(bars).name("Movies").color(Color32::LIGHT_BLUE));
    });

    ui.strong("Revenue per year ($M)");
    chart("revenue_per_year").show(ui, |plot_ui| {
        let total: PlotPoints = years
            .iter()
            .map(|y| [y.year as f64, y.revenue / 1e6])
            .collect();
        let mean: PlotPoints = years
            .iter()
            .map(|y| [y.year as f64, y.mean_revenue / 1e6])
            .collect();
        plot_ui.line(Line::new(total).name("Total").width(1.5));
        plot_ui.line(Line::new(mean).name("Mean per movie").width(1.5));
    });
}

// ---------------------------------------------------------------------------
// Financial charts
// ---------------------------------------------------------------------------

/// Budget against revenue for movies with both figures known, coloured by
/// primary genre, with the break-even diagonal.
pub fn budget_vs_revenue(ui: &mut Ui, view: &MovieTable, colors: &GenreColors) {
    let mut by_genre: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    let mut extent: f64 = 0.0;
    for m in view.iter().filter(|m| m.budget > 0.0 && m.revenue > 0.0) {
        let point = [m.budget / 1e6, m.revenue / 1e6];
        extent = extent.max(point[0]).max(point[1]);
        by_genre.entry(m.primary_genre.as_str()).or_default().push(point);
    }

    let r = pairwise_correlation(view, Column::Budget, Column::Revenue);
    ui.strong(format!("Budget vs revenue ($M), r = {}", fmt_opt(r, 2)));
    chart("budget_vs_revenue")
        .x_axis_label("Budget")
        .y_axis_label("Revenue")
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(vec![[0.0, 0.0], [extent, extent]])
                    .name("Break-even")
                    .color(Color32::GRAY)
                    .style(egui_plot::LineStyle::dashed_loose()),
            );
            for (genre, points) in by_genre {
                plot_ui.points(
                    Points::new(points)
                        .name(genre)
                        .color(colors.color_for(genre))
                        .radius(2.5),
                );
            }
        });
}

/// Horizontal profit bars for an already ranked table, first row on top.
pub fn profit_bars(ui: &mut Ui, id: &str, ranked: &MovieTable, color: Color32) {
    let n = ranked.len();
    chart(id).show(ui, |plot_ui| {
        let bars = ranked
            .iter()
            .enumerate()
            .map(|(i, m)| Bar::new((n - i) as f64, m.profit / 1e6).name(&m.title))
            .collect();
        plot_ui.bar_chart(
            BarChart::new(bars)
                .horizontal()
                .name("Profit ($M)")
                .color(color),
        );
    });
}
