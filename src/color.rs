use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            // Alternate lightness so neighbouring hues stay apart on large palettes.
            let lightness = if i % 2 == 0 { 0.55 } else { 0.45 };
            let rgb: Srgb = Hsl::new(hue, 0.70, lightness).into_color();
            Color32::from_rgb(
                (rgb.red * 255.0).round() as u8,
                (rgb.green * 255.0).round() as u8,
                (rgb.blue * 255.0).round() as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Genre → Color32
// ---------------------------------------------------------------------------

/// Stable colour per genre label, shared by every chart and legend.
#[derive(Debug, Clone)]
pub struct GenreColors {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl Default for GenreColors {
    fn default() -> Self {
        Self {
            mapping: BTreeMap::new(),
            default_color: Color32::GRAY,
        }
    }
}

impl GenreColors {
    pub fn new<'a>(genres: impl IntoIterator<Item = &'a str>) -> Self {
        let labels: Vec<&str> = genres.into_iter().collect();
        let mapping = labels
            .iter()
            .zip(generate_palette(labels.len()))
            .map(|(g, c)| (g.to_string(), c))
            .collect();
        GenreColors {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, genre: &str) -> Color32 {
        self.mapping
            .get(genre)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size_and_distinct_colours() {
        assert!(generate_palette(0).is_empty());
        let p = generate_palette(12);
        assert_eq!(p.len(), 12);
        for (i, a) in p.iter().enumerate() {
            for b in &p[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn unknown_genres_fall_back_to_grey() {
        let colors = GenreColors::new(["Action", "Drama"]);
        assert_ne!(colors.color_for("Action"), colors.color_for("Drama"));
        assert_eq!(colors.color_for("Western"), Color32::GRAY);
    }
}
