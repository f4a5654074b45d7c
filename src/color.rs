use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::CellValue;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` distinct dark colours using evenly spaced hues, so markers
/// stand out against the pale violin outlines.
pub fn dark_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.7, 0.35);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: colony → Color32
// ---------------------------------------------------------------------------

/// Maps each colony to a distinct colour.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<CellValue, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map for colonies given in display order.
    pub fn new<'a>(colonies: impl ExactSizeIterator<Item = &'a CellValue>) -> Self {
        let palette = dark_palette(colonies.len());
        let mapping = colonies
            .zip(palette)
            .map(|(v, c)| (v.clone(), c))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::DARK_GRAY,
        }
    }

    /// Look up the colour for a given colony.
    pub fn color_for(&self, value: &CellValue) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size_and_distinct_colours() {
        let p = dark_palette(5);
        assert_eq!(p.len(), 5);
        for (i, a) in p.iter().enumerate() {
            for b in &p[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(dark_palette(0).is_empty());
    }

    #[test]
    fn unknown_colony_gets_default() {
        let colonies = [CellValue::Text("A".into()), CellValue::Text("B".into())];
        let cm = ColorMap::new(colonies.iter());
        assert_ne!(cm.color_for(&colonies[0]), cm.color_for(&colonies[1]));
        assert_eq!(cm.color_for(&CellValue::Text("Z".into())), Color32::DARK_GRAY);
    }
}
