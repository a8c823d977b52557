use std::fmt;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator (curve families)
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

// ---------------------------------------------------------------------------
// Colormap: scalar in [0, 1] → Color32 (images)
// ---------------------------------------------------------------------------

/// Sequential colormaps for heat-map rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Colormap {
    #[default]
    Viridis,
    Gray,
    Inferno,
}

const VIRIDIS: &[(u8, u8, u8)] = &[
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

const INFERNO: &[(u8, u8, u8)] = &[
    (0, 0, 4),
    (87, 16, 110),
    (188, 55, 84),
    (249, 142, 9),
    (252, 255, 164),
];

const GRAY: &[(u8, u8, u8)] = &[(0, 0, 0), (255, 255, 255)];

impl Colormap {
    pub const ALL: [Colormap; 3] = [Colormap::Viridis, Colormap::Gray, Colormap::Inferno];

    fn stops(&self) -> &'static [(u8, u8, u8)] {
        match self {
            Colormap::Viridis => VIRIDIS,
            Colormap::Gray => GRAY,
            Colormap::Inferno => INFERNO,
        }
    }

    /// Colour for `t` in `[0, 1]`; values outside are clamped.
    /// Interpolates linearly (in linear RGB) between the colormap stops.
    pub fn color_at(&self, t: f64) -> Color32 {
        let stops = self.stops();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let scaled = t * (stops.len() - 1) as f64;
        let lower = (scaled.floor() as usize).min(stops.len() - 2);
        let frac = (scaled - lower as f64) as f32;

        let a: LinSrgb = stop_color(stops[lower]).into_linear();
        let b: LinSrgb = stop_color(stops[lower + 1]).into_linear();
        to_color32(Srgb::from_linear(a.mix(b, frac)))
    }
}

fn stop_color((r, g, b): (u8, u8, u8)) -> Srgb {
    Srgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Colormap::Viridis => "viridis",
            Colormap::Gray => "gray",
            Colormap::Inferno => "inferno",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let colors = generate_palette(5);
        assert_eq!(colors.len(), 5);
        assert_ne!(colors[0], colors[1]);
    }

    #[test]
    fn colormap_endpoints_hit_stops() {
        assert_eq!(Colormap::Gray.color_at(0.0), Color32::from_rgb(0, 0, 0));
        assert_eq!(Colormap::Gray.color_at(1.0), Color32::from_rgb(255, 255, 255));
        assert_eq!(Colormap::Viridis.color_at(0.0), Color32::from_rgb(68, 1, 84));
        assert_eq!(Colormap::Viridis.color_at(1.0), Color32::from_rgb(253, 231, 37));
    }

    #[test]
    fn colormap_clamps_out_of_range() {
        assert_eq!(Colormap::Gray.color_at(-3.0), Colormap::Gray.color_at(0.0));
        assert_eq!(Colormap::Gray.color_at(7.0), Colormap::Gray.color_at(1.0));
    }
}
