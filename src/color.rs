use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Dashboard palette
// ---------------------------------------------------------------------------

/// Accent colour used by both charts and the KPI figures.
pub const ACCENT: Color32 = Color32::from_rgb(0x00, 0x83, 0xb8);

/// Gold used for the rating stars.
pub const STAR: Color32 = Color32::from_rgb(0xf5, 0xc4, 0x18);

/// Shift a colour's lightness by `amount` (positive lightens, negative
/// darkens), clamped to the valid range.
pub fn shift_lightness(color: Color32, amount: f32) -> Color32 {
    let srgb = Srgb::new(
        color.r() as f32 / 255.0,
        color.g() as f32 / 255.0,
        color.b() as f32 / 255.0,
    );
    let mut hsl: Hsl = srgb.into_color();
    hsl.lightness = (hsl.lightness + amount).clamp(0.0, 1.0);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lightening_moves_toward_white() {
        let lighter = shift_lightness(ACCENT, 0.2);
        assert!(lighter.r() >= ACCENT.r());
        assert!(lighter.g() >= ACCENT.g());
        assert!(lighter.b() >= ACCENT.b());
    }

    #[test]
    fn shifts_are_clamped() {
        let white = shift_lightness(ACCENT, 2.0);
        assert_eq!((white.r(), white.g(), white.b()), (255, 255, 255));
        let black = shift_lightness(ACCENT, -2.0);
        assert_eq!((black.r(), black.g(), black.b()), (0, 0, 0));
    }
}
