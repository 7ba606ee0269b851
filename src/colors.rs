use image::Rgb;
use palette::{FromColor, Hsl, Srgb};

/// Overlay colour used when every region is drawn alike.
pub const OVERLAY_GREEN: Rgb<u8> = Rgb([0, 255, 0]);

/// Generates `n` visually distinct, contrasting RGB colors.
///
/// Hues are spread evenly around the HSL wheel, so the colour of index `i`
/// depends only on `i` and `n`.
pub fn generate_contrasting_colors(n: usize) -> Vec<Rgb<u8>> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 * 360.0) / n as f32;
            let hsl_color = Hsl::new(hue, 0.9, 0.5);
            let srgb: Srgb<u8> = Srgb::from_color(hsl_color).into_format();
            Rgb([srgb.red, srgb.green, srgb.blue])
        })
        .collect()
}
