use image::{GrayImage, Luma, RgbImage};
use palette::{FromColor, Hsv, Lab, Srgb};

/// Colour spaces the proposal stage diversifies over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    Hsv,
    Lab,
    /// Gray level.
    Intensity,
    /// Hue channel of HSV alone.
    Hue,
    /// Normalized red, normalized green and intensity.
    RgI,
}

impl ColorSpace {
    pub fn channels(self) -> usize {
        match self {
            ColorSpace::Hsv | ColorSpace::Lab | ColorSpace::RgI => 3,
            ColorSpace::Intensity | ColorSpace::Hue => 1,
        }
    }

    fn convert(self, rgb: [u8; 3], out: &mut Vec<f32>) {
        let [r, g, b] = rgb.map(|c| f32::from(c) / 255.0);
        let srgb = Srgb::new(r, g, b);
        match self {
            ColorSpace::Hsv => {
                let hsv: Hsv = Hsv::from_color(srgb);
                out.push(hsv.hue.into_positive_degrees() / 360.0);
                out.push(hsv.saturation);
                out.push(hsv.value);
            }
            ColorSpace::Lab => {
                let lab: Lab = Lab::from_color(srgb);
                out.push(lab.l / 100.0);
                out.push((lab.a + 128.0) / 255.0);
                out.push((lab.b + 128.0) / 255.0);
            }
            ColorSpace::Intensity => out.push(intensity(r, g, b)),
            ColorSpace::Hue => {
                let hsv: Hsv = Hsv::from_color(srgb);
                out.push(hsv.hue.into_positive_degrees() / 360.0);
            }
            ColorSpace::RgI => {
                let sum = r + g + b;
                if sum > 0.0 {
                    out.push(r / sum);
                    out.push(g / sum);
                } else {
                    out.push(0.0);
                    out.push(0.0);
                }
                out.push(sum / 3.0);
            }
        }
    }
}

fn intensity(r: f32, g: f32, b: f32) -> f32 {
    0.299 * r + 0.587 * g + 0.114 * b
}

/// An image of one or three `f32` channels, each in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelImage {
    width: u32,
    height: u32,
    channels: usize,
    data: Vec<f32>,
}

impl ChannelImage {
    pub fn from_rgb(image: &RgbImage, space: ColorSpace) -> Self {
        let channels = space.channels();
        let pixels = image.width() as usize * image.height() as usize;
        let mut data = Vec::with_capacity(pixels * channels);
        for pixel in image.pixels() {
            space.convert(pixel.0, &mut data);
        }
        for value in &mut data {
            *value = value.clamp(0.0, 1.0);
        }
        Self {
            width: image.width(),
            height: image.height(),
            channels,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Channel values of the pixel at linear index `index` (row-major).
    pub fn pixel(&self, index: usize) -> &[f32] {
        let start = index * self.channels;
        &self.data[start..start + self.channels]
    }

    /// One channel scaled back to 8 bits.
    pub fn channel_as_gray(&self, channel: usize) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            let index = (y * self.width + x) as usize;
            let value = self.data[index * self.channels + channel];
            Luma([(value * 255.0).round() as u8])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn single(rgb: [u8; 3], space: ColorSpace) -> Vec<f32> {
        let image = RgbImage::from_pixel(1, 1, Rgb(rgb));
        ChannelImage::from_rgb(&image, space).pixel(0).to_vec()
    }

    fn assert_close(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-2, "expected {expected:?}, got {actual:?}");
        }
    }

    #[test]
    fn test_channel_counts() {
        let image = RgbImage::new(4, 3);
        for space in [
            ColorSpace::Hsv,
            ColorSpace::Lab,
            ColorSpace::Intensity,
            ColorSpace::Hue,
            ColorSpace::RgI,
        ] {
            let converted = ChannelImage::from_rgb(&image, space);
            assert_eq!(converted.channels(), space.channels());
            assert_eq!(converted.pixel_count(), 12);
        }
    }

    #[test]
    fn test_hsv_of_primaries() {
        assert_close(&single([255, 0, 0], ColorSpace::Hsv), &[0.0, 1.0, 1.0]);
        assert_close(
            &single([0, 0, 255], ColorSpace::Hsv),
            &[240.0 / 360.0, 1.0, 1.0],
        );
        assert_close(&single([0, 255, 0], ColorSpace::Hue), &[120.0 / 360.0]);
    }

    #[test]
    fn test_lab_extremes() {
        assert_close(
            &single([0, 0, 0], ColorSpace::Lab),
            &[0.0, 128.0 / 255.0, 128.0 / 255.0],
        );
        let white = single([255, 255, 255], ColorSpace::Lab);
        assert!((white[0] - 1.0).abs() < 1e-2);
        assert!((white[1] - 128.0 / 255.0).abs() < 1e-2);
    }

    #[test]
    fn test_rgi_and_intensity() {
        assert_close(&single([0, 0, 0], ColorSpace::RgI), &[0.0, 0.0, 0.0]);
        assert_close(
            &single([255, 255, 255], ColorSpace::RgI),
            &[1.0 / 3.0, 1.0 / 3.0, 1.0],
        );
        assert_close(&single([255, 255, 255], ColorSpace::Intensity), &[1.0]);
    }

    #[test]
    fn test_channel_as_gray() {
        let image = RgbImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let gray = ChannelImage::from_rgb(&image, ColorSpace::Intensity).channel_as_gray(0);
        assert_eq!(gray.get_pixel(0, 0), &Luma([0]));
        assert_eq!(gray.get_pixel(1, 0), &Luma([255]));
    }
}
