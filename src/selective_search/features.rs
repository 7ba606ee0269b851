use std::f32::consts::FRAC_PI_4;

use imageproc::{
    gradients::{horizontal_sobel, vertical_sobel},
    point::Point,
};

use super::{color_space::ChannelImage, graph_segmentation::Segmentation};
use crate::region::{Region, bounding_box};

pub const COLOR_BINS: usize = 25;
pub const TEXTURE_BINS: usize = 10;
pub const ORIENTATIONS: usize = 8;

/// What the similarity measures need to know about a region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionFeatures {
    pub size: usize,
    pub bbox: Region,
    pub color_hist: Vec<f32>,
    pub texture_hist: Vec<f32>,
}

impl RegionFeatures {
    /// Features of the union of two disjoint regions.
    pub fn merge(&self, other: &RegionFeatures) -> RegionFeatures {
        let size = self.size + other.size;
        let (wa, wb) = (
            self.size as f32 / size as f32,
            other.size as f32 / size as f32,
        );
        let blend = |a: &[f32], b: &[f32]| -> Vec<f32> {
            a.iter().zip(b).map(|(x, y)| x * wa + y * wb).collect()
        };
        RegionFeatures {
            size,
            bbox: self.bbox.union(&other.bbox),
            color_hist: blend(&self.color_hist, &other.color_hist),
            texture_hist: blend(&self.texture_hist, &other.texture_hist),
        }
    }
}

/// Quantized gradient responses: for every pixel, channel and orientation,
/// the histogram bin of the response.
#[derive(Debug, Clone)]
pub struct TextureMap {
    channels: usize,
    bins: Vec<u8>,
}

impl TextureMap {
    /// Computes oriented Sobel responses for each channel of `image`.
    ///
    /// Four directions (0°, 45°, 90°, 135°) are taken with both signs, giving
    /// eight non-negative responses; each is scaled by its maximum over the
    /// image and quantized into [`TEXTURE_BINS`] bins.
    pub fn new(image: &ChannelImage) -> Self {
        let channels = image.channels();
        let stride = channels * ORIENTATIONS;
        let mut bins = vec![0u8; image.pixel_count() * stride];

        for channel in 0..channels {
            let gray = image.channel_as_gray(channel);
            let gx = horizontal_sobel(&gray);
            let gy = vertical_sobel(&gray);

            let mut responses = vec![0f32; image.pixel_count() * ORIENTATIONS];
            let mut max = [0f32; ORIENTATIONS];
            for (index, (dx, dy)) in gx.pixels().zip(gy.pixels()).enumerate() {
                let (dx, dy) = (f32::from(dx.0[0]), f32::from(dy.0[0]));
                for direction in 0..ORIENTATIONS / 2 {
                    let angle = direction as f32 * FRAC_PI_4;
                    let d = dx * angle.cos() + dy * angle.sin();
                    let (pos, neg) = (d.max(0.0), (-d).max(0.0));
                    let base = index * ORIENTATIONS;
                    responses[base + direction] = pos;
                    responses[base + direction + ORIENTATIONS / 2] = neg;
                    max[direction] = max[direction].max(pos);
                    let opposite = direction + ORIENTATIONS / 2;
                    max[opposite] = max[opposite].max(neg);
                }
            }

            for (index, chunk) in responses.chunks_exact(ORIENTATIONS).enumerate() {
                for (orientation, &response) in chunk.iter().enumerate() {
                    let bin = if max[orientation] > 0.0 {
                        quantize(response / max[orientation], TEXTURE_BINS)
                    } else {
                        0
                    };
                    bins[index * stride + channel * ORIENTATIONS + orientation] = bin as u8;
                }
            }
        }

        Self { channels, bins }
    }

    fn pixel(&self, index: usize) -> &[u8] {
        let stride = self.channels * ORIENTATIONS;
        &self.bins[index * stride..(index + 1) * stride]
    }
}

/// Bin of `value` in `[0, 1]` among `bins` equal bins.
fn quantize(value: f32, bins: usize) -> usize {
    ((value * bins as f32) as usize).min(bins - 1)
}

fn normalize(hist: &mut [f32]) {
    let total: f32 = hist.iter().sum();
    if total > 0.0 {
        for h in hist {
            *h /= total;
        }
    }
}

/// Computes size, bounding box and histograms of every segment.
///
/// `image` and `texture` must have the segmentation's dimensions.
pub fn extract(
    segmentation: &Segmentation,
    image: &ChannelImage,
    texture: &TextureMap,
) -> Vec<RegionFeatures> {
    let count = segmentation.count();
    let channels = image.channels();
    let color_len = channels * COLOR_BINS;
    let texture_len = channels * ORIENTATIONS * TEXTURE_BINS;

    let mut sizes = vec![0usize; count];
    let mut min = vec![Point::new(u32::MAX, u32::MAX); count];
    let mut max = vec![Point::new(0u32, 0u32); count];
    let mut color = vec![0f32; count * color_len];
    let mut tex = vec![0f32; count * texture_len];

    let width = segmentation.width();
    for (index, &label) in segmentation.labels().iter().enumerate() {
        let label = label as usize;
        let (x, y) = (index as u32 % width, index as u32 / width);
        sizes[label] += 1;
        min[label] = Point::new(min[label].x.min(x), min[label].y.min(y));
        max[label] = Point::new(max[label].x.max(x), max[label].y.max(y));

        let color_hist = &mut color[label * color_len..(label + 1) * color_len];
        for (channel, &value) in image.pixel(index).iter().enumerate() {
            color_hist[channel * COLOR_BINS + quantize(value, COLOR_BINS)] += 1.0;
        }

        let texture_hist = &mut tex[label * texture_len..(label + 1) * texture_len];
        for (slot, &bin) in texture.pixel(index).iter().enumerate() {
            texture_hist[slot * TEXTURE_BINS + bin as usize] += 1.0;
        }
    }

    (0..count)
        .map(|label| {
            let mut color_hist = color[label * color_len..(label + 1) * color_len].to_vec();
            let mut texture_hist = tex[label * texture_len..(label + 1) * texture_len].to_vec();
            normalize(&mut color_hist);
            normalize(&mut texture_hist);
            RegionFeatures {
                size: sizes[label],
                bbox: bounding_box(&[min[label], max[label]]).unwrap_or(Region::new(0, 0, 1, 1)),
                color_hist,
                texture_hist,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selective_search::{color_space::ColorSpace, graph_segmentation::GraphSegmentation};
    use image::{Rgb, RgbImage};

    fn assert_float_eq(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-5, "expected {b}, got {a}");
    }

    fn two_blocks() -> (Segmentation, ChannelImage, TextureMap) {
        let rgb = RgbImage::from_fn(20, 10, |x, _| {
            if x < 5 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });
        let image = ChannelImage::from_rgb(&rgb, ColorSpace::Intensity);
        let segmentation = GraphSegmentation {
            k: 10.0,
            min_size: 5,
        }
        .segment(&image);
        let texture = TextureMap::new(&image);
        (segmentation, image, texture)
    }

    #[test]
    fn test_extract_sizes_and_boxes() {
        let (segmentation, image, texture) = two_blocks();
        let features = extract(&segmentation, &image, &texture);
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].size, 50);
        assert_eq!(features[0].bbox, Region::new(0, 0, 5, 10));
        assert_eq!(features[1].size, 150);
        assert_eq!(features[1].bbox, Region::new(5, 0, 15, 10));
    }

    #[test]
    fn test_histograms_are_normalized() {
        let (segmentation, image, texture) = two_blocks();
        for f in extract(&segmentation, &image, &texture) {
            assert_eq!(f.color_hist.len(), COLOR_BINS);
            assert_eq!(f.texture_hist.len(), ORIENTATIONS * TEXTURE_BINS);
            assert_float_eq(f.color_hist.iter().sum(), 1.0);
            assert_float_eq(f.texture_hist.iter().sum(), 1.0);
        }
    }

    #[test]
    fn test_color_histogram_bins() {
        let (segmentation, image, texture) = two_blocks();
        let features = extract(&segmentation, &image, &texture);
        assert_float_eq(features[0].color_hist[COLOR_BINS - 1], 1.0);
        assert_float_eq(features[1].color_hist[0], 1.0);
    }

    #[test]
    fn test_merge_weights_by_size() {
        let a = RegionFeatures {
            size: 1,
            bbox: Region::new(0, 0, 2, 2),
            color_hist: vec![1.0, 0.0],
            texture_hist: vec![0.0, 1.0],
        };
        let b = RegionFeatures {
            size: 3,
            bbox: Region::new(4, 4, 2, 2),
            color_hist: vec![0.0, 1.0],
            texture_hist: vec![0.0, 1.0],
        };
        let merged = a.merge(&b);
        assert_eq!(merged.size, 4);
        assert_eq!(merged.bbox, Region::new(0, 0, 6, 6));
        assert_float_eq(merged.color_hist[0], 0.25);
        assert_float_eq(merged.color_hist[1], 0.75);
        assert_float_eq(merged.texture_hist[1], 1.0);
    }

    #[test]
    fn test_flat_image_texture_in_first_bin() {
        let flat = RgbImage::from_pixel(6, 6, Rgb([40, 80, 120]));
        let image = ChannelImage::from_rgb(&flat, ColorSpace::Hsv);
        let texture = TextureMap::new(&image);
        assert!(texture.bins.iter().all(|&b| b == 0));
        assert_eq!(texture.pixel(0).len(), 3 * ORIENTATIONS);
    }

    #[test]
    fn test_quantize_edges() {
        assert_eq!(quantize(0.0, 25), 0);
        assert_eq!(quantize(0.5, 10), 5);
        assert_eq!(quantize(1.0, 25), 24);
    }
}
