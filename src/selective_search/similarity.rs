use super::features::RegionFeatures;

/// Sum of bin-wise minima of two normalized histograms.
pub fn histogram_intersection(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x.min(*y)).sum()
}

/// Favours merging small regions first.
pub fn size_similarity(a: &RegionFeatures, b: &RegionFeatures, image_size: f32) -> f32 {
    1.0 - (a.size + b.size) as f32 / image_size
}

/// Favours regions that fill the gaps of each other's bounding box.
pub fn fill_similarity(a: &RegionFeatures, b: &RegionFeatures, image_size: f32) -> f32 {
    let bbox = a.bbox.union(&b.bbox).area() as f32;
    1.0 - (bbox - a.size as f32 - b.size as f32) / image_size
}

/// A weighted combination of the four similarity measures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strategy {
    pub color: f32,
    pub texture: f32,
    pub size: f32,
    pub fill: f32,
}

impl Strategy {
    pub const COLOR_TEXTURE_SIZE_FILL: Strategy = Strategy {
        color: 1.0,
        texture: 1.0,
        size: 1.0,
        fill: 1.0,
    };
    pub const TEXTURE_SIZE_FILL: Strategy = Strategy {
        color: 0.0,
        texture: 1.0,
        size: 1.0,
        fill: 1.0,
    };
    pub const FILL: Strategy = Strategy {
        color: 0.0,
        texture: 0.0,
        size: 0.0,
        fill: 1.0,
    };
    pub const SIZE: Strategy = Strategy {
        color: 0.0,
        texture: 0.0,
        size: 1.0,
        fill: 0.0,
    };

    fn total_weight(&self) -> f32 {
        self.color + self.texture + self.size + self.fill
    }

    /// Similarity of two regions in `[0, 1]`, higher is more alike.
    pub fn similarity(&self, a: &RegionFeatures, b: &RegionFeatures, image_size: f32) -> f32 {
        let total = self.total_weight();
        if total <= 0.0 {
            return 0.0;
        }
        let mut score = 0.0;
        if self.color > 0.0 {
            score += self.color * histogram_intersection(&a.color_hist, &b.color_hist);
        }
        if self.texture > 0.0 {
            score += self.texture * histogram_intersection(&a.texture_hist, &b.texture_hist);
        }
        if self.size > 0.0 {
            score += self.size * size_similarity(a, b, image_size);
        }
        if self.fill > 0.0 {
            score += self.fill * fill_similarity(a, b, image_size);
        }
        score / total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Region;

    fn assert_float_eq(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-6, "expected {b}, got {a}");
    }

    fn features(size: usize, bbox: Region, color: Vec<f32>, texture: Vec<f32>) -> RegionFeatures {
        RegionFeatures {
            size,
            bbox,
            color_hist: color,
            texture_hist: texture,
        }
    }

    #[test]
    fn test_histogram_intersection() {
        assert_float_eq(histogram_intersection(&[0.5, 0.5], &[0.5, 0.5]), 1.0);
        assert_float_eq(histogram_intersection(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_float_eq(histogram_intersection(&[0.7, 0.3], &[0.2, 0.8]), 0.5);
    }

    #[test]
    fn test_size_and_fill() {
        // Two adjacent 10x10 squares in a 100x100 image.
        let a = features(100, Region::new(0, 0, 10, 10), vec![], vec![]);
        let b = features(100, Region::new(10, 0, 10, 10), vec![], vec![]);
        assert_float_eq(size_similarity(&a, &b, 10_000.0), 0.98);
        assert_float_eq(fill_similarity(&a, &b, 10_000.0), 1.0);

        // Diagonal squares leave two empty quadrants in their union.
        let c = features(100, Region::new(10, 10, 10, 10), vec![], vec![]);
        assert_float_eq(fill_similarity(&a, &c, 10_000.0), 0.98);
    }

    #[test]
    fn test_strategy_is_weighted_mean() {
        let a = features(100, Region::new(0, 0, 10, 10), vec![1.0, 0.0], vec![0.5, 0.5]);
        let b = features(100, Region::new(10, 0, 10, 10), vec![0.0, 1.0], vec![0.5, 0.5]);
        let image_size = 10_000.0;

        // color 0, texture 1, size 0.98, fill 1
        assert_float_eq(
            Strategy::COLOR_TEXTURE_SIZE_FILL.similarity(&a, &b, image_size),
            (0.0 + 1.0 + 0.98 + 1.0) / 4.0,
        );
        assert_float_eq(
            Strategy::TEXTURE_SIZE_FILL.similarity(&a, &b, image_size),
            (1.0 + 0.98 + 1.0) / 3.0,
        );
        assert_float_eq(Strategy::FILL.similarity(&a, &b, image_size), 1.0);
        assert_float_eq(Strategy::SIZE.similarity(&a, &b, image_size), 0.98);
    }
}
