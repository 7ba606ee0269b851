//! Selective search region proposals.
//!
//! The image is over-segmented with graph-based segmentation in several
//! colour spaces and at several scales; each segmentation is then grouped
//! bottom-up under several similarity strategies. The bounding boxes of every
//! region met along the way, ranked and de-duplicated, are the proposals.

pub mod color_space;
pub mod features;
pub mod graph_segmentation;
pub mod grouping;
#[cfg(feature = "opencv")]
mod opencv_backend;
pub mod similarity;

use std::collections::HashSet;

use image::RgbImage;
use log::{debug, info};
use rand::{SeedableRng, rngs::StdRng};
use rayon::prelude::*;

use self::{
    color_space::{ChannelImage, ColorSpace},
    features::TextureMap,
    graph_segmentation::GraphSegmentation,
    grouping::{RankedRegion, hierarchical_grouping},
    similarity::Strategy,
};
use crate::{error::Result, region::Region};

/// Trade-off between speed and recall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Fast,
    Quality,
}

impl Mode {
    pub fn color_spaces(self) -> &'static [ColorSpace] {
        match self {
            Mode::Fast => &[ColorSpace::Hsv, ColorSpace::Lab],
            Mode::Quality => &[
                ColorSpace::Hsv,
                ColorSpace::Lab,
                ColorSpace::Intensity,
                ColorSpace::Hue,
                ColorSpace::RgI,
            ],
        }
    }

    pub fn strategies(self) -> &'static [Strategy] {
        match self {
            Mode::Fast => &[Strategy::COLOR_TEXTURE_SIZE_FILL, Strategy::TEXTURE_SIZE_FILL],
            Mode::Quality => &[
                Strategy::COLOR_TEXTURE_SIZE_FILL,
                Strategy::TEXTURE_SIZE_FILL,
                Strategy::FILL,
                Strategy::SIZE,
            ],
        }
    }

    /// Number of segmentation scales tried.
    fn scales(self) -> usize {
        match self {
            Mode::Fast => 2,
            Mode::Quality => 4,
        }
    }
}

/// Which implementation computes the proposals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// The segmentation and grouping in this module.
    #[cfg_attr(not(feature = "opencv"), default)]
    Builtin,
    /// OpenCV's `ximgproc` selective search.
    #[cfg(feature = "opencv")]
    #[default]
    OpenCv,
}

pub const DEFAULT_THREADS: usize = 4;
pub const DEFAULT_SEED: u64 = 0x5e1e_c7ed;

/// Everything that shapes the proposals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    pub mode: Mode,
    pub backend: Backend,
    /// Standard deviation of the Gaussian smoothing applied before
    /// segmenting; `0` disables it.
    pub sigma: f32,
    /// `k` of the first segmentation scale.
    pub base_k: f32,
    /// Added to `k` for each further scale.
    pub inc_k: f32,
    pub min_size: usize,
    /// Worker threads; `0` lets the pool decide.
    pub threads: usize,
    pub seed: u64,
}

impl SearchConfig {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            backend: Backend::default(),
            sigma: 0.8,
            base_k: 150.0,
            inc_k: 150.0,
            min_size: 100,
            threads: DEFAULT_THREADS,
            seed: DEFAULT_SEED,
        }
    }

    fn segmentations(&self) -> Vec<GraphSegmentation> {
        (0..self.mode.scales())
            .map(|i| GraphSegmentation {
                k: self.base_k + self.inc_k * i as f32,
                min_size: self.min_size,
            })
            .collect()
    }
}

/// Proposes regions for `image`, most relevant first.
///
/// The built-in backend runs on a dedicated pool of `config.threads` workers,
/// and its result depends only on the image and the configuration, not on
/// the thread count.
pub fn propose_regions(image: &RgbImage, config: &SearchConfig) -> Result<Vec<Region>> {
    if image.width() == 0 || image.height() == 0 {
        return Ok(Vec::new());
    }
    match config.backend {
        Backend::Builtin => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.threads)
                .build()?;
            Ok(pool.install(|| search(image, config)))
        }
        #[cfg(feature = "opencv")]
        Backend::OpenCv => opencv_backend::propose_regions(image, config),
    }
}

struct Job {
    space: ColorSpace,
    segmentation: GraphSegmentation,
    seed: u64,
}

fn search(image: &RgbImage, config: &SearchConfig) -> Vec<Region> {
    let smoothed = if config.sigma > 0.0 {
        imageproc::filter::gaussian_blur_f32(image, config.sigma)
    } else {
        image.clone()
    };
    let image_size = image.width() as usize * image.height() as usize;

    let jobs: Vec<Job> = config
        .mode
        .color_spaces()
        .iter()
        .flat_map(|&space| {
            config
                .segmentations()
                .into_iter()
                .map(move |segmentation| (space, segmentation))
        })
        .enumerate()
        .map(|(i, (space, segmentation))| Job {
            space,
            segmentation,
            seed: config.seed.wrapping_add(i as u64),
        })
        .collect();

    info!(
        "Selective search over {} segmentations x {} strategies",
        jobs.len(),
        config.mode.strategies().len()
    );

    let mut ranked: Vec<RankedRegion> = jobs
        .par_iter()
        .flat_map_iter(|job| {
            let plain = ChannelImage::from_rgb(image, job.space);
            let texture = TextureMap::new(&plain);
            let segmentation = job
                .segmentation
                .segment(&ChannelImage::from_rgb(&smoothed, job.space));
            let adjacency = segmentation.adjacency();
            let regions = features::extract(&segmentation, &plain, &texture);
            debug!(
                "{:?} k={}: {} segments",
                job.space,
                job.segmentation.k,
                regions.len()
            );

            let mut rng = StdRng::seed_from_u64(job.seed);
            config
                .mode
                .strategies()
                .iter()
                .flat_map(|&strategy| {
                    hierarchical_grouping(
                        regions.clone(),
                        &adjacency,
                        strategy,
                        image_size,
                        &mut rng,
                    )
                })
                .collect::<Vec<_>>()
        })
        .collect();

    ranked.sort_by(|a, b| a.rank.total_cmp(&b.rank));

    let mut seen = HashSet::with_capacity(ranked.len());
    ranked
        .into_iter()
        .map(|r| r.region)
        .filter(|region| seen.insert(*region))
        .collect()
}
