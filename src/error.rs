use std::path::PathBuf;

use thiserror::Error;

use crate::region::Region;

/// Everything that can stop the browser before or while it runs.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Failed to load image '{path}': {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Region proposal produced no regions")]
    EmptyProposal,

    #[error("Region proposal {index} has zero size: {region:?}")]
    DegenerateRegion { index: usize, region: Region },

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[cfg(feature = "opencv")]
    #[error("OpenCV failed: {0}")]
    OpenCv(#[from] opencv::Error),

    #[error("Window error: {0}")]
    Window(String),
}

pub type Result<T> = std::result::Result<T, Error>;
