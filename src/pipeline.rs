use std::path::Path;

use image::RgbImage;
use log::debug;

use crate::{
    error::{Error, Result},
    image_input::{load_image, resize_to_height},
    region::Region,
    selective_search::{SearchConfig, propose_regions},
};

/// A normalized image together with its region proposals.
#[derive(Debug, Clone)]
pub struct Proposals {
    pub image: RgbImage,
    pub regions: Vec<Region>,
}

/// Checks what the browser assumes about a proposal list: it is non-empty and
/// every region has a positive size.
pub fn validate_regions(regions: &[Region]) -> Result<()> {
    if regions.is_empty() {
        return Err(Error::EmptyProposal);
    }
    if let Some((index, region)) = regions.iter().enumerate().find(|(_, r)| r.is_degenerate()) {
        return Err(Error::DegenerateRegion {
            index,
            region: *region,
        });
    }
    Ok(())
}

/// Resizes `image` to `height` and proposes regions on the result.
pub fn propose(image: &RgbImage, height: u32, config: &SearchConfig) -> Result<Proposals> {
    let image = resize_to_height(image, height);
    let regions = propose_regions(&image, config)?;
    validate_regions(&regions)?;
    debug!("{} proposals on {}x{}", regions.len(), image.width(), image.height());
    Ok(Proposals { image, regions })
}

/// Loads the image at `path` and runs [`propose`] on it.
pub fn propose_from_path(
    path: impl AsRef<Path>,
    height: u32,
    config: &SearchConfig,
) -> Result<Proposals> {
    let image = load_image(path)?;
    propose(&image, height, config)
}
