//! Proposals from OpenCV's `ximgproc` selective search.

use image::RgbImage;
use log::info;
use opencv::{
    core::{Mat, Rect, Vector},
    prelude::*,
    ximgproc::create_selective_search_segmentation,
};

use super::{Mode, SearchConfig};
use crate::{error::Result, region::Region};

/// Runs OpenCV's selective search on `image`.
///
/// OpenCV keeps its own thread pool and random state, so `config.seed` and
/// `config.min_size` have no effect here.
pub fn propose_regions(image: &RgbImage, config: &SearchConfig) -> Result<Vec<Region>> {
    opencv::core::set_use_optimized(true)?;
    // OpenCV reads a negative count as "system default" and 0 as "no threads".
    let threads = i32::try_from(config.threads).unwrap_or(i32::MAX);
    opencv::core::set_num_threads(if threads == 0 { -1 } else { threads })?;

    let base = to_bgr_mat(image)?;
    let mut search = create_selective_search_segmentation()?;
    search.set_base_image(&base)?;

    let (base_k, inc_k) = (config.base_k as i32, config.inc_k as i32);
    match config.mode {
        Mode::Fast => search.switch_to_selective_search_fast(base_k, inc_k, config.sigma)?,
        Mode::Quality => {
            search.switch_to_selective_search_quality(base_k, inc_k, config.sigma)?
        }
    }

    let mut rects = Vector::<Rect>::new();
    search.process(&mut rects)?;
    info!("OpenCV selective search returned {} rectangles", rects.len());
    Ok(rects.iter().filter_map(to_region).collect())
}

fn to_bgr_mat(image: &RgbImage) -> Result<Mat> {
    let bgr: Vec<u8> = image
        .pixels()
        .flat_map(|pixel| {
            let [r, g, b] = pixel.0;
            [b, g, r]
        })
        .collect();
    let mat = Mat::from_slice(&bgr)?;
    let mat = mat.reshape(3, image.height() as i32)?;
    Ok(mat.try_clone()?)
}

fn to_region(rect: Rect) -> Option<Region> {
    Some(Region::new(
        u32::try_from(rect.x).ok()?,
        u32::try_from(rect.y).ok()?,
        u32::try_from(rect.width).ok()?,
        u32::try_from(rect.height).ok()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_negative_rects_are_dropped() {
        assert_eq!(
            to_region(Rect::new(2, 3, 4, 5)),
            Some(Region::new(2, 3, 4, 5))
        );
        assert_eq!(to_region(Rect::new(-1, 0, 4, 5)), None);
    }

    #[test]
    fn test_proposals_stay_inside_image() {
        let image = RgbImage::from_fn(48, 32, |x, _| {
            if x < 24 {
                Rgb([230, 20, 20])
            } else {
                Rgb([20, 20, 230])
            }
        });
        let regions = propose_regions(&image, &SearchConfig::new(Mode::Fast)).unwrap();
        assert!(!regions.is_empty());
        assert!(regions.iter().all(|r| r.fits_within(48, 32)));
    }
}
