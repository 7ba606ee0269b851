use imageproc::point::Point;
use num_traits::{Num, ToPrimitive};

/// An axis-aligned region proposal in image pixel coordinates.
///
/// `x` and `y` are the top-left pixel; `width` and `height` count pixels, so a
/// region produced by the proposal stage is never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Number of pixels covered by the region.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Smallest region enclosing both `self` and `other`.
    pub fn union(&self, other: &Region) -> Region {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Region {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }

    /// Whether the region lies entirely inside an image of the given size.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width && self.bottom() <= height
    }

    /// The outline drawn for this region.
    ///
    /// The outline runs from `(x, y)` to `(x + width, y + height)` inclusive,
    /// which is one pixel wider and taller than the region itself.
    pub fn outline(&self) -> imageproc::rect::Rect {
        imageproc::rect::Rect::at(self.x as i32, self.y as i32)
            .of_size(self.width + 1, self.height + 1)
    }
}

/// Calculates the region covering every pixel position in `points`.
///
/// Points are pixel positions, so the result is inclusive of the extreme
/// pixels: a single point yields a 1×1 region. Negative coordinates are
/// clamped to zero. Returns `None` for an empty slice.
///
/// # Examples
///
/// ```
/// use imageproc::point::Point;
/// use region_browser::region::{Region, bounding_box};
///
/// let points = [Point::new(4, 2), Point::new(1, 7), Point::new(3, 3)];
/// assert_eq!(bounding_box(&points), Some(Region::new(1, 2, 4, 6)));
/// ```
pub fn bounding_box<T>(points: &[Point<T>]) -> Option<Region>
where
    T: Copy + PartialOrd + Num + ToPrimitive,
{
    let (first, rest) = points.split_first()?;
    let mut min_x = first.x;
    let mut max_x = first.x;
    let mut min_y = first.y;
    let mut max_y = first.y;

    // `T` is only `PartialOrd`, so float coordinates work too.
    for p in rest {
        if p.x < min_x {
            min_x = p.x;
        }
        if p.x > max_x {
            max_x = p.x;
        }
        if p.y < min_y {
            min_y = p.y;
        }
        if p.y > max_y {
            max_y = p.y;
        }
    }

    let x = min_x.to_u32().unwrap_or(0);
    let y = min_y.to_u32().unwrap_or(0);
    let width = max_x.to_u32().unwrap_or(0).saturating_sub(x) + 1;
    let height = max_y.to_u32().unwrap_or(0).saturating_sub(y) + 1;

    Some(Region {
        x,
        y,
        width,
        height,
    })
}
