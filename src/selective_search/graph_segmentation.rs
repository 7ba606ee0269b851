//! Efficient graph-based image segmentation (Felzenszwalb & Huttenlocher).
//!
//! Pixels are nodes of an 8-connected grid graph weighted by colour distance.
//! Edges are visited in increasing weight order and two components merge when
//! the edge is no heavier than either component's internal difference plus
//! `k / size`.

use std::collections::HashSet;

use super::color_space::ChannelImage;

/// Parameters of the segmentation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphSegmentation {
    /// Scale of the merge threshold; larger values give larger segments.
    pub k: f32,
    /// Components smaller than this are merged into a neighbour.
    pub min_size: usize,
}

impl Default for GraphSegmentation {
    fn default() -> Self {
        Self {
            k: 300.0,
            min_size: 100,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    weight: f32,
    a: u32,
    b: u32,
}

struct DisjointSet {
    parent: Vec<u32>,
    rank: Vec<u8>,
    size: Vec<u32>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
            rank: vec![0; n],
            size: vec![1; n],
        }
    }

    fn find(&mut self, mut x: u32) -> u32 {
        let mut root = x;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        while self.parent[x as usize] != root {
            let next = self.parent[x as usize];
            self.parent[x as usize] = root;
            x = next;
        }
        root
    }

    /// Joins two roots, returning the new root.
    fn join(&mut self, a: u32, b: u32) -> u32 {
        let (a_rank, b_rank) = (self.rank[a as usize], self.rank[b as usize]);
        let (root, child) = if a_rank < b_rank { (b, a) } else { (a, b) };
        if a_rank == b_rank {
            self.rank[root as usize] += 1;
        }
        self.parent[child as usize] = root;
        self.size[root as usize] += self.size[child as usize];
        root
    }

    fn size(&self, root: u32) -> usize {
        self.size[root as usize] as usize
    }
}

/// Per-pixel segment labels, dense in `0..count`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    width: u32,
    height: u32,
    labels: Vec<u32>,
    count: usize,
}

impl Segmentation {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    pub fn label(&self, x: u32, y: u32) -> u32 {
        self.labels[(y * self.width + x) as usize]
    }

    /// Pairs of segments `(a, b)` with `a < b` that touch horizontally,
    /// vertically or diagonally, sorted.
    pub fn adjacency(&self) -> Vec<(usize, usize)> {
        let mut pairs = HashSet::new();
        for (a, b) in grid_neighbours(self.width, self.height) {
            let la = self.labels[a as usize];
            let lb = self.labels[b as usize];
            if la != lb {
                pairs.insert((la.min(lb) as usize, la.max(lb) as usize));
            }
        }
        let mut pairs: Vec<_> = pairs.into_iter().collect();
        pairs.sort_unstable();
        pairs
    }
}

/// Index pairs for the right, down, down-right and up-right neighbour of
/// every pixel.
fn grid_neighbours(width: u32, height: u32) -> impl Iterator<Item = (u32, u32)> {
    (0..height).flat_map(move |y| {
        (0..width).flat_map(move |x| {
            let here = y * width + x;
            let right = (x + 1 < width).then(|| here + 1);
            let down = (y + 1 < height).then(|| here + width);
            let down_right = (x + 1 < width && y + 1 < height).then(|| here + width + 1);
            let up_right = (x + 1 < width && y > 0).then(|| here - width + 1);
            [right, down, down_right, up_right]
                .into_iter()
                .flatten()
                .map(move |there| (here, there))
        })
    })
}

fn distance(image: &ChannelImage, a: u32, b: u32) -> f32 {
    image
        .pixel(a as usize)
        .iter()
        .zip(image.pixel(b as usize))
        .map(|(p, q)| {
            let d = (p - q) * 255.0;
            d * d
        })
        .sum::<f32>()
        .sqrt()
}

impl GraphSegmentation {
    /// Segments an already smoothed image.
    pub fn segment(&self, image: &ChannelImage) -> Segmentation {
        let n = image.pixel_count();
        let mut edges: Vec<Edge> = grid_neighbours(image.width(), image.height())
            .map(|(a, b)| Edge {
                weight: distance(image, a, b),
                a,
                b,
            })
            .collect();
        edges.sort_unstable_by(|e, f| {
            e.weight
                .total_cmp(&f.weight)
                .then(e.a.cmp(&f.a))
                .then(e.b.cmp(&f.b))
        });

        let mut set = DisjointSet::new(n);
        let mut threshold = vec![self.k; n];

        for edge in &edges {
            let a = set.find(edge.a);
            let b = set.find(edge.b);
            if a != b
                && edge.weight <= threshold[a as usize]
                && edge.weight <= threshold[b as usize]
            {
                let root = set.join(a, b);
                threshold[root as usize] = edge.weight + self.k / set.size(root) as f32;
            }
        }

        for edge in &edges {
            let a = set.find(edge.a);
            let b = set.find(edge.b);
            if a != b && (set.size(a) < self.min_size || set.size(b) < self.min_size) {
                set.join(a, b);
            }
        }

        let mut dense = vec![u32::MAX; n];
        let mut count = 0u32;
        let mut labels = Vec::with_capacity(n);
        for pixel in 0..n as u32 {
            let root = set.find(pixel) as usize;
            if dense[root] == u32::MAX {
                dense[root] = count;
                count += 1;
            }
            labels.push(dense[root]);
        }

        Segmentation {
            width: image.width(),
            height: image.height(),
            labels,
            count: count as usize,
        }
    }
}
