//! Greedy bottom-up merging of neighbouring segments.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashSet},
};

use rand::Rng;

use super::{features::RegionFeatures, similarity::Strategy};
use crate::region::Region;

/// A proposal with its randomized rank; lower ranks are shown first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedRegion {
    pub region: Region,
    pub rank: f64,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    similarity: f32,
    a: usize,
    b: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    // Most similar first; ties go to the lowest indices.
    fn cmp(&self, other: &Self) -> Ordering {
        self.similarity
            .total_cmp(&other.similarity)
            .then_with(|| other.a.cmp(&self.a))
            .then_with(|| other.b.cmp(&self.b))
    }
}

/// Merges the most similar pair of neighbouring regions until no neighbours
/// remain, and returns every region of the hierarchy with a rank.
///
/// Each region's rank is its position in the hierarchy (1 for the last merge,
/// growing towards the initial segments) times a uniform random factor, so
/// large regions tend to come first without drowning out small ones.
pub fn hierarchical_grouping<R: Rng>(
    mut regions: Vec<RegionFeatures>,
    adjacency: &[(usize, usize)],
    strategy: Strategy,
    image_size: usize,
    rng: &mut R,
) -> Vec<RankedRegion> {
    let image_size = image_size as f32;
    let mut neighbours: Vec<HashSet<usize>> = vec![HashSet::new(); regions.len()];
    let mut alive = vec![true; regions.len()];
    let mut heap = BinaryHeap::with_capacity(adjacency.len());

    for &(a, b) in adjacency {
        neighbours[a].insert(b);
        neighbours[b].insert(a);
        heap.push(Candidate {
            similarity: strategy.similarity(&regions[a], &regions[b], image_size),
            a,
            b,
        });
    }

    // Similarities between live regions never change, so stale entries are
    // exactly those naming a region that has already been merged.
    while let Some(Candidate { a, b, .. }) = heap.pop() {
        if !alive[a] || !alive[b] {
            continue;
        }
        let merged = regions[a].merge(&regions[b]);
        let id = regions.len();
        alive[a] = false;
        alive[b] = false;

        let mut around: Vec<usize> = neighbours[a]
            .union(&neighbours[b])
            .copied()
            .filter(|&n| alive[n])
            .collect();
        around.sort_unstable();
        neighbours[a].clear();
        neighbours[b].clear();

        regions.push(merged);
        alive.push(true);
        neighbours.push(around.iter().copied().collect());

        for n in around {
            neighbours[n].remove(&a);
            neighbours[n].remove(&b);
            neighbours[n].insert(id);
            heap.push(Candidate {
                similarity: strategy.similarity(&regions[n], &regions[id], image_size),
                a: n,
                b: id,
            });
        }
    }

    let total = regions.len();
    regions
        .iter()
        .enumerate()
        .map(|(i, features)| RankedRegion {
            region: features.bbox,
            rank: (total - i) as f64 * rng.gen_range(0.0..1.0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn strip(sizes: &[u32]) -> (Vec<RegionFeatures>, Vec<(usize, usize)>, usize) {
        // Segments laid side by side in a strip of height 1.
        let mut x = 0;
        let features = sizes
            .iter()
            .map(|&width| {
                let f = RegionFeatures {
                    size: width as usize,
                    bbox: Region::new(x, 0, width, 1),
                    color_hist: vec![1.0],
                    texture_hist: vec![1.0],
                };
                x += width;
                f
            })
            .collect();
        let adjacency = (1..sizes.len()).map(|i| (i - 1, i)).collect();
        (features, adjacency, x as usize)
    }

    #[test]
    fn test_connected_segments_merge_into_one() {
        let (features, adjacency, image_size) = strip(&[4, 1, 2, 8]);
        let mut rng = StdRng::seed_from_u64(7);
        let ranked = hierarchical_grouping(
            features,
            &adjacency,
            Strategy::COLOR_TEXTURE_SIZE_FILL,
            image_size,
            &mut rng,
        );

        assert_eq!(ranked.len(), 4 + 3);
        assert_eq!(ranked.last().unwrap().region, Region::new(0, 0, 15, 1));
        assert!(ranked.iter().all(|r| r.rank >= 0.0));
        // The last merge has position 1, so its rank is below 1.
        assert!(ranked.last().unwrap().rank < 1.0);
    }

    #[test]
    fn test_size_strategy_merges_smallest_pair_first() {
        let (features, adjacency, image_size) = strip(&[10, 1, 2, 10]);
        let mut rng = StdRng::seed_from_u64(1);
        let ranked =
            hierarchical_grouping(features, &adjacency, Strategy::SIZE, image_size, &mut rng);
        // First merged region is the union of the 1- and 2-wide segments.
        assert_eq!(ranked[4].region, Region::new(10, 0, 3, 1));
    }

    #[test]
    fn test_disconnected_segments_stay_apart() {
        let (features, _, image_size) = strip(&[3, 3]);
        let mut rng = StdRng::seed_from_u64(3);
        let ranked = hierarchical_grouping(features, &[], Strategy::FILL, image_size, &mut rng);
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_same_seed_same_ranks() {
        let run = |seed| {
            let (features, adjacency, image_size) = strip(&[5, 6, 7]);
            let mut rng = StdRng::seed_from_u64(seed);
            hierarchical_grouping(
                features,
                &adjacency,
                Strategy::TEXTURE_SIZE_FILL,
                image_size,
                &mut rng,
            )
        };
        assert_eq!(run(42), run(42));
    }
}
