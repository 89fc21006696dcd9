use ndarray::ArrayView1;

use crate::pronunciation::FeatureMatrix;

use super::dtw::AlignmentPath;
use super::segments::Segment;

/// Frame-pair distances bucketed by reference segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentDistances {
    /// One list per segment, in segment order.
    pub per_segment: Vec<Vec<f32>>,
    /// Mean distance over the whole path, 0 for an empty path.
    pub avg_diff: f32,
    /// Summed distance over the whole path.
    pub dtw_distance: f32,
}

impl SegmentDistances {
    /// Mean distance of a segment, `None` when the path never visited it.
    pub fn segment_mean(&self, index: usize) -> Option<f32> {
        let values = self.per_segment.get(index)?;
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f32>() / values.len() as f32)
    }

    pub fn support(&self, index: usize) -> usize {
        self.per_segment.get(index).map_or(0, Vec::len)
    }
}

/// Walks the alignment path and assigns every pair's Euclidean distance to the
/// segment containing its reference frame.
pub fn aggregate_distances(
    path: &AlignmentPath,
    reference: &FeatureMatrix,
    user: &FeatureMatrix,
    segments: &[Segment],
) -> SegmentDistances {
    let edges = upper_edges(segments);
    let mut per_segment = vec![Vec::new(); segments.len()];
    let mut total = 0.0_f64;

    for (ref_idx, user_idx) in path.iter() {
        let distance = euclidean_distance(reference.frame(ref_idx), user.frame(user_idx));
        total += distance as f64;
        if !per_segment.is_empty() {
            let index = segment_index(&edges, ref_idx).min(per_segment.len() - 1);
            per_segment[index].push(distance);
        }
    }

    let avg_diff = if path.is_empty() {
        0.0
    } else {
        (total / path.len() as f64) as f32
    };
    SegmentDistances {
        per_segment,
        avg_diff,
        dtw_distance: total as f32,
    }
}

pub fn euclidean_distance(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum::<f32>()
        .sqrt()
}

/// Right-open search edges: the start of every segment after the first,
/// followed by the end of the last one.
fn upper_edges(segments: &[Segment]) -> Vec<usize> {
    let mut edges: Vec<usize> = segments.iter().skip(1).map(|s| s.start).collect();
    if let Some(last) = segments.last() {
        edges.push(last.end);
    }
    edges
}

/// Number of edges at or below `frame`; edges are non-decreasing.
fn segment_index(edges: &[usize], frame: usize) -> usize {
    edges.partition_point(|&edge| edge <= frame)
}
