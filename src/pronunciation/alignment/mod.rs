pub mod aggregate;
pub mod dtw;
pub mod segments;

pub use aggregate::{aggregate_distances, SegmentDistances};
pub use dtw::AlignmentPath;
pub use segments::{build_segments, Segment, PLACEHOLDER_LABEL};

use tracing::debug;

use crate::pronunciation::FeatureMatrix;

/// Time-aligns user features against the reference with dynamic time warping.
#[derive(Debug, Default, Clone)]
pub struct AudioAligner {}

impl AudioAligner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Least-cost monotonic path; empty when either matrix has no frames.
    pub fn align(&self, reference: &FeatureMatrix, user: &FeatureMatrix) -> AlignmentPath {
        let path = dtw::align_features(reference, user);
        debug!(
            reference_frames = reference.frame_count(),
            user_frames = user.frame_count(),
            path_len = path.len(),
            total_cost = path.total_cost,
            "computed dtw alignment"
        );
        path
    }
}
