use ndarray::{Array2, ArrayView1};

use crate::pronunciation::FeatureMatrix;

/// Monotonic warping path between reference and user frames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignmentPath {
    /// `(reference_frame, user_frame)` pairs in increasing order.
    pub pairs: Vec<(usize, usize)>,
    /// Accumulated local cost at the final cell.
    pub total_cost: f32,
}

impl AlignmentPath {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pairs.iter().copied()
    }
}

/// Aligns two feature matrices with a cosine local cost.
pub fn align_features(reference: &FeatureMatrix, user: &FeatureMatrix) -> AlignmentPath {
    if reference.is_empty() || user.is_empty() {
        return AlignmentPath::default();
    }
    warp_path(&cost_matrix(reference, user))
}

/// `cost[[i, j]]` is the cosine distance between reference frame `i` and user frame `j`.
pub fn cost_matrix(reference: &FeatureMatrix, user: &FeatureMatrix) -> Array2<f32> {
    Array2::from_shape_fn((reference.frame_count(), user.frame_count()), |(i, j)| {
        cosine_distance(reference.frame(i), user.frame(j))
    })
}

/// Least-cost path through a local cost matrix, from `(0, 0)` to the far corner.
pub fn warp_path(cost: &Array2<f32>) -> AlignmentPath {
    let (rows, cols) = cost.dim();
    if rows == 0 || cols == 0 {
        return AlignmentPath::default();
    }
    let accumulated = accumulate(cost);
    let pairs = backtrack(&accumulated);
    AlignmentPath {
        pairs,
        total_cost: accumulated[[rows - 1, cols - 1]],
    }
}

/// 1 - cosine similarity, clamped to [0, 2]. A zero vector is at distance 1
/// from anything non-zero and 0 from another zero vector.
pub fn cosine_distance(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f32 {
    let norm_a = a.dot(&a).sqrt();
    let norm_b = b.dot(&b).sqrt();
    match (norm_a > 0.0, norm_b > 0.0) {
        (false, false) => 0.0,
        (false, true) | (true, false) => 1.0,
        (true, true) => {
            let distance = 1.0 - a.dot(&b) / (norm_a * norm_b);
            if distance.is_finite() {
                distance.clamp(0.0, 2.0)
            } else {
                1.0
            }
        }
    }
}

fn accumulate(cost: &Array2<f32>) -> Array2<f32> {
    let (rows, cols) = cost.dim();
    let mut acc = Array2::<f32>::zeros((rows, cols));
    for i in 0..rows {
        for j in 0..cols {
            let best_previous = match (i, j) {
                (0, 0) => 0.0,
                (0, _) => acc[[0, j - 1]],
                (_, 0) => acc[[i - 1, 0]],
                _ => acc[[i - 1, j - 1]]
                    .min(acc[[i - 1, j]])
                    .min(acc[[i, j - 1]]),
            };
            acc[[i, j]] = cost[[i, j]] + best_previous;
        }
    }
    acc
}

/// Walks back from the last cell. Ties prefer the diagonal step, then the
/// user-only step, then the reference-only step.
fn backtrack(acc: &Array2<f32>) -> Vec<(usize, usize)> {
    let (rows, cols) = acc.dim();
    let (mut i, mut j) = (rows - 1, cols - 1);
    let mut pairs = Vec::with_capacity(rows + cols);
    pairs.push((i, j));
    while (i, j) != (0, 0) {
        (i, j) = match (i, j) {
            (0, _) => (0, j - 1),
            (_, 0) => (i - 1, 0),
            _ => {
                let mut step = (i - 1, j - 1);
                if acc[[i, j - 1]] < acc[[step.0, step.1]] {
                    step = (i, j - 1);
                }
                if acc[[i - 1, j]] < acc[[step.0, step.1]] {
                    step = (i - 1, j);
                }
                step
            }
        };
        pairs.push((i, j));
    }
    pairs.reverse();
    pairs
}
