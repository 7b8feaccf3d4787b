//! Distance helpers used by the clustering loop.

/// Returns the squared Euclidean distance between two feature vectors.
#[inline]
#[must_use]
pub fn squared_euclidean_distance<const N: usize>(x: [f32; N], y: [f32; N]) -> f32 {
    let mut dist = 0.0;
    for c in 0..N {
        let d = x[c] - y[c];
        dist += d * d;
    }
    dist
}

/// Returns the aggregate squared movement between two sets of centroids,
/// i.e., the sum of the squared distance between each pair of corresponding centroids.
///
/// Both slices are expected to have the same length; extra centroids in the longer slice are ignored.
#[must_use]
pub fn centroid_shift<const N: usize>(previous: &[[f32; N]], current: &[[f32; N]]) -> f32 {
    previous
        .iter()
        .zip(current)
        .map(|(&p, &c)| squared_euclidean_distance(p, c))
        .sum()
}

/// Returns the index of the centroid nearest to `point` along with its squared distance.
///
/// Ties go to the lowest index, since the scan only moves on a strictly smaller distance.
/// `centroids` must not be empty.
#[inline]
pub(crate) fn nearest<const N: usize>(centroids: &[[f32; N]], point: [f32; N]) -> (usize, f32) {
    let mut min_index = 0;
    let mut min_dist = squared_euclidean_distance(point, centroids[0]);
    for (i, &centroid) in centroids.iter().enumerate().skip(1) {
        let dist = squared_euclidean_distance(point, centroid);
        if dist < min_dist {
            min_dist = dist;
            min_index = i;
        }
    }
    (min_index, min_dist)
}
