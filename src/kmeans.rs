//! Lloyd's k-means clustering of feature vectors.
//!
//! Each round assigns every sample to its nearest centroid and then moves every centroid
//! to the mean of the samples assigned to it. Clustering stops once the centroids move
//! less than a tolerance or after a maximum number of rounds, whichever comes first.
//!
//! # Examples
//! ```
//! # use kmeg::{kmeans::Kmeans, Error};
//! # use rand::SeedableRng;
//! # use rand_xoshiro::Xoroshiro128PlusPlus;
//! # fn main() -> Result<(), Error> {
//! let samples = [[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [255.0, 255.0, 255.0], [255.0, 255.0, 255.0]];
//! let rng = Xoroshiro128PlusPlus::seed_from_u64(42);
//!
//! let mut kmeans = Kmeans::new(2, 10, &samples, rng)?;
//! kmeans.cluster();
//!
//! assert_eq!(kmeans.centroids().len(), 2);
//! assert_eq!(kmeans.labels()[0], kmeans.labels()[1]);
//! assert_ne!(kmeans.labels()[1], kmeans.labels()[2]);
//! # Ok(())
//! # }
//! ```

use crate::{
    distance::{centroid_shift, nearest},
    Error, PaletteSize, Result, MAX_COLORS,
};

use rand::{prelude::Distribution, Rng, SeedableRng};
use rand_distr::Uniform;
use rand_xoshiro::Xoroshiro128PlusPlus;
use tracing::{debug, info, warn};

/// The default threshold on the aggregate squared centroid movement below which clustering stops.
pub const DEFAULT_TOLERANCE: f32 = 1.0;

/// A builder struct to specify the parameters for k-means.
///
/// # Examples
/// ```
/// # use kmeg::KmeansOptions;
/// let options = KmeansOptions::new()
///     .max_iterations(50)
///     .tolerance(0.5)
///     .seed(42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KmeansOptions {
    /// The maximum number of assign/recompute rounds.
    max_iterations: u32,
    /// The convergence threshold on the aggregate squared centroid movement.
    tolerance: f32,
    /// The seed value for the random number generator.
    seed: u64,
}

impl Default for KmeansOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl KmeansOptions {
    /// The default maximum number of rounds.
    pub const DEFAULT_MAX_ITERATIONS: u32 = 300;

    /// Creates a new [`KmeansOptions`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            seed: 0,
        }
    }

    /// Sets the maximum number of assign/recompute rounds.
    ///
    /// The default is [`KmeansOptions::DEFAULT_MAX_ITERATIONS`].
    /// A value of `0` is rejected when the clustering engine is constructed.
    #[must_use]
    pub const fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the convergence threshold on the aggregate squared centroid movement.
    ///
    /// The default is [`DEFAULT_TOLERANCE`].
    /// A negative tolerance disables early termination.
    #[must_use]
    pub const fn tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the seed value for the random number generator.
    ///
    /// The default seed is `0`.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Creates a [`Kmeans`] engine over `samples` with these options,
    /// using a [`Xoroshiro128PlusPlus`] generator seeded from [`KmeansOptions::seed`].
    ///
    /// # Errors
    /// See [`Kmeans::new`].
    pub fn kmeans<'a, const N: usize>(
        &self,
        k: PaletteSize,
        samples: &'a [[f32; N]],
    ) -> Result<Kmeans<'a, Xoroshiro128PlusPlus, N>> {
        let rng = Xoroshiro128PlusPlus::seed_from_u64(self.seed);
        Kmeans::new(k.into(), self.max_iterations, samples, rng)
            .map(|kmeans| kmeans.with_tolerance(self.tolerance))
    }
}

/// The k-means clustering engine.
///
/// The engine borrows the training set and exclusively owns its centroids, its labels,
/// and its random number generator. Use [`Kmeans::cluster`] to run the algorithm and then
/// the accessors (or [`Kmeans::into_parts`]) to read the result.
#[derive(Debug, Clone)]
pub struct Kmeans<'a, R, const N: usize> {
    /// The training set, one feature vector per pixel.
    samples: &'a [[f32; N]],
    max_iterations: u32,
    tolerance: f32,
    centroids: Vec<[f32; N]>,
    /// The cluster of each sample.
    labels: Vec<u8>,
    /// The number of rounds completed by the last call to `cluster`.
    iterations: u32,
    /// The number of times an empty cluster was re-seeded.
    reseeds: u32,
    rng: R,
    /// Picks a uniformly random sample index.
    distribution: Uniform<usize>,
}

impl<'a, R: Rng, const N: usize> Kmeans<'a, R, N> {
    /// Creates a new [`Kmeans`] engine with `k` clusters.
    ///
    /// The initial centroids are `k` samples drawn uniformly at random, with replacement,
    /// from `samples` using `rng`. The tolerance is set to [`DEFAULT_TOLERANCE`].
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] if `samples` is empty, `k` is `0` or above [`MAX_COLORS`],
    /// or `max_iterations` is `0`.
    pub fn new(k: usize, max_iterations: u32, samples: &'a [[f32; N]], mut rng: R) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::InvalidInput("the training set is empty".to_owned()));
        }
        if k == 0 || k > usize::from(MAX_COLORS) {
            return Err(Error::InvalidInput(format!(
                "the number of clusters must be between 1 and {MAX_COLORS}, but got {k}"
            )));
        }
        if max_iterations == 0 {
            return Err(Error::InvalidInput(
                "the maximum number of iterations must be at least 1".to_owned(),
            ));
        }

        let distribution = Uniform::new(0, samples.len());
        let centroids = (0..k)
            .map(|_| samples[distribution.sample(&mut rng)])
            .collect();

        Ok(Self {
            samples,
            max_iterations,
            tolerance: DEFAULT_TOLERANCE,
            centroids,
            labels: vec![0; samples.len()],
            iterations: 0,
            reseeds: 0,
            rng,
            distribution,
        })
    }

    /// Sets the convergence threshold on the aggregate squared centroid movement.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Runs Lloyd's algorithm and returns the number of rounds that were completed.
    ///
    /// Each round assigns every sample to the nearest centroid (ties go to the lowest index),
    /// then recomputes each centroid as the mean of its samples. A cluster that received no
    /// samples is re-seeded with a random sample instead. The loop ends early once the
    /// aggregate squared centroid movement of a round is at most the tolerance.
    ///
    /// Calling this again continues from the current centroids.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn cluster(&mut self) -> u32 {
        let Self {
            samples,
            max_iterations,
            tolerance,
            centroids,
            labels,
            iterations,
            reseeds,
            rng,
            distribution,
        } = self;

        let k = centroids.len();
        debug!(samples = samples.len(), features = N, clusters = k, "clustering");

        let mut counts = vec![0usize; k];
        let mut totals = vec![[0.0f64; N]; k];
        let mut previous = centroids.clone();
        let mut converged = false;

        *iterations = 0;
        while *iterations < *max_iterations {
            counts.fill(0);
            totals.fill([0.0; N]);

            for (label, &sample) in labels.iter_mut().zip(samples.iter()) {
                let (i, _) = nearest(centroids, sample);
                *label = i as u8; // k <= MAX_COLORS
                counts[i] += 1;
                for (total, x) in totals[i].iter_mut().zip(sample) {
                    *total += f64::from(x);
                }
            }

            previous.copy_from_slice(centroids);

            for (cluster, centroid) in centroids.iter_mut().enumerate() {
                let count = counts[cluster];
                if count == 0 {
                    *centroid = samples[distribution.sample(rng)];
                    *reseeds += 1;
                    warn!(
                        cluster,
                        iteration = *iterations + 1,
                        "cluster received no samples, re-seeding it from the training set"
                    );
                } else {
                    let count = count as f64;
                    *centroid = totals[cluster].map(|total| (total / count) as f32);
                }
            }

            *iterations += 1;

            let shift = centroid_shift(&previous, centroids);
            debug!(iteration = *iterations, shift, "finished round");

            if shift <= *tolerance {
                converged = true;
                break;
            }
        }

        info!(iterations = *iterations, converged, "clustering finished");
        *iterations
    }
}

impl<'a, R, const N: usize> Kmeans<'a, R, N> {
    /// Returns the number of clusters.
    #[must_use]
    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    /// Returns the maximum number of rounds.
    #[must_use]
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Returns the convergence threshold.
    #[must_use]
    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// Returns the current centroids.
    ///
    /// Before [`Kmeans::cluster`] is called, these are the initial random samples.
    #[must_use]
    pub fn centroids(&self) -> &[[f32; N]] {
        &self.centroids
    }

    /// Returns the cluster index of each sample, in training set order.
    ///
    /// Before [`Kmeans::cluster`] is called, every label is `0`.
    #[must_use]
    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    /// Returns the number of rounds completed by the last call to [`Kmeans::cluster`].
    #[must_use]
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Returns how many times an empty cluster has been re-seeded with a random sample.
    #[must_use]
    pub fn reseeds(&self) -> u32 {
        self.reseeds
    }

    /// Consumes the engine and returns the centroids and the labels.
    #[must_use]
    pub fn into_parts(self) -> (Vec<[f32; N]>, Vec<u8>) {
        (self.centroids, self.labels)
    }
}
