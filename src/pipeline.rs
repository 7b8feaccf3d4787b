//! Contains the [`KmegPipeline`] builder struct for the high level API.

use crate::{training_set, Container, KmeansOptions, PaletteSize, Result};

use palette::Srgb;

#[cfg(feature = "image")]
use {
    crate::Error,
    image::RgbImage,
    palette::cast::ComponentsAs,
};
#[cfg(feature = "threads")]
use rayon::prelude::*;

/// A builder struct to specify options to turn an image into a kmeg [`Container`].
///
/// # Examples
/// To start, create a [`KmegPipeline`] from a [`RgbImage`] (note that the `image` feature is needed):
/// ```no_run
/// # use kmeg::KmegPipeline;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let img = image::open("some image")?.into_rgb8();
/// let mut pipeline = KmegPipeline::try_from(&img)?;
/// # Ok(())
/// # }
/// ```
///
/// Or from a flat slice of pixels in row-major order:
/// ```
/// # use kmeg::{KmegPipeline, KmeansOptions, PaletteSize};
/// # use palette::Srgb;
/// # fn main() -> Result<(), kmeg::Error> {
/// let pixels = vec![Srgb::new(0, 0, 0), Srgb::new(255, 255, 255)];
/// let mut pipeline = KmegPipeline::new(&pixels, 2, 1)?;
///
/// let container = pipeline
///     .palette_size(PaletteSize::from(2))
///     .kmeans_options(KmeansOptions::new().seed(42))
///     .container()?;
///
/// assert_eq!(container.dimensions(), (2, 1));
/// assert_eq!(container.palette().len(), 2);
/// # Ok(())
/// # }
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct KmegPipeline<'a> {
    /// The input image as a flat slice of pixels.
    colors: &'a [Srgb<u8>],
    /// The dimensions of the image.
    dimensions: (u32, u32),
    /// The number of colors to put in the palette.
    k: PaletteSize,
    /// The parameters for k-means.
    options: KmeansOptions,
}

impl<'a> KmegPipeline<'a> {
    /// Creates a new [`KmegPipeline`] with default options.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`](crate::Error::InvalidInput)
    /// if the length of `colors` is not equal to `width * height`.
    pub fn new(colors: &'a [Srgb<u8>], width: u32, height: u32) -> Result<Self> {
        crate::types::pixel_count(width, height, colors.len())?;
        Ok(Self {
            colors,
            dimensions: (width, height),
            k: PaletteSize::default(),
            options: KmeansOptions::new(),
        })
    }

    /// Sets the palette size which determines the number of clusters and palette colors.
    ///
    /// The default palette size is `16`.
    pub fn palette_size(&mut self, size: impl Into<PaletteSize>) -> &mut Self {
        self.k = size.into();
        self
    }

    /// Sets the parameters for k-means.
    ///
    /// See [`KmeansOptions`] for the defaults.
    pub fn kmeans_options(&mut self, options: KmeansOptions) -> &mut Self {
        self.options = options;
        self
    }

    /// Returns the dimensions of the input image as `(width, height)`.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    /// Clusters the pixels and builds the resulting [`Container`].
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`](crate::Error::InvalidInput) if the image is empty,
    /// the palette size is `0`, or the maximum number of iterations is `0`.
    pub fn container(&self) -> Result<Container> {
        let (width, height) = self.dimensions;
        let samples = training_set(self.colors);

        let mut kmeans = self.options.kmeans(self.k, &samples)?;
        let _span = tracing::info_span!("kmeg", width, height, k = %self.k).entered();
        kmeans.cluster();

        Container::from_kmeans(kmeans, width)
    }

    /// Clusters the pixels and returns the quantized image.
    ///
    /// # Errors
    /// See [`KmegPipeline::container`].
    #[cfg(feature = "image")]
    pub fn quantized_rgbimage(&self) -> Result<RgbImage> {
        self.container()?.to_rgbimage()
    }

    /// Builds a [`Container`] for each pipeline in parallel.
    ///
    /// Each pipeline is clustered on its own thread with its own training set and
    /// clustering state, so the results are the same as calling [`KmegPipeline::container`]
    /// on each one in turn.
    #[cfg(feature = "threads")]
    #[must_use]
    pub fn containers_par(pipelines: &[Self]) -> Vec<Result<Container>> {
        pipelines.par_iter().map(Self::container).collect()
    }
}

#[cfg(feature = "image")]
impl<'a> TryFrom<&'a RgbImage> for KmegPipeline<'a> {
    type Error = Error;

    fn try_from(image: &'a RgbImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        let pixels = image.pixels().len();
        let buf = &image.as_raw()[..(pixels * 3)];
        Self::new(buf.components_as(), width, height)
    }
}
