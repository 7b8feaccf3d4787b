//! The kmeg container: image dimensions, one palette index per pixel, and the palette itself.

use crate::{kmeans::Kmeans, ColorComponents, Error, Result, MAX_COLORS};

use num_traits::AsPrimitive;
use palette::{cast, Srgb};

#[cfg(feature = "image")]
use {image::RgbImage, palette::cast::IntoComponents};
#[cfg(feature = "threads")]
use rayon::prelude::*;

/// Converts floating point centroids into palette colors.
///
/// Each channel is truncated toward zero (not rounded) and saturates to the range of `Component`,
/// so `[12.9, 0.99, 254.999]` becomes `[12, 0, 254]` for `u8` channels.
///
/// # Examples
/// ```
/// # use palette::Srgb;
/// let palette: Vec<Srgb<u8>> = kmeg::palette_from_centroids(&[[12.9, 0.99, 254.999]]);
/// assert_eq!(palette, vec![Srgb::new(12, 0, 254)]);
/// ```
#[must_use]
pub fn palette_from_centroids<Color, Component, const N: usize>(
    centroids: &[[f32; N]],
) -> Vec<Color>
where
    Color: ColorComponents<Component, N>,
    Component: Copy + 'static,
    f32: AsPrimitive<Component>,
{
    centroids
        .iter()
        .map(|centroid| cast::from_array(centroid.map(|x| x.as_())))
        .collect()
}

/// A quantized image in its in-memory form.
///
/// Every constructor ensures that `width * height` equals the number of labels.
/// A [`Container`] built from clustering output also guarantees that every label is a valid
/// palette index and that the palette has at most [`MAX_COLORS`] entries.
/// A decoded [`Container`] is not checked against its palette;
/// [`Container::expand`] reports any mismatch as [`Error::CorruptData`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    width: u32,
    height: u32,
    labels: Vec<u8>,
    palette: Vec<Srgb<u8>>,
}

impl Container {
    /// Creates a new [`Container`] from its parts.
    ///
    /// Only the shape is checked. The palette length and the labels are not, so a decoded
    /// container can be represented as is; [`Container::from_clustering`] is the constructor
    /// that also keeps the palette within [`MAX_COLORS`] entries.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] if `width * height` is not equal to `labels.len()`.
    pub fn new(width: u32, height: u32, labels: Vec<u8>, palette: Vec<Srgb<u8>>) -> Result<Self> {
        crate::types::pixel_count(width, height, labels.len())?;
        Ok(Self { width, height, labels, palette })
    }

    /// Builds a [`Container`] from final centroids and labels.
    ///
    /// The palette is computed with [`palette_from_centroids`] and the height is derived as
    /// `labels.len() / width`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] if `width` is `0`, `labels.len()` is not divisible by `width`,
    /// the height does not fit in a `u32`, there are more than [`MAX_COLORS`] centroids,
    /// or a label is not a valid centroid index.
    pub fn from_clustering(centroids: &[[f32; 3]], labels: Vec<u8>, width: u32) -> Result<Self> {
        if width == 0 {
            return Err(Error::InvalidInput("the width must be at least 1".to_owned()));
        }
        let w = width as usize;
        if labels.len() % w != 0 {
            return Err(Error::InvalidInput(format!(
                "{} labels cannot be split into rows of width {width}",
                labels.len()
            )));
        }
        let height = u32::try_from(labels.len() / w).map_err(|_| {
            Error::InvalidInput(format!("the height {} is too large", labels.len() / w))
        })?;
        if centroids.len() > usize::from(MAX_COLORS) {
            return Err(Error::InvalidInput(format!(
                "{} centroids cannot be indexed by single byte labels",
                centroids.len()
            )));
        }
        if let Some(&label) = labels.iter().find(|&&l| usize::from(l) >= centroids.len()) {
            return Err(Error::InvalidInput(format!(
                "label {label} does not refer to one of the {} centroids",
                centroids.len()
            )));
        }

        Ok(Self {
            width,
            height,
            labels,
            palette: palette_from_centroids(centroids),
        })
    }

    /// Builds a [`Container`] from a clustering engine after [`Kmeans::cluster`] has run.
    ///
    /// # Errors
    /// See [`Container::from_clustering`].
    pub fn from_kmeans<R>(kmeans: Kmeans<'_, R, 3>, width: u32) -> Result<Self> {
        let (centroids, labels) = kmeans.into_parts();
        Self::from_clustering(&centroids, labels, width)
    }

    /// Returns the width of the image in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the image in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the dimensions of the image as `(width, height)`.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the palette index of each pixel in row-major order.
    #[must_use]
    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    /// Returns the palette.
    #[must_use]
    pub fn palette(&self) -> &[Srgb<u8>] {
        &self.palette
    }

    /// Consumes the container and returns its labels and palette.
    #[must_use]
    pub fn into_parts(self) -> (Vec<u8>, Vec<Srgb<u8>>) {
        (self.labels, self.palette)
    }

    /// Checks that every label is a valid index into the palette.
    ///
    /// # Errors
    /// Returns [`Error::CorruptData`] for the first label that is out of bounds.
    pub fn validate(&self) -> Result<()> {
        let len = self.palette.len();
        match self.labels.iter().position(|&l| usize::from(l) >= len) {
            Some(i) => Err(out_of_bounds(i, self.labels[i], len)),
            None => Ok(()),
        }
    }

    /// Expands the container into one palette color per pixel, in row-major order.
    ///
    /// # Errors
    /// Returns [`Error::CorruptData`] if a label is not a valid index into the palette.
    pub fn expand(&self) -> Result<Vec<Srgb<u8>>> {
        let palette = self.palette.as_slice();
        self.labels
            .iter()
            .enumerate()
            .map(|(i, &label)| {
                palette
                    .get(usize::from(label))
                    .copied()
                    .ok_or_else(|| out_of_bounds(i, label, palette.len()))
            })
            .collect()
    }

    /// Expands the container in parallel into one palette color per pixel, in row-major order.
    ///
    /// # Errors
    /// Returns [`Error::CorruptData`] if a label is not a valid index into the palette.
    #[cfg(feature = "threads")]
    pub fn expand_par(&self) -> Result<Vec<Srgb<u8>>> {
        self.validate()?;
        let palette = self.palette.as_slice();
        Ok(self
            .labels
            .par_iter()
            .map(|&label| palette[usize::from(label)])
            .collect())
    }

    /// Expands the container into an [`RgbImage`].
    ///
    /// # Errors
    /// Returns [`Error::CorruptData`] if a label is not a valid index into the palette.
    #[cfg(feature = "image")]
    pub fn to_rgbimage(&self) -> Result<RgbImage> {
        #[cfg(feature = "threads")]
        let pixels = self.expand_par()?;
        #[cfg(not(feature = "threads"))]
        let pixels = self.expand()?;

        let buf: Vec<u8> = pixels.into_components();
        RgbImage::from_vec(self.width, self.height, buf).ok_or_else(|| {
            Error::InvalidInput(format!(
                "a {}x{} image cannot be allocated",
                self.width, self.height
            ))
        })
    }
}

/// The error for a label that points past the end of the palette.
fn out_of_bounds(pixel: usize, label: u8, len: usize) -> Error {
    Error::CorruptData(format!(
        "pixel {pixel} has label {label}, but the palette only has {len} colors"
    ))
}
