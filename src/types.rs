//! Contains various types needed across the crate.

use crate::{Error, Result, MAX_COLORS};
use palette::cast::{self, ArrayCast};
use std::{
    error,
    fmt::{Debug, Display},
};

/// A color type that can be viewed as an array of `N` components,
/// e.g., [`Srgb<u8>`](palette::Srgb) as `[u8; 3]`.
pub trait ColorComponents<Component, const N: usize>:
    ArrayCast<Array = [Component; N]> + Copy + 'static
{
}

impl<Color, Component, const N: usize> ColorComponents<Component, N> for Color where
    Color: ArrayCast<Array = [Component; N]> + Copy + 'static
{
}

/// An error type for when a value (e.g., a palette size) is above the maximum supported value.
///
/// The inner value is the maximum supported value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AboveMaxLen<T>(pub T);

impl<T: Display> Display for AboveMaxLen<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "above the maximum length of {}", self.0)
    }
}

impl<T: Debug + Display> error::Error for AboveMaxLen<T> {}

/// The number of clusters (and so palette colors) to compute.
///
/// This is a simple new type wrapper around `u8`, so it can never exceed [`MAX_COLORS`].
/// A [`PaletteSize`] of `0` can be constructed, but clustering rejects it with
/// [`Error::InvalidInput`].
///
/// # Examples
/// ```
/// # use kmeg::{PaletteSize, AboveMaxLen};
/// # fn main() -> Result<(), AboveMaxLen<u8>> {
/// let size = PaletteSize::from(16);
/// let size = PaletteSize::try_from(128u16)?;
/// let size = PaletteSize::from_clamped(1024);
/// assert_eq!(size, PaletteSize::MAX);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PaletteSize(u8);

impl PaletteSize {
    /// The maximum supported palette size (given by [`MAX_COLORS`]).
    pub const MAX: Self = Self(MAX_COLORS);

    /// Gets the inner `u8` value.
    #[must_use]
    pub const fn into_inner(self) -> u8 {
        self.0
    }

    /// Creates a [`PaletteSize`] by clamping the given `u16` to be less than or equal to [`MAX_COLORS`].
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_clamped(value: u16) -> Self {
        if value <= MAX_COLORS as u16 {
            Self(value as u8)
        } else {
            Self::MAX
        }
    }
}

impl Default for PaletteSize {
    fn default() -> Self {
        Self(16)
    }
}

impl From<PaletteSize> for u8 {
    fn from(val: PaletteSize) -> Self {
        val.into_inner()
    }
}

impl From<PaletteSize> for usize {
    fn from(val: PaletteSize) -> Self {
        val.into_inner().into()
    }
}

impl From<u8> for PaletteSize {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl TryFrom<u16> for PaletteSize {
    type Error = AboveMaxLen<u8>;

    fn try_from(value: u16) -> std::result::Result<Self, Self::Error> {
        u8::try_from(value)
            .map(Self)
            .map_err(|_| AboveMaxLen(MAX_COLORS))
    }
}

impl TryFrom<usize> for PaletteSize {
    type Error = AboveMaxLen<u8>;

    fn try_from(value: usize) -> std::result::Result<Self, Self::Error> {
        u8::try_from(value)
            .map(Self)
            .map_err(|_| AboveMaxLen(MAX_COLORS))
    }
}

impl Display for PaletteSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.into_inner())
    }
}

/// Converts a slice of colors into a training set with one feature vector per color.
///
/// Channel values are taken as-is, without any normalization, and the order of `colors`
/// (row-major for an image) is preserved.
///
/// # Examples
/// ```
/// # use palette::Srgb;
/// let colors = [Srgb::new(0u8, 128, 255), Srgb::new(1, 2, 3)];
/// let samples = kmeg::training_set(&colors);
/// assert_eq!(samples, vec![[0.0, 128.0, 255.0], [1.0, 2.0, 3.0]]);
/// ```
#[must_use]
pub fn training_set<Color, const N: usize>(colors: &[Color]) -> Vec<[f32; N]>
where
    Color: ColorComponents<u8, N>,
{
    colors
        .iter()
        .map(|&color| cast::into_array(color).map(f32::from))
        .collect()
}

/// Checks that `width * height` pixels are present and returns the pixel count.
pub(crate) fn pixel_count(width: u32, height: u32, len: usize) -> Result<usize> {
    let expected = u64::from(width) * u64::from(height);
    if u64::try_from(len).map_or(false, |len| len == expected) {
        Ok(len)
    } else {
        Err(Error::InvalidInput(format!(
            "expected {width}x{height} = {expected} pixels, but got {len}"
        )))
    }
}
