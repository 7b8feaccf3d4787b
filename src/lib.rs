//! A library for k-means color quantization into the compact kmeg container format.
//!
//! An image is reduced to a small palette with Lloyd's k-means algorithm, then stored as
//! its dimensions, one palette index per pixel, and the palette, all inside a single
//! gzip stream. The container can later be expanded back into a full pixel grid.
//!
//! # Features
//! To reduce dependencies and compile times, `kmeg` has several `cargo` features
//! that can be turned off or on:
//! - `threads`: exposes parallel versions of some functions via [`rayon`].
//!   Clustering a single image is always sequential.
//! - `image`: enables integration with the [`image`] crate.
//! - `cli`: builds the `kmegutil` binary.
//!
//! # High-Level API
//! To get started with the high-level API, see [`KmegPipeline`]. Here is an example that
//! quantizes an image and writes it out as a kmeg file:
//! ```no_run
//! # use kmeg::{codec, KmegPipeline, KmeansOptions, PaletteSize};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = image::open("some image")?.into_rgb8();
//!
//! let container = KmegPipeline::try_from(&img)?
//!     .palette_size(PaletteSize::from(32)) // the number of colors in the palette
//!     .kmeans_options(KmeansOptions::new().seed(42))
//!     .container()?;
//!
//! codec::write_file("some image.kmeg", &container)?;
//!
//! // and back again
//! let quantized = codec::read_file("some image.kmeg")?.to_rgbimage()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Low-Level API
//! The [`kmeans`] module exposes the clustering engine directly, with an injectable
//! random number generator, and [`Container::from_clustering`] turns its output into a
//! [`Container`]. The [`codec`] module reads and writes the container format.

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::expect_used,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::many_single_char_names,
    clippy::missing_panics_doc,
    clippy::unreadable_literal,
    clippy::wildcard_imports
)]

mod container;
mod distance;
mod error;
mod pipeline;
mod types;

#[cfg(feature = "image")]
mod image_io;

pub mod codec;
pub mod kmeans;

pub use container::*;
pub use distance::{centroid_shift, squared_euclidean_distance};
pub use error::{Error, Result};
pub use kmeans::{Kmeans, KmeansOptions, DEFAULT_TOLERANCE};
pub use pipeline::KmegPipeline;
pub use types::*;

#[cfg(feature = "image")]
pub use image_io::*;

/// The maximum supported number of palette colors is `255`,
/// since each label is stored in a single byte.
pub const MAX_COLORS: u8 = u8::MAX;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use palette::Srgb;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoroshiro128PlusPlus;

    pub fn test_data(len: usize, seed: u64) -> Vec<Srgb<u8>> {
        let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);
        (0..len)
            .map(|_| Srgb::new(rng.gen(), rng.gen(), rng.gen()))
            .collect()
    }

    pub fn test_data_256() -> Vec<Srgb<u8>> {
        test_data(256, 0)
    }

    pub fn test_data_1024() -> Vec<Srgb<u8>> {
        test_data(1024, 1)
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn test_labels(len: usize, k: u16) -> Vec<u8> {
        let mut rng = Xoroshiro128PlusPlus::seed_from_u64(2);
        (0..len).map(|_| rng.gen_range(0..k) as u8).collect()
    }
}
