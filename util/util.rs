#![allow(dead_code)]

use std::sync::OnceLock;

use image::RgbImage;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;

/// A smooth gradient with some per-pixel noise, roughly like a photo of the sky.
pub fn gradient_image(width: u32, height: u32, seed: u64) -> RgbImage {
    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);
    RgbImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        let b = 128u8.wrapping_add(rng.gen_range(0..32));
        image::Rgb([r.saturating_add(rng.gen_range(0..8)), g, b])
    })
}

/// A handful of flat color blocks, like a screenshot or a logo.
pub fn blocks_image(width: u32, height: u32) -> RgbImage {
    const COLORS: [[u8; 3]; 6] = [
        [240, 240, 240],
        [20, 20, 20],
        [200, 30, 40],
        [30, 160, 60],
        [40, 70, 200],
        [250, 200, 20],
    ];
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb(COLORS[((x / 32 + y / 32) % 6) as usize])
    })
}

static IMAGES: OnceLock<Vec<(String, RgbImage)>> = OnceLock::new();

pub fn bench_images() -> &'static [(String, RgbImage)] {
    IMAGES.get_or_init(|| {
        vec![
            ("gradient-256".to_owned(), gradient_image(256, 256, 0)),
            ("gradient-640".to_owned(), gradient_image(640, 480, 1)),
            ("blocks-512".to_owned(), blocks_image(512, 512)),
        ]
    })
}
