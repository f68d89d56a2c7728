//! Synthetic eye frames for integration tests.
#![allow(dead_code)]

use image::{GrayImage, Luma};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const WIDTH: u32 = 320;
pub const HEIGHT: u32 = 240;
pub const BACKGROUND: u8 = 180;
pub const PUPIL: u8 = 20;
pub const GLINT: u8 = 250;

/// Screen calibration grid, row-major: x in {100, 500, 900}, y in {100, 400, 700}.
pub fn screen_grid() -> Vec<[f64; 2]> {
    let mut pts = Vec::with_capacity(9);
    for &y in &[100.0, 400.0, 700.0] {
        for &x in &[100.0, 500.0, 900.0] {
            pts.push([x, y]);
        }
    }
    pts
}

/// Pupil center in the image for a gaze target on screen.
pub fn pupil_center_for(screen: [f64; 2]) -> [f64; 2] {
    [
        160.0 + (screen[0] - 500.0) * 0.04,
        120.0 + (screen[1] - 400.0) * 0.04,
    ]
}

/// Dark elliptical pupil with four glints above it and mild seeded noise.
pub fn eye_frame(pupil_center: [f64; 2], seed: u64) -> GrayImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut img = GrayImage::new(WIDTH, HEIGHT);
    for px in img.pixels_mut() {
        *px = Luma([BACKGROUND - rng.gen_range(0..10)]);
    }
    fill_noisy_ellipse(&mut img, pupil_center, [30.0, 24.0], 15.0, PUPIL, &mut rng);

    let [cx, cy] = pupil_center;
    for g in [
        [cx - 6.0, cy - 22.0],
        [cx + 6.0, cy - 22.0],
        [cx - 6.0, cy - 30.0],
        [cx + 6.0, cy - 30.0],
    ] {
        fill_disk(&mut img, g, 2.0, GLINT);
    }
    img
}

/// Rotated ellipse with full axes `axes`, shaded `base + [0, 10)`.
pub fn fill_noisy_ellipse(
    img: &mut GrayImage,
    center: [f64; 2],
    axes: [f64; 2],
    angle_deg: f64,
    base: u8,
    rng: &mut StdRng,
) {
    let (sin_t, cos_t) = angle_deg.to_radians().sin_cos();
    let (ra, rb) = (axes[0] / 2.0, axes[1] / 2.0);
    for y in 0..img.height() {
        for x in 0..img.width() {
            let dx = x as f64 - center[0];
            let dy = y as f64 - center[1];
            let u = cos_t * dx + sin_t * dy;
            let v = -sin_t * dx + cos_t * dy;
            if (u / ra).powi(2) + (v / rb).powi(2) <= 1.0 {
                img.put_pixel(x, y, Luma([base + rng.gen_range(0..10)]));
            }
        }
    }
}

pub fn fill_disk(img: &mut GrayImage, center: [f64; 2], radius: f64, value: u8) {
    for y in 0..img.height() {
        for x in 0..img.width() {
            let dx = x as f64 - center[0];
            let dy = y as f64 - center[1];
            if dx * dx + dy * dy <= radius * radius {
                img.put_pixel(x, y, Luma([value]));
            }
        }
    }
}
