//! Shared synthetic-image helpers for unit tests.

use image::{GrayImage, Luma};

/// Fill a `w`×`h` block whose top-left pixel is (`x`, `y`).
pub(crate) fn fill_rect(img: &mut GrayImage, x: u32, y: u32, w: u32, h: u32, value: u8) {
    for yy in y..(y + h).min(img.height()) {
        for xx in x..(x + w).min(img.width()) {
            img.put_pixel(xx, yy, Luma([value]));
        }
    }
}

/// Fill every pixel whose center lies within `radius` of `center`.
pub(crate) fn fill_disk(img: &mut GrayImage, center: [f64; 2], radius: f64, value: u8) {
    fill_ellipse(img, center, [2.0 * radius, 2.0 * radius], 0.0, value);
}

/// Fill a rotated ellipse given full axis lengths and rotation in degrees.
pub(crate) fn fill_ellipse(
    img: &mut GrayImage,
    center: [f64; 2],
    axes: [f64; 2],
    angle_deg: f64,
    value: u8,
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
                img.put_pixel(x, y, Luma([value]));
            }
        }
    }
}

/// Light background, dark pupil ellipse and bright glint dots.
pub(crate) fn eye_image(
    (w, h): (u32, u32),
    pupil_center: [f64; 2],
    pupil_axes: [f64; 2],
    pupil_angle_deg: f64,
    glints: &[[f64; 2]],
) -> GrayImage {
    let mut img = GrayImage::from_pixel(w, h, Luma([170]));
    fill_ellipse(&mut img, pupil_center, pupil_axes, pupil_angle_deg, 15);
    for &g in glints {
        fill_disk(&mut img, g, 2.0, 250);
    }
    img
}
