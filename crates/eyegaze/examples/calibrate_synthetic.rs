//! Calibrate on a synthetic 3x3 gaze grid and estimate a few held-out targets.
//!
//! ```text
//! cargo run -p eyegaze --example calibrate_synthetic
//! ```

use eyegaze::{CalibrationConfig, CalibrationModel, FeatureBasis, ScreenPoint};
use image::{GrayImage, Luma};

fn eye_frame(target: ScreenPoint) -> GrayImage {
    let cx = 160.0 + (target.x - 500.0) * 0.04;
    let cy = 120.0 + (target.y - 400.0) * 0.04;
    GrayImage::from_fn(320, 240, |x, y| {
        let dx = (x as f64 - cx) / 15.0;
        let dy = (y as f64 - cy) / 12.0;
        Luma([if dx * dx + dy * dy <= 1.0 { 20 } else { 180 }])
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut positions = Vec::new();
    for y in [100.0, 400.0, 700.0] {
        for x in [100.0, 500.0, 900.0] {
            positions.push(ScreenPoint::new(x, y));
        }
    }
    let images: Vec<GrayImage> = positions.iter().map(|&p| eye_frame(p)).collect();

    for basis in [FeatureBasis::Affine, FeatureBasis::polynomial(2)] {
        let mut model = CalibrationModel::new(CalibrationConfig::with_basis(basis));
        model.calibrate(&images, &positions)?;

        println!("{basis}");
        for target in [
            ScreenPoint::new(520.0, 390.0),
            ScreenPoint::new(250.0, 600.0),
        ] {
            let est = model.estimate(&eye_frame(target))?;
            println!(
                "  target ({:>5.0}, {:>5.0}) -> ({:>7.1}, {:>7.1})  err {:.1}px",
                target.x,
                target.y,
                est.x,
                est.y,
                est.distance(&target)
            );
        }
    }
    Ok(())
}
