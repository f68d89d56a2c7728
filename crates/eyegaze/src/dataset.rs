//! Recorded calibration sessions on disk.
//!
//! A dataset directory holds frames `0.jpg .. N-1.jpg`, `positions.json`
//! (one 2-element array per frame) and optionally `pupils.json` and
//! `glints.json` with ground truth.

use std::ops::Range;
use std::path::{Path, PathBuf};

use image::GrayImage;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::info;

use crate::{PupilEllipse, ScreenPoint};

/// Element order of the arrays in `positions.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionOrder {
    /// `[y, x]`, as the reference recordings store them.
    #[default]
    RowCol,
    /// `[x, y]`.
    XY,
}

impl PositionOrder {
    pub fn to_screen(self, raw: [f64; 2]) -> ScreenPoint {
        match self {
            Self::RowCol => ScreenPoint::new(raw[1], raw[0]),
            Self::XY => ScreenPoint::new(raw[0], raw[1]),
        }
    }
}

/// One entry of `pupils.json`; axes are full lengths, angle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthPupil {
    pub cx: f64,
    pub cy: f64,
    pub ax: f64,
    pub ay: f64,
    pub angle: f64,
}

impl From<GroundTruthPupil> for PupilEllipse {
    fn from(p: GroundTruthPupil) -> Self {
        Self {
            center: [p.cx, p.cy],
            axes: [p.ax, p.ay],
            angle_deg: p.angle,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("frame {index} not found at {path}")]
    MissingFrame { index: usize, path: PathBuf },
    #[error("{file} has {found} entries, expected {expected}")]
    LengthMismatch {
        file: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Loaded sidecar data plus lazy frame access.
#[derive(Debug, Clone)]
pub struct Dataset {
    root: PathBuf,
    positions: Vec<ScreenPoint>,
    pupils: Option<Vec<PupilEllipse>>,
    glints: Option<Vec<Vec<[f64; 2]>>>,
}

impl Dataset {
    /// Read the JSON sidecars in `dir`. Frames are decoded on demand.
    pub fn open(dir: impl AsRef<Path>, order: PositionOrder) -> Result<Self, DatasetError> {
        let root = dir.as_ref().to_path_buf();

        let raw: Vec<[f64; 2]> = read_json(&root.join("positions.json"))?;
        let positions: Vec<ScreenPoint> = raw.into_iter().map(|p| order.to_screen(p)).collect();
        let n = positions.len();

        let pupils = read_optional_json::<Vec<GroundTruthPupil>>(&root.join("pupils.json"))?
            .map(|v| -> Result<Vec<PupilEllipse>, DatasetError> {
                check_len("pupils.json", n, v.len())?;
                Ok(v.into_iter().map(PupilEllipse::from).collect())
            })
            .transpose()?;

        let glints = read_optional_json::<Vec<Vec<[f64; 2]>>>(&root.join("glints.json"))?
            .map(|v| check_len("glints.json", n, v.len()).map(|_| v))
            .transpose()?;

        info!(
            root = %root.display(),
            frames = n,
            pupils = pupils.is_some(),
            glints = glints.is_some(),
            "dataset opened"
        );

        Ok(Self {
            root,
            positions,
            pupils,
            glints,
        })
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Known screen positions, one per frame.
    pub fn positions(&self) -> &[ScreenPoint] {
        &self.positions
    }

    /// Ground-truth pupil ellipses, if `pupils.json` was present.
    pub fn pupils(&self) -> Option<&[PupilEllipse]> {
        self.pupils.as_deref()
    }

    /// Ground-truth glints, if `glints.json` was present.
    pub fn glints(&self) -> Option<&[Vec<[f64; 2]>]> {
        self.glints.as_deref()
    }

    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.root.join(format!("{index}.jpg"))
    }

    /// Decode frame `index` as 8-bit grayscale.
    pub fn frame(&self, index: usize) -> Result<GrayImage, DatasetError> {
        let path = self.frame_path(index);
        if index >= self.len() || !path.is_file() {
            return Err(DatasetError::MissingFrame { index, path });
        }
        image::open(&path)
            .map(|img| img.to_luma8())
            .map_err(|source| DatasetError::Image { path, source })
    }

    pub fn frames(&self, range: Range<usize>) -> Result<Vec<GrayImage>, DatasetError> {
        range.map(|i| self.frame(i)).collect()
    }

    /// Calibration indices `0..train_size` (clamped) and the held-out rest.
    pub fn split(&self, train_size: usize) -> (Range<usize>, Range<usize>) {
        let cut = train_size.min(self.len());
        (0..cut, cut..self.len())
    }
}

fn check_len(file: &'static str, expected: usize, found: usize) -> Result<(), DatasetError> {
    if expected == found {
        Ok(())
    } else {
        Err(DatasetError::LengthMismatch {
            file,
            expected,
            found,
        })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DatasetError> {
    let data = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| DatasetError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn read_optional_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, DatasetError> {
    if path.exists() {
        read_json(path).map(Some)
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_order_conversion() {
        assert_eq!(
            PositionOrder::RowCol.to_screen([300.0, 800.0]),
            ScreenPoint::new(800.0, 300.0)
        );
        assert_eq!(
            PositionOrder::XY.to_screen([300.0, 800.0]),
            ScreenPoint::new(300.0, 800.0)
        );
    }

    #[test]
    fn ground_truth_pupil_keeps_full_axes() {
        let gt: GroundTruthPupil = serde_json::from_str(
            r#"{ "cx": 310.5, "cy": 240.0, "ax": 60.0, "ay": 48.0, "angle": 12.0 }"#,
        )
        .expect("json");
        let e = PupilEllipse::from(gt);
        assert_eq!(e.center, [310.5, 240.0]);
        assert_eq!(e.axes, [60.0, 48.0]);
        assert_eq!(e.angle_deg, 12.0);
    }
}
