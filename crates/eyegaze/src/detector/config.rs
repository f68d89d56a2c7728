use crate::contour::ContourConfig;

/// Global threshold separating the pupil from the iris under the reference
/// lighting setup.
pub const DEFAULT_PUPIL_THRESHOLD: u8 = 43;
/// Global threshold above which pixels count as corneal reflections.
pub const DEFAULT_GLINT_THRESHOLD: u8 = 210;
/// Number of glints reported per frame.
pub const DEFAULT_MAX_GLINTS: usize = 4;

/// Pupil detection: dark-region threshold and contour extraction settings.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PupilConfig {
    /// Pixels at or below this value are pupil candidates.
    pub threshold: u8,
    pub contour: ContourConfig,
}

impl Default for PupilConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_PUPIL_THRESHOLD,
            contour: ContourConfig::default(),
        }
    }
}

/// Glint detection: bright-region threshold and selection size.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GlintConfig {
    /// Pixels strictly above this value are glint candidates.
    pub threshold: u8,
    /// Keep at most this many candidates, nearest to the reference first.
    pub max_glints: usize,
    pub contour: ContourConfig,
}

impl Default for GlintConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_GLINT_THRESHOLD,
            max_glints: DEFAULT_MAX_GLINTS,
            contour: ContourConfig::default(),
        }
    }
}

/// Per-frame detection configuration.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DetectConfig {
    pub pupil: PupilConfig,
    pub glints: GlintConfig,
}

impl DetectConfig {
    /// Load from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_lighting() {
        let cfg = DetectConfig::default();
        assert_eq!(cfg.pupil.threshold, 43);
        assert_eq!(cfg.glints.threshold, 210);
        assert_eq!(cfg.glints.max_glints, 4);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: DetectConfig =
            serde_json::from_str(r#"{ "pupil": { "threshold": 60 } }"#).expect("valid json");
        assert_eq!(cfg.pupil.threshold, 60);
        assert_eq!(cfg.glints, GlintConfig::default());
    }
}
