use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{EngineError, Result};

/// Face verifier tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceVerifierConfig {
    /// Side length of the comparison raster (pixels)
    pub raster_size: u32,
    /// Fraction of the frame's shorter side cropped around the centre
    pub crop_fraction: f64,
    /// Pixels darker than this in both rasters are ignored
    pub darkness_cutoff: u8,
    pub similarity_exponent: f64,
    /// Weight of the current raw similarity against the recent mean
    pub current_weight: f64,
    pub smoothing_window: usize,
    /// Smoothed confidence at or above which a face counts as detected
    pub detection_threshold: f64,
    pub history_capacity: usize,
    /// Reference images smaller than this are rejected
    pub min_reference_bytes: usize,
    pub match_threshold: f64,
    /// Seed for the disabled-mode confidence generator
    pub simulation_seed: u64,
}

impl Default for FaceVerifierConfig {
    fn default() -> Self {
        Self {
            raster_size: 128,
            crop_fraction: 0.6,
            darkness_cutoff: 30,
            similarity_exponent: 0.7,
            current_weight: 0.6,
            smoothing_window: 3,
            detection_threshold: 0.4,
            history_capacity: 10,
            min_reference_bytes: 100,
            match_threshold: 0.6,
            simulation_seed: 42,
        }
    }
}

/// Analysis engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Frames sampled per second of video
    pub sample_rate_hz: f64,
    /// Fraction of frames that must contain a face for the session to pass
    pub face_presence_ratio: f64,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub face: FaceVerifierConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 10.0,
            face_presence_ratio: 0.3,
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            face: FaceVerifierConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override settings with any of `MOTION_SAMPLE_RATE`,
    /// `MOTION_FACE_THRESHOLD`, `FFMPEG_PATH` and `FFPROBE_PATH` that are set
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup("MOTION_SAMPLE_RATE") {
            self.sample_rate_hz = value
                .trim()
                .parse()
                .map_err(|e| EngineError::Config(format!("MOTION_SAMPLE_RATE: {}", e)))?;
        }
        if let Some(value) = lookup("MOTION_FACE_THRESHOLD") {
            self.face.detection_threshold = value
                .trim()
                .parse()
                .map_err(|e| EngineError::Config(format!("MOTION_FACE_THRESHOLD: {}", e)))?;
        }
        if let Some(path) = lookup("FFMPEG_PATH") {
            self.ffmpeg_path = path;
        }
        if let Some(path) = lookup("FFPROBE_PATH") {
            self.ffprobe_path = path;
        }
        self.validate()
    }

    /// Reject values that would make sampling or scoring meaningless
    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0) {
            return Err(EngineError::Config(format!(
                "sample rate must be positive, got {}",
                self.sample_rate_hz
            )));
        }

        let unit_values = [
            ("face_presence_ratio", self.face_presence_ratio),
            ("face.detection_threshold", self.face.detection_threshold),
            ("face.match_threshold", self.face.match_threshold),
            ("face.crop_fraction", self.face.crop_fraction),
            ("face.current_weight", self.face.current_weight),
        ];
        for (name, value) in unit_values {
            if !(0.0..=1.0).contains(&value) {
                return Err(EngineError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.face.raster_size == 0 || self.face.smoothing_window == 0 {
            return Err(EngineError::Config(
                "face raster size and smoothing window must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sample_rate_hz, 10.0);
        assert_eq!(config.face.raster_size, 128);
        assert_eq!(config.face.detection_threshold, 0.4);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = EngineConfig::default();
        config.sample_rate_hz = 0.0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.face.detection_threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.face.smoothing_window = 0;
        assert!(config.validate().is_err());
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_only_set_values() {
        let mut config = EngineConfig {
            face_presence_ratio: 0.5,
            ..EngineConfig::default()
        };
        config
            .apply_overrides(vars(&[
                ("MOTION_SAMPLE_RATE", "5"),
                ("MOTION_FACE_THRESHOLD", "0.55"),
                ("FFPROBE_PATH", "/opt/ffmpeg/bin/ffprobe"),
            ]))
            .unwrap();

        assert_eq!(config.sample_rate_hz, 5.0);
        assert_eq!(config.face.detection_threshold, 0.55);
        assert_eq!(config.ffprobe_path, "/opt/ffmpeg/bin/ffprobe");
        assert_eq!(config.ffmpeg_path, "ffmpeg");
        assert_eq!(config.face_presence_ratio, 0.5);
    }

    #[test]
    fn test_env_rejects_bad_sample_rate() {
        let mut config = EngineConfig::default();
        let err = config
            .apply_overrides(vars(&[("MOTION_SAMPLE_RATE", "fast")]))
            .unwrap_err();
        assert!(matches!(err, EngineError::Config(ref msg) if msg.starts_with("MOTION_SAMPLE_RATE")));

        let mut config = EngineConfig::default();
        assert!(config
            .apply_overrides(vars(&[("MOTION_SAMPLE_RATE", "-2")]))
            .is_err());
    }

    #[test]
    fn test_env_rejects_threshold_out_of_range() {
        let mut config = EngineConfig::default();
        assert!(config
            .apply_overrides(vars(&[("MOTION_FACE_THRESHOLD", "1.4")]))
            .is_err());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"sample_rate_hz": 5.0}"#).unwrap();
        assert_eq!(config.sample_rate_hz, 5.0);
        assert_eq!(config.face, FaceVerifierConfig::default());
    }
}
