use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{EngineError, Result};
use crate::models::landmark::Landmark;
use crate::services::frame_orchestrator::PoseEstimator;

/// Landmarks captured for one video position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedFrame {
    pub timestamp: f64,
    /// Missing or null when no person was detected
    #[serde(default)]
    pub landmarks: Option<Vec<Landmark>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TrackFile {
    frames: Vec<TrackedFrame>,
}

/// Recorded landmark track standing in for a live pose estimator
///
/// Serialized as `{"frames": [{"timestamp": 0.0, "landmarks": [...]}, ...]}`.
#[derive(Debug, Clone)]
pub struct RecordedPoseTrack {
    frames: Vec<TrackedFrame>,
    /// Maximum distance (seconds) between a sample and a recorded frame
    tolerance: f64,
}

impl RecordedPoseTrack {
    /// Build a track, ordering frames by timestamp
    pub fn new(mut frames: Vec<TrackedFrame>, sample_rate_hz: f64) -> Result<Self> {
        if let Some(bad) = frames.iter().find(|f| !f.timestamp.is_finite()) {
            return Err(EngineError::InvalidInput(format!(
                "non-finite timestamp in pose track: {}",
                bad.timestamp
            )));
        }
        frames.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        Ok(Self {
            frames,
            tolerance: Self::tolerance_for(sample_rate_hz),
        })
    }

    pub fn from_json_str(json: &str, sample_rate_hz: f64) -> Result<Self> {
        let file: TrackFile = serde_json::from_str(json)?;
        Self::new(file.frames, sample_rate_hz)
    }

    /// Load a track from a JSON file
    pub fn load(path: &Path, sample_rate_hz: f64) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let track = Self::from_json_str(&json, sample_rate_hz)?;
        tracing::info!("Loaded pose track with {} frames from {:?}", track.len(), path);
        Ok(track)
    }

    /// Serialize the track in its file format
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&TrackFile {
            frames: self.frames.clone(),
        })?)
    }

    fn tolerance_for(sample_rate_hz: f64) -> f64 {
        if sample_rate_hz > 0.0 {
            0.5 / sample_rate_hz
        } else {
            0.0
        }
    }

    pub fn frames(&self) -> &[TrackedFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Last recorded timestamp plus one sample interval
    pub fn duration(&self) -> f64 {
        self.frames
            .last()
            .map(|f| f.timestamp + self.tolerance * 2.0)
            .unwrap_or(0.0)
    }

    /// Landmarks of the recorded frame nearest `timestamp`, if within tolerance
    pub fn nearest(&self, timestamp: f64) -> Option<&[Landmark]> {
        let idx = self.frames.partition_point(|f| f.timestamp < timestamp);
        let candidates = [idx.checked_sub(1), Some(idx)];
        let best = candidates
            .into_iter()
            .flatten()
            .filter_map(|i| self.frames.get(i))
            .min_by(|a, b| {
                (a.timestamp - timestamp)
                    .abs()
                    .total_cmp(&(b.timestamp - timestamp).abs())
            })?;

        if (best.timestamp - timestamp).abs() <= self.tolerance {
            best.landmarks.as_deref()
        } else {
            None
        }
    }

    /// Frames as `(timestamp, landmarks)` pairs for replay
    pub fn into_replay_frames(self) -> Vec<(f64, Option<Vec<Landmark>>)> {
        self.frames
            .into_iter()
            .map(|f| (f.timestamp, f.landmarks))
            .collect()
    }
}

impl PoseEstimator for RecordedPoseTrack {
    async fn estimate(
        &mut self,
        timestamp: f64,
        _frame: &DynamicImage,
    ) -> Result<Option<Vec<Landmark>>> {
        Ok(self.nearest(timestamp).map(<[Landmark]>::to_vec))
    }
}
