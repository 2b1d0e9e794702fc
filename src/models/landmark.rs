//! Body landmark models
//!
//! Landmarks arrive from an external pose estimator in normalized frame
//! coordinates (x right, y down, both roughly in [0, 1]). A full frame holds
//! exactly 33 points in a fixed topology; anything else is treated as lost
//! tracking by the analyzers.

use serde::{Deserialize, Serialize};

/// Number of landmarks in one pose frame
pub const LANDMARK_COUNT: usize = 33;

/// A single tracked body keypoint
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    /// X coordinate (normalized 0-1)
    pub x: f64,
    /// Y coordinate (normalized 0-1, grows downward)
    pub y: f64,
    /// Depth relative to the hips (estimator units)
    #[serde(default)]
    pub z: f64,
    /// Visibility / confidence (0-1)
    #[serde(default = "default_visibility")]
    pub visibility: f64,
}

fn default_visibility() -> f64 {
    1.0
}

impl Landmark {
    /// Create a fully visible landmark in the image plane
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            visibility: 1.0,
        }
    }

    /// Create a landmark with explicit depth and visibility
    pub fn with_depth(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self { x, y, z, visibility }
    }

    /// Check if landmark is visible above a confidence threshold
    pub fn is_visible(&self, min_visibility: f64) -> bool {
        self.visibility >= min_visibility
    }

    /// Euclidean distance in the image plane
    pub fn distance_to(&self, other: &Landmark) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Landmark indices used by the analyzers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyLandmark {
    Nose = 0,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl BodyLandmark {
    /// Get landmark name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
            Self::LeftFootIndex => "left_foot_index",
            Self::RightFootIndex => "right_foot_index",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// One validated pose frame of exactly 33 landmarks
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFrame {
    points: [Landmark; LANDMARK_COUNT],
}

impl LandmarkFrame {
    /// Validate a raw landmark slice; `None` means tracking was lost
    pub fn from_slice(landmarks: &[Landmark]) -> Option<Self> {
        let points: [Landmark; LANDMARK_COUNT] = landmarks.try_into().ok()?;
        Some(Self { points })
    }

    /// Get landmark by topology name
    pub fn get(&self, landmark: BodyLandmark) -> Landmark {
        self.points[landmark.index()]
    }

    /// Get landmark by raw index
    pub fn get_by_index(&self, index: usize) -> Option<&Landmark> {
        self.points.get(index)
    }

    pub fn points(&self) -> &[Landmark] {
        &self.points
    }

    /// Check if all listed landmarks are visible
    pub fn has_visible_landmarks(&self, landmarks: &[BodyLandmark], min_visibility: f64) -> bool {
        landmarks
            .iter()
            .all(|lm| self.get(*lm).is_visible(min_visibility))
    }
}

impl TryFrom<&[Landmark]> for LandmarkFrame {
    type Error = crate::error::EngineError;

    fn try_from(landmarks: &[Landmark]) -> Result<Self, Self::Error> {
        Self::from_slice(landmarks).ok_or_else(|| {
            crate::error::EngineError::InvalidInput(format!(
                "expected {} landmarks, got {}",
                LANDMARK_COUNT,
                landmarks.len()
            ))
        })
    }
}
