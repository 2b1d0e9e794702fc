use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::metrics::ExerciseType;

/// Face verification summary over a whole session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceVerificationSummary {
    /// More than the presence ratio (30%) of frames had a detected face
    pub detected: bool,
    /// Mean confidence of detected frames, as an integer percentage
    pub confidence: f64,
    /// Number of frames with a detected face
    pub continuous_frames: u32,
    /// At least one frame came from the verifier's disabled mode
    pub simulated: bool,
}

impl Default for FaceVerificationSummary {
    fn default() -> Self {
        Self {
            detected: false,
            confidence: 0.0,
            continuous_frames: 0,
            simulated: false,
        }
    }
}

/// Exercise-shaped part of the final summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "workoutType", rename_all_fields = "camelCase")]
pub enum ExerciseSummary {
    #[serde(rename = "squats")]
    Squats { average_depth: f64 },
    #[serde(rename = "pushups")]
    Pushups { average_depth: f64 },
    #[serde(rename = "situps")]
    Situps { average_depth: f64 },
    #[serde(rename = "vertical-jumps")]
    VerticalJumps {
        max_height: f64,
        average_height: f64,
        hang_time: f64,
    },
    #[serde(rename = "shuttle-run")]
    ShuttleRun {
        average_speed: f64,
        total_distance: f64,
    },
    #[serde(rename = "endurance-runs")]
    EnduranceRuns {
        average_pace: f64,
        cadence: f64,
        stride_length: f64,
        total_distance: f64,
    },
}

impl ExerciseSummary {
    /// Zero-valued summary for an exercise
    pub fn empty(exercise: ExerciseType) -> Self {
        match exercise {
            ExerciseType::Squats => Self::Squats { average_depth: 0.0 },
            ExerciseType::Pushups => Self::Pushups { average_depth: 0.0 },
            ExerciseType::Situps => Self::Situps { average_depth: 0.0 },
            ExerciseType::VerticalJumps => Self::VerticalJumps {
                max_height: 0.0,
                average_height: 0.0,
                hang_time: 0.0,
            },
            ExerciseType::ShuttleRun => Self::ShuttleRun {
                average_speed: 0.0,
                total_distance: 0.0,
            },
            ExerciseType::EnduranceRuns => Self::EnduranceRuns {
                average_pace: 0.0,
                cadence: 0.0,
                stride_length: 0.0,
                total_distance: 0.0,
            },
        }
    }

    pub fn exercise_type(&self) -> ExerciseType {
        match self {
            Self::Squats { .. } => ExerciseType::Squats,
            Self::Pushups { .. } => ExerciseType::Pushups,
            Self::Situps { .. } => ExerciseType::Situps,
            Self::VerticalJumps { .. } => ExerciseType::VerticalJumps,
            Self::ShuttleRun { .. } => ExerciseType::ShuttleRun,
            Self::EnduranceRuns { .. } => ExerciseType::EnduranceRuns,
        }
    }

    pub fn average_depth(&self) -> Option<f64> {
        match self {
            Self::Squats { average_depth }
            | Self::Pushups { average_depth }
            | Self::Situps { average_depth } => Some(*average_depth),
            _ => None,
        }
    }
}

/// Immutable final summary of one analysis pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub session_id: Option<Uuid>,
    pub analyzed_at: Option<DateTime<Utc>>,
    pub total_reps: u32,
    /// Mean recorded form score (integer, 100 when nothing was recorded)
    pub form_score: f64,
    /// Video duration in whole seconds
    pub duration: f64,
    pub face_verification: FaceVerificationSummary,
    pub timestamps: Vec<f64>,
    #[serde(flatten)]
    pub summary: ExerciseSummary,
}

impl AnalysisResult {
    pub fn exercise_type(&self) -> ExerciseType {
        self.summary.exercise_type()
    }
}
