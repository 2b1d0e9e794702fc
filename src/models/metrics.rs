use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::EngineError;

/// Exercise types supported by the analysis engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExerciseType {
    #[serde(rename = "squats")]
    Squats,
    #[serde(rename = "pushups")]
    Pushups,
    #[serde(rename = "situps")]
    Situps,
    #[serde(rename = "vertical-jumps")]
    VerticalJumps,
    #[serde(rename = "shuttle-run")]
    ShuttleRun,
    #[serde(rename = "endurance-runs")]
    EnduranceRuns,
}

impl ExerciseType {
    pub fn all() -> [ExerciseType; 6] {
        [
            Self::Squats,
            Self::Pushups,
            Self::Situps,
            Self::VerticalJumps,
            Self::ShuttleRun,
            Self::EnduranceRuns,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Squats => "squats",
            Self::Pushups => "pushups",
            Self::Situps => "situps",
            Self::VerticalJumps => "vertical-jumps",
            Self::ShuttleRun => "shuttle-run",
            Self::EnduranceRuns => "endurance-runs",
        }
    }

    /// Whether the exercise reports a depth percentage
    pub fn is_depth_based(&self) -> bool {
        matches!(self, Self::Squats | Self::Pushups | Self::Situps)
    }
}

impl std::fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExerciseType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "squats" | "squat" => Ok(Self::Squats),
            "pushups" | "pushup" | "push-up" | "push-ups" => Ok(Self::Pushups),
            "situps" | "situp" | "sit-up" | "sit-ups" => Ok(Self::Situps),
            "vertical-jumps" | "vertical-jump" | "jump" => Ok(Self::VerticalJumps),
            "shuttle-run" | "shuttle" => Ok(Self::ShuttleRun),
            "endurance-runs" | "endurance-run" | "run" => Ok(Self::EnduranceRuns),
            other => Err(EngineError::InvalidInput(format!(
                "unknown exercise type: {}",
                other
            ))),
        }
    }
}

/// Discrete movement-cycle state for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Up,
    Down,
    Transition,
    Ground,
    Takeoff,
    Airtime,
    Landing,
    Left,
    Right,
    Center,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Up => "up",
            Phase::Down => "down",
            Phase::Transition => "transition",
            Phase::Ground => "ground",
            Phase::Takeoff => "takeoff",
            Phase::Airtime => "airtime",
            Phase::Landing => "landing",
            Phase::Left => "left",
            Phase::Right => "right",
            Phase::Center => "center",
        };
        write!(f, "{}", name)
    }
}

/// Per-frame analyzer output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameMetrics {
    /// Repetitions (or steps) counted so far; never decreases within a session
    pub rep_count: u32,
    pub phase: Phase,
    /// Instantaneous form score (0-100, integer precision)
    pub form_score: f64,
    /// True when this frame's form score entered the analyzer history
    pub form_recorded: bool,
    /// False when the frame had no usable landmarks
    pub tracking: bool,
    pub detail: FrameDetail,
}

/// Exercise-specific per-frame fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum FrameDetail {
    /// Squats, push-ups and sit-ups
    Repetition {
        /// Depth percentage (integer)
        depth: f64,
        /// Depth was recorded into history this frame
        recorded: bool,
    },
    VerticalJump {
        current_height: f64,
        max_height: f64,
        average_height: f64,
        /// Hang time of the most recent jump (seconds, 2 decimals)
        hang_time: f64,
        airborne: bool,
        /// Set only on the frame a jump lands
        landed_hang_time: Option<f64>,
    },
    ShuttleRun {
        /// Torso centre x (0-1)
        position: f64,
        /// Normalized units per second (3 decimals)
        speed: f64,
        /// Horizontal travel since the previous frame (x100, unrounded)
        distance: f64,
        speed_measured: bool,
    },
    EnduranceRun {
        /// Ankle separation (3 decimals)
        stride: f64,
        /// Current step rate, steps per minute (integer)
        pace: f64,
        /// Mean step rate, steps per minute (integer)
        cadence: f64,
        /// A foot strike was registered this frame
        step_recorded: bool,
    },
}

impl FrameMetrics {
    /// Depth percentage when the frame belongs to a depth-based exercise
    pub fn depth(&self) -> Option<f64> {
        match self.detail {
            FrameDetail::Repetition { depth, .. } => Some(depth),
            _ => None,
        }
    }
}

/// Session-level summary computed from an analyzer's history buffers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedMetrics {
    pub total_reps: u32,
    pub form_score: f64,
    pub consistency: f64,
    /// Mean interval between counted reps (seconds, 2 decimals)
    pub average_rep_time: f64,
    pub extra: DetailedExtra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DetailedExtra {
    Repetition {
        average_depth: f64,
        /// Sit-ups only: average depth sits within the 60-90% band
        optimal_range: Option<bool>,
    },
    VerticalJump {
        max_height: f64,
        average_height: f64,
        average_hang_time: f64,
        /// Jumps per minute between the first and last landing
        jump_frequency: f64,
    },
    ShuttleRun {
        average_speed: f64,
        max_speed: f64,
        total_distance: f64,
    },
    EnduranceRun {
        average_pace: f64,
        average_stride: f64,
        cadence: f64,
        total_distance: f64,
    },
}
