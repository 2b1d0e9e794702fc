use crate::models::landmark::{BodyLandmark, LandmarkFrame};
use crate::models::metrics::{
    DetailedExtra, DetailedMetrics, ExerciseType, FrameDetail, FrameMetrics, Phase,
};
use crate::services::analyzers::{MovementAnalyzer, RepCounter};
use crate::services::geometry::{angle_at, midpoint, percent_of_range};
use crate::services::statistics::{consistency_score, mean, mean_interval, mean_or, round_to};

/// Torso elevation below which the athlete is lying down
const DOWN_ELEVATION: f64 = 20.0;
/// Torso elevation above which the sit-up is complete
const UP_ELEVATION: f64 = 40.0;
/// Elevation reported as 100% depth
const FULL_DEPTH_ELEVATION: f64 = 45.0;
const CONSISTENCY_FACTOR: f64 = 3.0;
const OPTIMAL_DEPTH_RANGE: (f64, f64) = (60.0, 90.0);

const KNEE_WEIGHT: f64 = 0.3;
const TORSO_WEIGHT: f64 = 0.5;
const HEAD_WEIGHT: f64 = 0.2;

/// Sit-up analyzer driven by torso elevation above horizontal
#[derive(Debug, Clone, Default)]
pub struct SitupAnalyzer {
    counter: RepCounter,
    depths: Vec<f64>,
    form_scores: Vec<f64>,
}

impl SitupAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Angle of the hip-shoulder segment above horizontal, in [0, 90]
    fn torso_elevation(frame: &LandmarkFrame) -> f64 {
        let shoulders = midpoint(
            &frame.get(BodyLandmark::LeftShoulder),
            &frame.get(BodyLandmark::RightShoulder),
        );
        let hips = midpoint(
            &frame.get(BodyLandmark::LeftHip),
            &frame.get(BodyLandmark::RightHip),
        );
        let dy = shoulders.y - hips.y;
        let dx = (shoulders.x - hips.x).abs();
        if !dx.is_finite() || !dy.is_finite() || (dx == 0.0 && dy == 0.0) {
            return 0.0;
        }
        dy.atan2(dx).to_degrees().abs().clamp(0.0, 90.0)
    }

    fn form_score(frame: &LandmarkFrame, elevation: f64) -> f64 {
        let knee_angle = (angle_at(
            &frame.get(BodyLandmark::LeftHip),
            &frame.get(BodyLandmark::LeftKnee),
            &frame.get(BodyLandmark::LeftAnkle),
        ) + angle_at(
            &frame.get(BodyLandmark::RightHip),
            &frame.get(BodyLandmark::RightKnee),
            &frame.get(BodyLandmark::RightAnkle),
        )) / 2.0;
        let knee_score = (100.0 - (90.0 - knee_angle).abs()).max(0.0);

        let torso_score = if elevation > 30.0 {
            100.0
        } else {
            (elevation * 3.33).max(0.0)
        };

        let shoulders_x = (frame.get(BodyLandmark::LeftShoulder).x
            + frame.get(BodyLandmark::RightShoulder).x)
            / 2.0;
        let head_score =
            (100.0 - (frame.get(BodyLandmark::Nose).x - shoulders_x).abs() * 500.0).max(0.0);

        knee_score * KNEE_WEIGHT + torso_score * TORSO_WEIGHT + head_score * HEAD_WEIGHT
    }
}

impl MovementAnalyzer for SitupAnalyzer {
    fn exercise_type(&self) -> ExerciseType {
        ExerciseType::Situps
    }

    fn analyze(&mut self, timestamp: f64, frame: &LandmarkFrame) -> FrameMetrics {
        let elevation = Self::torso_elevation(frame);
        let depth = percent_of_range(elevation, 0.0, FULL_DEPTH_ELEVATION);
        let is_down = elevation < DOWN_ELEVATION;
        let is_up = elevation > UP_ELEVATION;

        if self.counter.update(is_down, is_up, timestamp) {
            tracing::debug!("Sit-up rep {} at {:.2}s", self.counter.count(), timestamp);
        }

        let form = Self::form_score(frame, elevation);
        if is_up {
            self.depths.push(depth);
            self.form_scores.push(form);
        }

        let phase = if is_down {
            Phase::Down
        } else if is_up {
            Phase::Up
        } else {
            Phase::Transition
        };

        FrameMetrics {
            rep_count: self.counter.count(),
            phase,
            form_score: form.round(),
            form_recorded: is_up,
            tracking: true,
            detail: FrameDetail::Repetition {
                depth: depth.round(),
                recorded: is_up,
            },
        }
    }

    fn lost_tracking(&self) -> FrameMetrics {
        FrameMetrics {
            rep_count: self.counter.count(),
            phase: Phase::Transition,
            form_score: 0.0,
            form_recorded: false,
            tracking: false,
            detail: FrameDetail::Repetition {
                depth: 0.0,
                recorded: false,
            },
        }
    }

    fn rep_count(&self) -> u32 {
        self.counter.count()
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn detailed_metrics(&self) -> DetailedMetrics {
        let optimal_range = mean(&self.depths)
            .map(|avg| avg >= OPTIMAL_DEPTH_RANGE.0 && avg <= OPTIMAL_DEPTH_RANGE.1)
            .unwrap_or(false);

        DetailedMetrics {
            total_reps: self.counter.count(),
            form_score: mean_or(&self.form_scores, 100.0).round(),
            consistency: consistency_score(&self.depths, CONSISTENCY_FACTOR),
            average_rep_time: round_to(
                mean_interval(self.counter.rep_timestamps()).unwrap_or(0.0),
                2,
            ),
            extra: DetailedExtra::Repetition {
                average_depth: mean_or(&self.depths, 0.0).round(),
                optimal_range: Some(optimal_range),
            },
        }
    }
}
