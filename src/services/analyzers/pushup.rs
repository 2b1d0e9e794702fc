use crate::models::landmark::{BodyLandmark, LandmarkFrame};
use crate::models::metrics::{
    DetailedExtra, DetailedMetrics, ExerciseType, FrameDetail, FrameMetrics, Phase,
};
use crate::services::analyzers::{MovementAnalyzer, RepCounter};
use crate::services::geometry::{angle_at, deviation_from_horizontal, midpoint, percent_of_range};
use crate::services::statistics::{consistency_score, mean_interval, mean_or, round_to};

const DOWN_ELBOW_ANGLE: f64 = 100.0;
const UP_ELBOW_ANGLE: f64 = 160.0;
const CONSISTENCY_FACTOR: f64 = 2.0;

const STRAIGHTNESS_WEIGHT: f64 = 0.6;
const DEPTH_WEIGHT: f64 = 0.4;

/// Push-up analyzer driven by the mean shoulder-elbow-wrist angle
#[derive(Debug, Clone, Default)]
pub struct PushupAnalyzer {
    counter: RepCounter,
    depths: Vec<f64>,
    form_scores: Vec<f64>,
}

impl PushupAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    fn elbow_angle(frame: &LandmarkFrame) -> f64 {
        let left = angle_at(
            &frame.get(BodyLandmark::LeftShoulder),
            &frame.get(BodyLandmark::LeftElbow),
            &frame.get(BodyLandmark::LeftWrist),
        );
        let right = angle_at(
            &frame.get(BodyLandmark::RightShoulder),
            &frame.get(BodyLandmark::RightElbow),
            &frame.get(BodyLandmark::RightWrist),
        );
        (left + right) / 2.0
    }

    fn form_score(frame: &LandmarkFrame, elbow_angle: f64) -> f64 {
        let shoulders = midpoint(
            &frame.get(BodyLandmark::LeftShoulder),
            &frame.get(BodyLandmark::RightShoulder),
        );
        let hips = midpoint(
            &frame.get(BodyLandmark::LeftHip),
            &frame.get(BodyLandmark::RightHip),
        );
        // A plank line is horizontal in the image
        let straightness = (100.0 - deviation_from_horizontal(&shoulders, &hips)).clamp(0.0, 100.0);

        let depth_score = if elbow_angle < DOWN_ELBOW_ANGLE {
            100.0
        } else {
            (100.0 - (elbow_angle - DOWN_ELBOW_ANGLE) * 1.5).clamp(0.0, 100.0)
        };

        straightness * STRAIGHTNESS_WEIGHT + depth_score * DEPTH_WEIGHT
    }
}

impl MovementAnalyzer for PushupAnalyzer {
    fn exercise_type(&self) -> ExerciseType {
        ExerciseType::Pushups
    }

    fn analyze(&mut self, timestamp: f64, frame: &LandmarkFrame) -> FrameMetrics {
        let elbow_angle = Self::elbow_angle(frame);
        let depth = percent_of_range(180.0 - elbow_angle, 0.0, 90.0);
        let is_down = elbow_angle < DOWN_ELBOW_ANGLE;
        let is_up = elbow_angle > UP_ELBOW_ANGLE;

        if self.counter.update(is_down, is_up, timestamp) {
            tracing::debug!("Push-up rep {} at {:.2}s", self.counter.count(), timestamp);
        }

        let form = Self::form_score(frame, elbow_angle);
        if is_down {
            self.depths.push(depth);
            self.form_scores.push(form);
        }

        let phase = match (is_down, is_up) {
            (true, _) => Phase::Down,
            (_, true) => Phase::Up,
            _ => Phase::Transition,
        };

        FrameMetrics {
            rep_count: self.counter.count(),
            phase,
            form_score: form.round(),
            form_recorded: is_down,
            tracking: true,
            detail: FrameDetail::Repetition {
                depth: depth.round(),
                recorded: is_down,
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
                optimal_range: None,
            },
        }
    }
}
