use crate::models::landmark::{BodyLandmark, LandmarkFrame};
use crate::models::metrics::{
    DetailedExtra, DetailedMetrics, ExerciseType, FrameDetail, FrameMetrics, Phase,
};
use crate::services::analyzers::MovementAnalyzer;
use crate::services::geometry::midpoint;
use crate::services::statistics::{
    consistency_score, mean_interval, mean_or, population_std_dev, round_to,
};

const LEFT_ZONE_MAX: f64 = 0.3;
const RIGHT_ZONE_MIN: f64 = 0.7;
/// Minimum per-frame travel for a centre frame to count as moving
const TRANSITION_MOVEMENT: f64 = 0.02;
const SPEED_WINDOW: usize = 5;
const CONSISTENCY_FACTOR: f64 = 50.0;
const OPTIMAL_LEAN_DEGREES: f64 = 10.0;

const ALIGNMENT_WEIGHT: f64 = 0.3;
const LEAN_WEIGHT: f64 = 0.2;
const SPEED_WEIGHT: f64 = 0.3;
const KNEE_LIFT_WEIGHT: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Shuttle run analyzer tracking lateral torso position
///
/// One rep is one traversal: entering a side zone opposite to the last side
/// zone visited. The first zone entry only arms the counter.
#[derive(Debug, Clone, Default)]
pub struct ShuttleRunAnalyzer {
    rep_count: u32,
    rep_timestamps: Vec<f64>,
    last_side: Option<Side>,
    /// Timestamp and position of the previous tracked frame
    last_sample: Option<(f64, f64)>,
    speeds: Vec<f64>,
    max_speed: f64,
    total_distance: f64,
    form_scores: Vec<f64>,
}

impl ShuttleRunAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mean x of both shoulders and both hips
    fn torso_center_x(frame: &LandmarkFrame) -> f64 {
        (frame.get(BodyLandmark::LeftShoulder).x
            + frame.get(BodyLandmark::RightShoulder).x
            + frame.get(BodyLandmark::LeftHip).x
            + frame.get(BodyLandmark::RightHip).x)
            / 4.0
    }

    fn form_score(&self, frame: &LandmarkFrame) -> f64 {
        let ls = frame.get(BodyLandmark::LeftShoulder);
        let rs = frame.get(BodyLandmark::RightShoulder);
        let lh = frame.get(BodyLandmark::LeftHip);
        let rh = frame.get(BodyLandmark::RightHip);

        let tilt = (ls.y - rs.y).abs() + (lh.y - rh.y).abs();
        let alignment = (100.0 - tilt * 500.0).max(0.0);

        let shoulders = midpoint(&ls, &rs);
        let hips = midpoint(&lh, &rh);
        let lean = (shoulders.x - hips.x).atan2(hips.y - shoulders.y).to_degrees();
        let lean_score = if lean.is_finite() {
            (100.0 - (lean.abs() - OPTIMAL_LEAN_DEGREES).abs() * 5.0).max(0.0)
        } else {
            0.0
        };

        let speed_score = if self.speeds.len() >= SPEED_WINDOW {
            let recent = &self.speeds[self.speeds.len() - SPEED_WINDOW..];
            (100.0 - population_std_dev(recent) * 50.0).max(0.0)
        } else {
            100.0
        };

        let knees_y = (frame.get(BodyLandmark::LeftKnee).y + frame.get(BodyLandmark::RightKnee).y) / 2.0;
        let knee_lift = (hips.y - knees_y).max(0.0);
        let knee_lift_score = (knee_lift * 500.0).min(100.0);

        alignment * ALIGNMENT_WEIGHT
            + lean_score * LEAN_WEIGHT
            + speed_score * SPEED_WEIGHT
            + knee_lift_score * KNEE_LIFT_WEIGHT
    }
}

impl MovementAnalyzer for ShuttleRunAnalyzer {
    fn exercise_type(&self) -> ExerciseType {
        ExerciseType::ShuttleRun
    }

    fn analyze(&mut self, timestamp: f64, frame: &LandmarkFrame) -> FrameMetrics {
        let position = Self::torso_center_x(frame);

        let mut movement = 0.0;
        let mut speed = 0.0;
        let mut speed_measured = false;
        if let Some((last_ts, last_x)) = self.last_sample {
            movement = position - last_x;
            let dt = timestamp - last_ts;
            if dt > 0.0 {
                speed = movement.abs() / dt;
                speed_measured = true;
                self.speeds.push(speed);
                self.max_speed = self.max_speed.max(speed);
            }
        }
        let distance = movement.abs() * 100.0;
        self.total_distance += distance;
        self.last_sample = Some((timestamp, position));

        let side = if position < LEFT_ZONE_MAX {
            Some(Side::Left)
        } else if position > RIGHT_ZONE_MIN {
            Some(Side::Right)
        } else {
            None
        };

        if let Some(side) = side {
            match self.last_side {
                Some(last) if last != side => {
                    self.rep_count += 1;
                    self.rep_timestamps.push(timestamp);
                    tracing::debug!("Shuttle {} completed at {:.2}s", self.rep_count, timestamp);
                }
                _ => {}
            }
            self.last_side = Some(side);
        }

        let form = self.form_score(frame);
        self.form_scores.push(form);

        let phase = match side {
            Some(Side::Left) => Phase::Left,
            Some(Side::Right) => Phase::Right,
            None if movement.abs() > TRANSITION_MOVEMENT => Phase::Transition,
            None => Phase::Center,
        };

        FrameMetrics {
            rep_count: self.rep_count,
            phase,
            form_score: form.round(),
            form_recorded: true,
            tracking: true,
            detail: FrameDetail::ShuttleRun {
                position: round_to(position, 3),
                speed: round_to(speed, 3),
                distance,
                speed_measured,
            },
        }
    }

    fn lost_tracking(&self) -> FrameMetrics {
        FrameMetrics {
            rep_count: self.rep_count,
            phase: Phase::Center,
            form_score: 0.0,
            form_recorded: false,
            tracking: false,
            detail: FrameDetail::ShuttleRun {
                position: 0.0,
                speed: 0.0,
                distance: 0.0,
                speed_measured: false,
            },
        }
    }

    fn rep_count(&self) -> u32 {
        self.rep_count
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn detailed_metrics(&self) -> DetailedMetrics {
        DetailedMetrics {
            total_reps: self.rep_count,
            form_score: mean_or(&self.form_scores, 100.0).round(),
            consistency: consistency_score(&self.speeds, CONSISTENCY_FACTOR),
            average_rep_time: round_to(mean_interval(&self.rep_timestamps).unwrap_or(0.0), 2),
            extra: DetailedExtra::ShuttleRun {
                average_speed: round_to(mean_or(&self.speeds, 0.0), 3),
                max_speed: round_to(self.max_speed, 3),
                total_distance: round_to(self.total_distance, 2),
            },
        }
    }
}
