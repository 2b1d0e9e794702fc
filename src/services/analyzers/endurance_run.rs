use crate::models::landmark::{BodyLandmark, LandmarkFrame};
use crate::models::metrics::{
    DetailedExtra, DetailedMetrics, ExerciseType, FrameDetail, FrameMetrics, Phase,
};
use crate::services::analyzers::MovementAnalyzer;
use crate::services::geometry::{angle_at, midpoint, segment_angle};
use crate::services::statistics::{consistency_score, mean, mean_or, round_to};

/// Relative foot lift above which a foot is in the air
const FOOT_RAISED_LIFT: f64 = 0.10;
/// Relative foot lift below which a raised foot has struck the ground
const FOOT_STRIKE_LIFT: f64 = 0.05;
const CONSISTENCY_FACTOR: f64 = 100.0;

const OPTIMAL_POSTURE_DEGREES: f64 = 87.5;
const KNEE_DRIVE_BAND: (f64, f64) = (120.0, 150.0);
const STRIDE_BAND: (f64, f64) = (0.15, 0.35);
const OPTIMAL_STRIDE: f64 = 0.25;

/// Raised/grounded state for one foot
#[derive(Debug, Clone, Copy, Default)]
struct FootState {
    raised: bool,
}

impl FootState {
    /// Returns true on the frame the foot strikes after being raised
    fn update(&mut self, lift: f64) -> bool {
        if !self.raised && lift > FOOT_RAISED_LIFT {
            self.raised = true;
            false
        } else if self.raised && lift < FOOT_STRIKE_LIFT {
            self.raised = false;
            true
        } else {
            false
        }
    }
}

/// Endurance run analyzer counting steps from per-foot lift
///
/// Each foot is tracked independently relative to the hip line. A step is
/// one foot strike; both feet contribute to the same counter.
#[derive(Debug, Clone, Default)]
pub struct EnduranceRunAnalyzer {
    steps: u32,
    left: FootState,
    right: FootState,
    last_step_time: Option<f64>,
    step_intervals: Vec<f64>,
    strides: Vec<f64>,
    paces: Vec<f64>,
    form_scores: Vec<f64>,
}

impl EnduranceRunAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lift of each foot relative to the lower of the two, in [0, 1]
    fn foot_lifts(frame: &LandmarkFrame) -> (f64, f64) {
        let hip_y = midpoint(
            &frame.get(BodyLandmark::LeftHip),
            &frame.get(BodyLandmark::RightHip),
        )
        .y;
        let left = frame.get(BodyLandmark::LeftAnkle).y - hip_y;
        let right = frame.get(BodyLandmark::RightAnkle).y - hip_y;
        let lowest = left.max(right);
        if !lowest.is_finite() || lowest <= 0.0 {
            return (0.0, 0.0);
        }
        (1.0 - left / lowest, 1.0 - right / lowest)
    }

    fn current_pace(&self) -> f64 {
        match self.step_intervals.last() {
            Some(interval) if *interval > 0.0 => (60.0 / interval).round(),
            _ => 0.0,
        }
    }

    fn cadence(&self) -> f64 {
        match mean(&self.step_intervals) {
            Some(interval) if interval > 0.0 => (60.0 / interval).round(),
            _ => 0.0,
        }
    }

    fn form_score(frame: &LandmarkFrame, stride: f64) -> f64 {
        let shoulders = midpoint(
            &frame.get(BodyLandmark::LeftShoulder),
            &frame.get(BodyLandmark::RightShoulder),
        );
        let hips = midpoint(
            &frame.get(BodyLandmark::LeftHip),
            &frame.get(BodyLandmark::RightHip),
        );
        let posture_angle = segment_angle(&hips, &shoulders).abs();
        let posture = (100.0 - (OPTIMAL_POSTURE_DEGREES - posture_angle).abs() * 2.0).max(0.0);

        let left_knee = angle_at(
            &frame.get(BodyLandmark::LeftHip),
            &frame.get(BodyLandmark::LeftKnee),
            &frame.get(BodyLandmark::LeftAnkle),
        );
        let right_knee = angle_at(
            &frame.get(BodyLandmark::RightHip),
            &frame.get(BodyLandmark::RightKnee),
            &frame.get(BodyLandmark::RightAnkle),
        );
        let max_knee = left_knee.max(right_knee);
        let knee_drive = if (KNEE_DRIVE_BAND.0..=KNEE_DRIVE_BAND.1).contains(&max_knee) {
            100.0
        } else {
            (100.0 - (135.0 - max_knee).abs()).max(0.0)
        };

        let stride_score = if (STRIDE_BAND.0..=STRIDE_BAND.1).contains(&stride) {
            100.0
        } else {
            (100.0 - (OPTIMAL_STRIDE - stride).abs() * 200.0).max(0.0)
        };

        let shin_angle = (segment_angle(
            &frame.get(BodyLandmark::LeftKnee),
            &frame.get(BodyLandmark::LeftAnkle),
        )
        .abs()
            + segment_angle(
                &frame.get(BodyLandmark::RightKnee),
                &frame.get(BodyLandmark::RightAnkle),
            )
            .abs())
            / 2.0;
        let foot_strike = (100.0 - (90.0 - shin_angle).abs()).max(0.0);

        (posture + knee_drive + stride_score + foot_strike) / 4.0
    }
}

impl MovementAnalyzer for EnduranceRunAnalyzer {
    fn exercise_type(&self) -> ExerciseType {
        ExerciseType::EnduranceRuns
    }

    fn analyze(&mut self, timestamp: f64, frame: &LandmarkFrame) -> FrameMetrics {
        let (left_lift, right_lift) = Self::foot_lifts(frame);
        let stride = (frame.get(BodyLandmark::LeftAnkle).x - frame.get(BodyLandmark::RightAnkle).x).abs();

        let strikes =
            u32::from(self.left.update(left_lift)) + u32::from(self.right.update(right_lift));
        let step_recorded = strikes > 0;
        if step_recorded {
            self.steps += strikes;
            if let Some(last) = self.last_step_time {
                let interval = timestamp - last;
                if interval > 0.0 {
                    self.step_intervals.push(interval);
                    self.paces.push(60.0 / interval);
                }
            }
            self.last_step_time = Some(timestamp);
            self.strides.push(stride);
            tracing::trace!("Step {} at {:.2}s, stride {:.3}", self.steps, timestamp, stride);
        }

        let form = Self::form_score(frame, stride);
        self.form_scores.push(form);

        let phase = if step_recorded {
            Phase::Down
        } else if self.left.raised || self.right.raised {
            Phase::Up
        } else {
            Phase::Transition
        };

        FrameMetrics {
            rep_count: self.steps,
            phase,
            form_score: form.round(),
            form_recorded: true,
            tracking: true,
            detail: FrameDetail::EnduranceRun {
                stride: round_to(stride, 3),
                pace: self.current_pace(),
                cadence: self.cadence(),
                step_recorded,
            },
        }
    }

    fn lost_tracking(&self) -> FrameMetrics {
        FrameMetrics {
            rep_count: self.steps,
            phase: Phase::Transition,
            form_score: 0.0,
            form_recorded: false,
            tracking: false,
            detail: FrameDetail::EnduranceRun {
                stride: 0.0,
                pace: 0.0,
                cadence: 0.0,
                step_recorded: false,
            },
        }
    }

    fn rep_count(&self) -> u32 {
        self.steps
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn detailed_metrics(&self) -> DetailedMetrics {
        let average_stride = mean_or(&self.strides, 0.0);
        DetailedMetrics {
            total_reps: self.steps,
            form_score: mean_or(&self.form_scores, 100.0).round(),
            consistency: consistency_score(&self.step_intervals, CONSISTENCY_FACTOR),
            average_rep_time: round_to(mean_or(&self.step_intervals, 0.0), 2),
            extra: DetailedExtra::EnduranceRun {
                average_pace: mean_or(&self.paces, 0.0).round(),
                average_stride: round_to(average_stride, 3),
                cadence: self.cadence(),
                total_distance: round_to(f64::from(self.steps) * average_stride * 2.0, 2),
            },
        }
    }
}
