//! Exercise analyzers
//!
//! One stateful analyzer per exercise, each consuming a single landmark frame
//! at a time. Every analyzer:
//! - derives a few scalar features from fixed landmark indices
//! - classifies the phase with two thresholds (a dead-band)
//! - counts repetitions on a state transition only
//! - scores form as a fixed weighted sum of sub-scores
//! - records history only in the phase where a metric is meaningful
//!
//! Frames that are missing or not exactly 33 landmarks long take the
//! lost-tracking path: the last rep count with zeroed instantaneous fields.

pub mod endurance_run;
pub mod pushup;
pub mod rep_counter;
pub mod shuttle_run;
pub mod situp;
pub mod squat;
pub mod vertical_jump;

pub use endurance_run::EnduranceRunAnalyzer;
pub use pushup::PushupAnalyzer;
pub use rep_counter::RepCounter;
pub use shuttle_run::ShuttleRunAnalyzer;
pub use situp::SitupAnalyzer;
pub use squat::SquatAnalyzer;
pub use vertical_jump::VerticalJumpAnalyzer;

use crate::models::landmark::{Landmark, LandmarkFrame};
use crate::models::metrics::{DetailedMetrics, ExerciseType, FrameMetrics};

/// Per-exercise analysis contract
pub trait MovementAnalyzer {
    fn exercise_type(&self) -> ExerciseType;

    /// Analyze one validated frame sampled at `timestamp` seconds
    fn analyze(&mut self, timestamp: f64, frame: &LandmarkFrame) -> FrameMetrics;

    /// Metrics reported when a frame has no usable landmarks
    fn lost_tracking(&self) -> FrameMetrics;

    fn rep_count(&self) -> u32;

    /// Zero the rep count and clear all buffers and phase flags
    fn reset(&mut self);

    /// Means over the history buffers plus a consistency score
    fn detailed_metrics(&self) -> DetailedMetrics;

    /// Analyze a raw landmark list, short-circuiting on lost tracking
    fn analyze_frame(&mut self, timestamp: f64, landmarks: Option<&[Landmark]>) -> FrameMetrics {
        match landmarks.and_then(LandmarkFrame::from_slice) {
            Some(frame) => self.analyze(timestamp, &frame),
            None => {
                tracing::trace!(
                    "{} tracking lost at {:.3}s",
                    self.exercise_type(),
                    timestamp
                );
                self.lost_tracking()
            }
        }
    }
}

/// Closed set of analyzers, one variant per exercise
#[derive(Debug, Clone)]
pub enum ExerciseAnalyzer {
    Squats(SquatAnalyzer),
    Pushups(PushupAnalyzer),
    Situps(SitupAnalyzer),
    VerticalJumps(VerticalJumpAnalyzer),
    ShuttleRun(ShuttleRunAnalyzer),
    EnduranceRuns(EnduranceRunAnalyzer),
}

impl ExerciseAnalyzer {
    /// Create a fresh analyzer for an exercise
    pub fn new(exercise: ExerciseType) -> Self {
        match exercise {
            ExerciseType::Squats => Self::Squats(SquatAnalyzer::new()),
            ExerciseType::Pushups => Self::Pushups(PushupAnalyzer::new()),
            ExerciseType::Situps => Self::Situps(SitupAnalyzer::new()),
            ExerciseType::VerticalJumps => Self::VerticalJumps(VerticalJumpAnalyzer::new()),
            ExerciseType::ShuttleRun => Self::ShuttleRun(ShuttleRunAnalyzer::new()),
            ExerciseType::EnduranceRuns => Self::EnduranceRuns(EnduranceRunAnalyzer::new()),
        }
    }

    fn inner(&self) -> &dyn MovementAnalyzer {
        match self {
            Self::Squats(a) => a,
            Self::Pushups(a) => a,
            Self::Situps(a) => a,
            Self::VerticalJumps(a) => a,
            Self::ShuttleRun(a) => a,
            Self::EnduranceRuns(a) => a,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn MovementAnalyzer {
        match self {
            Self::Squats(a) => a,
            Self::Pushups(a) => a,
            Self::Situps(a) => a,
            Self::VerticalJumps(a) => a,
            Self::ShuttleRun(a) => a,
            Self::EnduranceRuns(a) => a,
        }
    }
}

impl MovementAnalyzer for ExerciseAnalyzer {
    fn exercise_type(&self) -> ExerciseType {
        self.inner().exercise_type()
    }

    fn analyze(&mut self, timestamp: f64, frame: &LandmarkFrame) -> FrameMetrics {
        self.inner_mut().analyze(timestamp, frame)
    }

    fn lost_tracking(&self) -> FrameMetrics {
        self.inner().lost_tracking()
    }

    fn rep_count(&self) -> u32 {
        self.inner().rep_count()
    }

    fn reset(&mut self) {
        self.inner_mut().reset()
    }

    fn detailed_metrics(&self) -> DetailedMetrics {
        self.inner().detailed_metrics()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::models::landmark::{BodyLandmark, Landmark, LANDMARK_COUNT};

    /// Neutral standing pose facing the camera
    pub fn standing_pose() -> Vec<Landmark> {
        let mut lms = vec![Landmark::new(0.5, 0.5); LANDMARK_COUNT];
        set(&mut lms, BodyLandmark::Nose, 0.5, 0.15);
        set(&mut lms, BodyLandmark::LeftShoulder, 0.45, 0.3);
        set(&mut lms, BodyLandmark::RightShoulder, 0.55, 0.3);
        set(&mut lms, BodyLandmark::LeftElbow, 0.43, 0.42);
        set(&mut lms, BodyLandmark::RightElbow, 0.57, 0.42);
        set(&mut lms, BodyLandmark::LeftWrist, 0.42, 0.52);
        set(&mut lms, BodyLandmark::RightWrist, 0.58, 0.52);
        set(&mut lms, BodyLandmark::LeftHip, 0.46, 0.55);
        set(&mut lms, BodyLandmark::RightHip, 0.54, 0.55);
        set(&mut lms, BodyLandmark::LeftKnee, 0.46, 0.72);
        set(&mut lms, BodyLandmark::RightKnee, 0.54, 0.72);
        set(&mut lms, BodyLandmark::LeftAnkle, 0.46, 0.9);
        set(&mut lms, BodyLandmark::RightAnkle, 0.54, 0.9);
        set(&mut lms, BodyLandmark::LeftFootIndex, 0.44, 0.93);
        set(&mut lms, BodyLandmark::RightFootIndex, 0.56, 0.93);
        lms
    }

    pub fn set(lms: &mut [Landmark], which: BodyLandmark, x: f64, y: f64) {
        lms[which.index()] = Landmark::new(x, y);
    }

    /// Place knee and ankle so the hip-knee-ankle angle equals `degrees`
    pub fn bend_knees(lms: &mut [Landmark], degrees: f64) {
        for (hip, knee, ankle) in [
            (BodyLandmark::LeftHip, BodyLandmark::LeftKnee, BodyLandmark::LeftAnkle),
            (BodyLandmark::RightHip, BodyLandmark::RightKnee, BodyLandmark::RightAnkle),
        ] {
            let h = lms[hip.index()];
            let k = Landmark::new(h.x, h.y + 0.17);
            // Thigh points straight up from the knee; rotate the shin away from it
            let theta = degrees.to_radians();
            let a = Landmark::new(k.x + 0.18 * theta.sin(), k.y - 0.18 * theta.cos());
            lms[knee.index()] = k;
            lms[ankle.index()] = a;
        }
    }

    /// Place elbow and wrist so the shoulder-elbow-wrist angle equals `degrees`
    pub fn bend_elbows(lms: &mut [Landmark], degrees: f64) {
        for (shoulder, elbow, wrist) in [
            (BodyLandmark::LeftShoulder, BodyLandmark::LeftElbow, BodyLandmark::LeftWrist),
            (BodyLandmark::RightShoulder, BodyLandmark::RightElbow, BodyLandmark::RightWrist),
        ] {
            let s = lms[shoulder.index()];
            let e = Landmark::new(s.x, s.y + 0.12);
            let theta = degrees.to_radians();
            let w = Landmark::new(e.x + 0.12 * theta.sin(), e.y - 0.12 * theta.cos());
            lms[elbow.index()] = e;
            lms[wrist.index()] = w;
        }
    }
}
