use crate::models::landmark::{BodyLandmark, LandmarkFrame};
use crate::models::metrics::{
    DetailedExtra, DetailedMetrics, ExerciseType, FrameDetail, FrameMetrics, Phase,
};
use crate::services::analyzers::{MovementAnalyzer, RepCounter};
use crate::services::geometry::{angle_at, midpoint};
use crate::services::statistics::{consistency_score, mean_interval, mean_or, round_to};

/// Number of frames used to establish the standing hip height
pub const CALIBRATION_FRAMES: u32 = 30;
const BASELINE_BLEND: f64 = 0.1;
/// Scale from normalized hip rise to reported height units
const HEIGHT_SCALE: f64 = 200.0;
const AIRBORNE_HEIGHT: f64 = 8.0;
const TAKEOFF_KNEE_ANGLE: f64 = 140.0;
const TAKEOFF_MAX_HEIGHT: f64 = 5.0;
const CONSISTENCY_FACTOR: f64 = 2.0;

const ALIGNMENT_WEIGHT: f64 = 0.4;
const TAKEOFF_WEIGHT: f64 = 0.3;
const LANDING_WEIGHT: f64 = 0.2;
const ARMS_WEIGHT: f64 = 0.1;

/// Vertical jump analyzer
///
/// The first 30 tracked frames calibrate a standing hip baseline. After that
/// the hip rise above the baseline is the jump height; a jump counts when the
/// athlete comes back down.
#[derive(Debug, Clone, Default)]
pub struct VerticalJumpAnalyzer {
    frames_seen: u32,
    baseline_hip_y: f64,
    counter: RepCounter,
    takeoff_time: Option<f64>,
    last_hang_time: f64,
    heights: Vec<f64>,
    hang_times: Vec<f64>,
    form_scores: Vec<f64>,
}

impl VerticalJumpAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_calibrated(&self) -> bool {
        self.frames_seen > CALIBRATION_FRAMES
    }

    fn hip_y(frame: &LandmarkFrame) -> f64 {
        midpoint(
            &frame.get(BodyLandmark::LeftHip),
            &frame.get(BodyLandmark::RightHip),
        )
        .y
    }

    fn knee_angle(frame: &LandmarkFrame) -> f64 {
        (angle_at(
            &frame.get(BodyLandmark::LeftHip),
            &frame.get(BodyLandmark::LeftKnee),
            &frame.get(BodyLandmark::LeftAnkle),
        ) + angle_at(
            &frame.get(BodyLandmark::RightHip),
            &frame.get(BodyLandmark::RightKnee),
            &frame.get(BodyLandmark::RightAnkle),
        )) / 2.0
    }

    fn form_score(frame: &LandmarkFrame, knee_angle: f64, phase: Phase) -> f64 {
        let shoulders = midpoint(
            &frame.get(BodyLandmark::LeftShoulder),
            &frame.get(BodyLandmark::RightShoulder),
        );
        let ankles = midpoint(
            &frame.get(BodyLandmark::LeftAnkle),
            &frame.get(BodyLandmark::RightAnkle),
        );
        let alignment = (100.0 - (shoulders.x - ankles.x).abs() * 500.0).max(0.0);

        let takeoff = if knee_angle < 90.0 {
            60.0
        } else if knee_angle > 140.0 {
            70.0
        } else {
            100.0
        };

        let landing = if knee_angle > 170.0 {
            60.0
        } else if knee_angle < 90.0 {
            70.0
        } else {
            100.0
        };

        let arms = match phase {
            Phase::Takeoff | Phase::Airtime => {
                let wrists = midpoint(
                    &frame.get(BodyLandmark::LeftWrist),
                    &frame.get(BodyLandmark::RightWrist),
                );
                if wrists.y < shoulders.y - 0.1 {
                    100.0
                } else {
                    70.0
                }
            }
            _ => 100.0,
        };

        alignment * ALIGNMENT_WEIGHT
            + takeoff * TAKEOFF_WEIGHT
            + landing * LANDING_WEIGHT
            + arms * ARMS_WEIGHT
    }

    fn max_height(&self) -> f64 {
        self.heights.iter().copied().fold(0.0, f64::max)
    }

    fn calibrating_metrics(&self) -> FrameMetrics {
        FrameMetrics {
            rep_count: self.counter.count(),
            phase: Phase::Ground,
            form_score: 0.0,
            form_recorded: false,
            tracking: true,
            detail: FrameDetail::VerticalJump {
                current_height: 0.0,
                max_height: 0.0,
                average_height: 0.0,
                hang_time: 0.0,
                airborne: false,
                landed_hang_time: None,
            },
        }
    }
}

impl MovementAnalyzer for VerticalJumpAnalyzer {
    fn exercise_type(&self) -> ExerciseType {
        ExerciseType::VerticalJumps
    }

    fn analyze(&mut self, timestamp: f64, frame: &LandmarkFrame) -> FrameMetrics {
        let hip_y = Self::hip_y(frame);
        self.frames_seen += 1;

        if self.frames_seen <= CALIBRATION_FRAMES {
            self.baseline_hip_y = if self.frames_seen == 1 {
                hip_y
            } else {
                self.baseline_hip_y * (1.0 - BASELINE_BLEND) + hip_y * BASELINE_BLEND
            };
            if self.frames_seen == CALIBRATION_FRAMES {
                tracing::debug!("Jump baseline calibrated at hip y {:.3}", self.baseline_hip_y);
            }
            return self.calibrating_metrics();
        }

        let height = ((self.baseline_hip_y - hip_y) * HEIGHT_SCALE).max(0.0);
        let knee_angle = Self::knee_angle(frame);
        let in_air = height > AIRBORNE_HEIGHT;

        if in_air && self.takeoff_time.is_none() {
            self.takeoff_time = Some(timestamp);
        }

        let mut landed_hang_time = None;
        let landed = self.counter.update(in_air, !in_air, timestamp);
        if landed {
            let hang = timestamp - self.takeoff_time.take().unwrap_or(timestamp);
            self.hang_times.push(hang);
            self.last_hang_time = hang;
            landed_hang_time = Some(round_to(hang, 2));
            tracing::debug!(
                "Jump {} landed at {:.2}s, hang time {:.2}s",
                self.counter.count(),
                timestamp,
                hang
            );
        }

        if in_air {
            self.heights.push(height);
        }

        let phase = if in_air {
            Phase::Airtime
        } else if landed {
            Phase::Landing
        } else if knee_angle < TAKEOFF_KNEE_ANGLE && height < TAKEOFF_MAX_HEIGHT {
            Phase::Takeoff
        } else {
            Phase::Ground
        };

        let form = Self::form_score(frame, knee_angle, phase);
        self.form_scores.push(form);

        FrameMetrics {
            rep_count: self.counter.count(),
            phase,
            form_score: form.round(),
            form_recorded: true,
            tracking: true,
            detail: FrameDetail::VerticalJump {
                current_height: height.round(),
                max_height: self.max_height().round(),
                average_height: mean_or(&self.heights, 0.0).round(),
                hang_time: round_to(self.last_hang_time, 2),
                airborne: in_air,
                landed_hang_time,
            },
        }
    }

    fn lost_tracking(&self) -> FrameMetrics {
        FrameMetrics {
            rep_count: self.counter.count(),
            phase: Phase::Ground,
            form_score: 0.0,
            form_recorded: false,
            tracking: false,
            detail: FrameDetail::VerticalJump {
                current_height: 0.0,
                max_height: 0.0,
                average_height: 0.0,
                hang_time: 0.0,
                airborne: false,
                landed_hang_time: None,
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
        let landings = self.counter.rep_timestamps();
        let jump_frequency = match (landings.first(), landings.last()) {
            (Some(first), Some(last)) if landings.len() > 1 && last > first => {
                round_to((landings.len() - 1) as f64 / (last - first) * 60.0, 1)
            }
            _ => 0.0,
        };

        DetailedMetrics {
            total_reps: self.counter.count(),
            form_score: mean_or(&self.form_scores, 100.0).round(),
            consistency: consistency_score(&self.heights, CONSISTENCY_FACTOR),
            average_rep_time: round_to(mean_interval(landings).unwrap_or(0.0), 2),
            extra: DetailedExtra::VerticalJump {
                max_height: self.max_height().round(),
                average_height: mean_or(&self.heights, 0.0).round(),
                average_hang_time: round_to(mean_or(&self.hang_times, 0.0), 2),
                jump_frequency,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::landmark::Landmark;
    use crate::services::analyzers::test_support::standing_pose;

    /// Standing pose shifted up by `rise` (normalized units)
    fn lifted(rise: f64) -> Vec<Landmark> {
        standing_pose()
            .into_iter()
            .map(|lm| Landmark::new(lm.x, lm.y - rise))
            .collect()
    }

    fn calibrate(analyzer: &mut VerticalJumpAnalyzer) -> f64 {
        let pose = lifted(0.0);
        for i in 0..CALIBRATION_FRAMES {
            let metrics = analyzer.analyze_frame(i as f64 * 0.1, Some(&pose));
            assert_eq!(metrics.phase, Phase::Ground);
            assert!(!metrics.form_recorded);
        }
        CALIBRATION_FRAMES as f64 * 0.1
    }

    #[test]
    fn test_calibration_then_jump() {
        let mut analyzer = VerticalJumpAnalyzer::new();
        let t0 = calibrate(&mut analyzer);
        assert!(!analyzer.is_calibrated());

        let rises = [0.0, 0.1, 0.15, 0.1, 0.0, 0.0];
        let frames: Vec<FrameMetrics> = rises
            .iter()
            .enumerate()
            .map(|(i, r)| analyzer.analyze_frame(t0 + i as f64 * 0.1, Some(&lifted(*r))))
            .collect();

        assert!(analyzer.is_calibrated());
        assert_eq!(frames[1].phase, Phase::Airtime);
        assert_eq!(frames[3].phase, Phase::Airtime);
        assert_eq!(frames[4].phase, Phase::Landing);
        assert_eq!(frames[4].rep_count, 1);
        assert_eq!(frames[5].rep_count, 1);

        match frames[4].detail {
            FrameDetail::VerticalJump {
                landed_hang_time,
                max_height,
                ..
            } => {
                // airborne from t0+0.1 to the landing frame at t0+0.4
                assert_eq!(landed_hang_time, Some(0.3));
                assert_eq!(max_height, 30.0);
            }
            ref other => panic!("unexpected detail: {:?}", other),
        }
    }

    #[test]
    fn test_no_jump_counted_during_calibration() {
        let mut analyzer = VerticalJumpAnalyzer::new();
        for i in 0..CALIBRATION_FRAMES {
            let rise = if i % 2 == 0 { 0.0 } else { 0.2 };
            let metrics = analyzer.analyze_frame(i as f64 * 0.1, Some(&lifted(rise)));
            assert_eq!(metrics.rep_count, 0);
        }
    }

    #[test]
    fn test_height_never_negative() {
        let mut analyzer = VerticalJumpAnalyzer::new();
        let t0 = calibrate(&mut analyzer);
        let metrics = analyzer.analyze_frame(t0, Some(&lifted(-0.1)));
        match metrics.detail {
            FrameDetail::VerticalJump { current_height, .. } => assert_eq!(current_height, 0.0),
            ref other => panic!("unexpected detail: {:?}", other),
        }
    }

    #[test]
    fn test_detailed_metrics_after_two_jumps() {
        let mut analyzer = VerticalJumpAnalyzer::new();
        let t0 = calibrate(&mut analyzer);
        let rises = [0.0, 0.1, 0.1, 0.0, 0.0, 0.1, 0.1, 0.0];
        for (i, r) in rises.iter().enumerate() {
            analyzer.analyze_frame(t0 + i as f64 * 0.1, Some(&lifted(*r)));
        }

        let detailed = analyzer.detailed_metrics();
        assert_eq!(detailed.total_reps, 2);
        assert_eq!(detailed.average_rep_time, 0.4);
        match detailed.extra {
            DetailedExtra::VerticalJump {
                max_height,
                average_height,
                average_hang_time,
                jump_frequency,
            } => {
                assert_eq!(max_height, 20.0);
                assert_eq!(average_height, 20.0);
                assert_eq!(average_hang_time, 0.2);
                assert_eq!(jump_frequency, 150.0);
            }
            other => panic!("unexpected extra: {:?}", other),
        }
    }
}
