use crate::models::landmark::{BodyLandmark, LandmarkFrame};
use crate::models::metrics::{
    DetailedExtra, DetailedMetrics, ExerciseType, FrameDetail, FrameMetrics, Phase,
};
use crate::services::analyzers::{MovementAnalyzer, RepCounter};
use crate::services::geometry::{angle_at, midpoint, percent_of_range, segment_angle};
use crate::services::statistics::{consistency_score, mean_interval, mean_or, round_to};

/// Knee angle below which the athlete is in the bottom of the squat
const DOWN_KNEE_ANGLE: f64 = 120.0;
/// Knee angle above which the athlete is standing
const UP_KNEE_ANGLE: f64 = 160.0;
const CONSISTENCY_FACTOR: f64 = 2.0;

const BACK_WEIGHT: f64 = 0.4;
const DEPTH_WEIGHT: f64 = 0.4;
const ALIGNMENT_WEIGHT: f64 = 0.2;

/// Squat analyzer driven by the mean hip-knee-ankle angle
#[derive(Debug, Clone, Default)]
pub struct SquatAnalyzer {
    counter: RepCounter,
    depths: Vec<f64>,
    form_scores: Vec<f64>,
}

impl SquatAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    fn knee_angle(frame: &LandmarkFrame) -> f64 {
        let left = angle_at(
            &frame.get(BodyLandmark::LeftHip),
            &frame.get(BodyLandmark::LeftKnee),
            &frame.get(BodyLandmark::LeftAnkle),
        );
        let right = angle_at(
            &frame.get(BodyLandmark::RightHip),
            &frame.get(BodyLandmark::RightKnee),
            &frame.get(BodyLandmark::RightAnkle),
        );
        (left + right) / 2.0
    }

    /// Weighted form score: upright back, depth reached, knees over ankles
    fn form_score(frame: &LandmarkFrame, knee_angle: f64) -> f64 {
        let shoulders = midpoint(
            &frame.get(BodyLandmark::LeftShoulder),
            &frame.get(BodyLandmark::RightShoulder),
        );
        let hips = midpoint(
            &frame.get(BodyLandmark::LeftHip),
            &frame.get(BodyLandmark::RightHip),
        );
        let back_angle = segment_angle(&hips, &shoulders).abs();
        let back_score = (100.0 - (90.0 - back_angle).abs()).clamp(0.0, 100.0);

        let depth_score = if knee_angle < DOWN_KNEE_ANGLE {
            100.0
        } else {
            (100.0 - (knee_angle - DOWN_KNEE_ANGLE) * 2.0).clamp(0.0, 100.0)
        };

        let knees_x = (frame.get(BodyLandmark::LeftKnee).x + frame.get(BodyLandmark::RightKnee).x) / 2.0;
        let ankles_x =
            (frame.get(BodyLandmark::LeftAnkle).x + frame.get(BodyLandmark::RightAnkle).x) / 2.0;
        let alignment_score = (100.0 - (knees_x - ankles_x).abs() * 1000.0).clamp(0.0, 100.0);

        back_score * BACK_WEIGHT + depth_score * DEPTH_WEIGHT + alignment_score * ALIGNMENT_WEIGHT
    }
}

impl MovementAnalyzer for SquatAnalyzer {
    fn exercise_type(&self) -> ExerciseType {
        ExerciseType::Squats
    }

    fn analyze(&mut self, timestamp: f64, frame: &LandmarkFrame) -> FrameMetrics {
        let knee_angle = Self::knee_angle(frame);
        let depth = percent_of_range(180.0 - knee_angle, 0.0, 90.0);
        let is_down = knee_angle < DOWN_KNEE_ANGLE;
        let is_up = knee_angle > UP_KNEE_ANGLE;

        if self.counter.update(is_down, is_up, timestamp) {
            tracing::debug!("Squat rep {} at {:.2}s", self.counter.count(), timestamp);
        }

        let form = Self::form_score(frame, knee_angle);
        if is_down {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::analyzers::test_support::{bend_knees, standing_pose};

    fn run(analyzer: &mut SquatAnalyzer, angles: &[f64]) -> Vec<FrameMetrics> {
        let mut pose = standing_pose();
        angles
            .iter()
            .enumerate()
            .map(|(i, angle)| {
                bend_knees(&mut pose, *angle);
                analyzer.analyze_frame(i as f64 * 0.1, Some(&pose))
            })
            .collect()
    }

    #[test]
    fn test_single_cycle_counts_one_rep() {
        let mut analyzer = SquatAnalyzer::new();
        let angles: Vec<f64> = (0..=8)
            .map(|i| 180.0 - i as f64 * 10.0)
            .chain((0..=8).map(|i| 100.0 + i as f64 * 10.0))
            .collect();
        let frames = run(&mut analyzer, &angles);

        assert_eq!(frames.last().unwrap().rep_count, 1);
        assert_eq!(analyzer.rep_count(), 1);
        assert!(frames.iter().any(|f| f.phase == Phase::Down));
    }

    #[test]
    fn test_dead_band_oscillation_does_not_count() {
        let mut analyzer = SquatAnalyzer::new();
        let frames = run(&mut analyzer, &[140.0, 125.0, 155.0, 130.0, 150.0, 140.0]);
        assert!(frames.iter().all(|f| f.rep_count == 0));
        assert!(frames.iter().all(|f| f.phase == Phase::Transition));
        assert!(frames.iter().all(|f| !f.form_recorded));
    }

    #[test]
    fn test_holding_bottom_counts_once() {
        let mut analyzer = SquatAnalyzer::new();
        run(&mut analyzer, &[180.0, 100.0, 100.0, 100.0, 100.0, 170.0, 170.0, 175.0]);
        assert_eq!(analyzer.rep_count(), 1);
    }

    #[test]
    fn test_depth_mapping() {
        let mut analyzer = SquatAnalyzer::new();
        let frames = run(&mut analyzer, &[180.0, 135.0, 90.0, 60.0]);
        assert_eq!(frames[0].depth(), Some(0.0));
        assert_eq!(frames[1].depth(), Some(50.0));
        assert_eq!(frames[2].depth(), Some(100.0));
        assert_eq!(frames[3].depth(), Some(100.0));
    }

    #[test]
    fn test_depth_recorded_only_while_down() {
        let mut analyzer = SquatAnalyzer::new();
        let frames = run(&mut analyzer, &[180.0, 140.0, 110.0, 100.0, 170.0]);
        let recorded: Vec<bool> = frames.iter().map(|f| f.form_recorded).collect();
        assert_eq!(recorded, vec![false, false, true, true, false]);

        let detailed = analyzer.detailed_metrics();
        match detailed.extra {
            DetailedExtra::Repetition { average_depth, .. } => {
                // depths 78 and 89 -> mean 83
                assert_eq!(average_depth, 83.0);
            }
            other => panic!("unexpected extra: {:?}", other),
        }
    }

    #[test]
    fn test_detailed_metrics_defaults_when_empty() {
        let analyzer = SquatAnalyzer::new();
        let detailed = analyzer.detailed_metrics();
        assert_eq!(detailed.total_reps, 0);
        assert_eq!(detailed.form_score, 100.0);
        assert_eq!(detailed.consistency, 100.0);
        assert_eq!(detailed.average_rep_time, 0.0);
    }

    #[test]
    fn test_average_rep_time_between_reps() {
        let mut analyzer = SquatAnalyzer::new();
        // reps complete at frame 2 (0.2s) and frame 6 (0.6s)
        run(&mut analyzer, &[100.0, 150.0, 170.0, 100.0, 100.0, 150.0, 170.0]);
        assert_eq!(analyzer.rep_count(), 2);
        assert_eq!(analyzer.detailed_metrics().average_rep_time, 0.4);
    }

    #[test]
    fn test_reset_equals_fresh_instance() {
        let mut analyzer = SquatAnalyzer::new();
        run(&mut analyzer, &[180.0, 100.0, 180.0]);
        analyzer.reset();
        assert_eq!(analyzer.detailed_metrics(), SquatAnalyzer::new().detailed_metrics());

        let mut fresh = SquatAnalyzer::new();
        let a = run(&mut analyzer, &[180.0, 100.0, 180.0]);
        let b = run(&mut fresh, &[180.0, 100.0, 180.0]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_lost_tracking_keeps_count() {
        let mut analyzer = SquatAnalyzer::new();
        run(&mut analyzer, &[180.0, 100.0, 180.0]);
        let lost = analyzer.analyze_frame(0.5, None);
        assert_eq!(lost.rep_count, 1);
        assert!(!lost.tracking);
        assert_eq!(lost.depth(), Some(0.0));
    }
}
