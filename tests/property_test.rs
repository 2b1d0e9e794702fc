mod common;

use proptest::prelude::*;

use motion_engine::models::{ExerciseType, Landmark};
use motion_engine::services::geometry::{angle_at, percent_of_range};
use motion_engine::services::statistics::consistency_score;
use motion_engine::services::{ExerciseAnalyzer, MovementAnalyzer};

use common::squat_pose;

/// One synthetic frame: knee angle, vertical shift, horizontal shift, visible
fn frame_strategy() -> impl Strategy<Value = (f64, f64, f64, bool)> {
    (40.0f64..180.0, -0.2f64..0.2, -0.3f64..0.3, prop::bool::weighted(0.85))
}

fn build_frame(angle: f64, rise: f64, shift: f64) -> Vec<Landmark> {
    squat_pose(angle)
        .into_iter()
        .map(|lm| Landmark::new(lm.x + shift, lm.y - rise))
        .collect()
}

proptest! {
    #[test]
    fn rep_count_never_decreases(frames in prop::collection::vec(frame_strategy(), 1..120)) {
        for exercise in ExerciseType::all() {
            let mut analyzer = ExerciseAnalyzer::new(exercise);
            let mut previous = 0;
            for (i, (angle, rise, shift, visible)) in frames.iter().enumerate() {
                let landmarks = build_frame(*angle, *rise, *shift);
                let metrics = analyzer.analyze_frame(
                    i as f64 * 0.1,
                    visible.then_some(landmarks.as_slice()),
                );
                prop_assert!(metrics.rep_count >= previous, "{} went backwards", exercise);
                prop_assert!((0.0..=100.0).contains(&metrics.form_score));
                previous = metrics.rep_count;
            }
            prop_assert_eq!(analyzer.rep_count(), previous);

            let detailed = analyzer.detailed_metrics();
            prop_assert!((0.0..=100.0).contains(&detailed.consistency));
            prop_assert!((0.0..=100.0).contains(&detailed.form_score));
        }
    }

    #[test]
    fn angle_always_within_half_turn(
        ax in -2.0f64..2.0, ay in -2.0f64..2.0,
        bx in -2.0f64..2.0, by in -2.0f64..2.0,
        cx in -2.0f64..2.0, cy in -2.0f64..2.0,
    ) {
        let angle = angle_at(
            &Landmark::new(ax, ay),
            &Landmark::new(bx, by),
            &Landmark::new(cx, cy),
        );
        prop_assert!(angle.is_finite());
        prop_assert!((0.0..=180.0).contains(&angle));
    }

    #[test]
    fn percent_of_range_is_clamped(value in -1000.0f64..1000.0) {
        let percent = percent_of_range(value, 0.0, 90.0);
        prop_assert!((0.0..=100.0).contains(&percent));
    }

    #[test]
    fn consistency_is_a_score(values in prop::collection::vec(-500.0f64..500.0, 0..50), k in 0.0f64..200.0) {
        let score = consistency_score(&values, k);
        prop_assert!((0.0..=100.0).contains(&score));
    }
}
