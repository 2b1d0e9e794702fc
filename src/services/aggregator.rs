//! Result aggregation
//!
//! Reduces a session's per-frame records into the final `AnalysisResult`.
//! Pure: the same entries always produce the same result, and empty input
//! produces an all-zero result with a neutral form score of 100.

use crate::models::analysis_result::{AnalysisResult, ExerciseSummary, FaceVerificationSummary};
use crate::models::metrics::{ExerciseType, FrameDetail};
use crate::models::session::{SessionEntry, SessionRecord};
use crate::services::statistics::{mean, mean_or, round_to};

/// Default share of frames that must contain a face
pub const DEFAULT_FACE_PRESENCE_RATIO: f64 = 0.3;

/// Resolution used to compare the face presence ratio in integers
const RATIO_SCALE: u64 = 1000;

#[derive(Debug, Clone)]
pub struct ResultAggregator {
    /// Presence ratio in thousandths
    presence_ratio_milli: u64,
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_FACE_PRESENCE_RATIO)
    }
}

impl ResultAggregator {
    pub fn new(face_presence_ratio: f64) -> Self {
        let milli = (face_presence_ratio.clamp(0.0, 1.0) * RATIO_SCALE as f64).round() as u64;
        Self {
            presence_ratio_milli: milli,
        }
    }

    /// Aggregate a recorded session, carrying its identity into the result
    ///
    /// `analyzed_at` is the time the pass started, taken from the record.
    pub fn aggregate_session(&self, record: &SessionRecord, duration: f64) -> AnalysisResult {
        let mut result = self.aggregate(record.exercise_type, record.entries(), duration);
        result.session_id = Some(record.session_id);
        result.analyzed_at = Some(record.started_at);
        result
    }

    /// Aggregate timestamp-ordered entries for one exercise
    pub fn aggregate(
        &self,
        exercise: ExerciseType,
        entries: &[SessionEntry],
        duration: f64,
    ) -> AnalysisResult {
        let total_reps = entries
            .iter()
            .map(|e| e.metrics.rep_count)
            .max()
            .unwrap_or(0);

        let form_scores: Vec<f64> = entries
            .iter()
            .filter(|e| e.metrics.form_recorded)
            .map(|e| e.metrics.form_score)
            .collect();

        AnalysisResult {
            session_id: None,
            analyzed_at: None,
            total_reps,
            form_score: mean_or(&form_scores, 100.0).round(),
            duration: if duration.is_finite() {
                duration.max(0.0).round()
            } else {
                0.0
            },
            face_verification: self.summarize_face(entries),
            timestamps: entries.iter().map(|e| e.timestamp).collect(),
            summary: summarize_exercise(exercise, entries, total_reps),
        }
    }

    /// Face presence over the whole session
    pub fn summarize_face(&self, entries: &[SessionEntry]) -> FaceVerificationSummary {
        let detected: Vec<f64> = entries
            .iter()
            .filter(|e| e.face.detected)
            .map(|e| e.face.confidence)
            .collect();

        let detected_count = detected.len() as u64;
        let total = entries.len() as u64;

        FaceVerificationSummary {
            detected: total > 0 && detected_count * RATIO_SCALE > total * self.presence_ratio_milli,
            confidence: mean(&detected).map(|c| (c * 100.0).round()).unwrap_or(0.0),
            continuous_frames: detected.len() as u32,
            simulated: entries.iter().any(|e| e.face.is_simulated()),
        }
    }
}

fn summarize_exercise(
    exercise: ExerciseType,
    entries: &[SessionEntry],
    total_reps: u32,
) -> ExerciseSummary {
    let details = entries.iter().map(|e| &e.metrics.detail);

    match exercise {
        ExerciseType::Squats | ExerciseType::Pushups | ExerciseType::Situps => {
            let depths: Vec<f64> = details
                .filter_map(|d| match d {
                    FrameDetail::Repetition {
                        depth,
                        recorded: true,
                    } => Some(*depth),
                    _ => None,
                })
                .collect();
            let average_depth = mean_or(&depths, 0.0).round();
            match exercise {
                ExerciseType::Squats => ExerciseSummary::Squats { average_depth },
                ExerciseType::Pushups => ExerciseSummary::Pushups { average_depth },
                _ => ExerciseSummary::Situps { average_depth },
            }
        }
        ExerciseType::VerticalJumps => {
            let mut heights = Vec::new();
            let mut hang_times = Vec::new();
            for detail in details {
                if let FrameDetail::VerticalJump {
                    current_height,
                    airborne,
                    landed_hang_time,
                    ..
                } = detail
                {
                    if *airborne {
                        heights.push(*current_height);
                    }
                    if let Some(hang) = landed_hang_time {
                        hang_times.push(*hang);
                    }
                }
            }
            ExerciseSummary::VerticalJumps {
                max_height: heights.iter().copied().fold(0.0, f64::max).round(),
                average_height: mean_or(&heights, 0.0).round(),
                hang_time: round_to(mean_or(&hang_times, 0.0), 2),
            }
        }
        ExerciseType::ShuttleRun => {
            let mut speeds = Vec::new();
            let mut total_distance = 0.0;
            for detail in details {
                if let FrameDetail::ShuttleRun {
                    speed,
                    distance,
                    speed_measured,
                    ..
                } = detail
                {
                    if *speed_measured {
                        speeds.push(*speed);
                    }
                    total_distance += distance;
                }
            }
            ExerciseSummary::ShuttleRun {
                average_speed: round_to(mean_or(&speeds, 0.0), 3),
                total_distance: round_to(total_distance, 2),
            }
        }
        ExerciseType::EnduranceRuns => {
            let mut strides = Vec::new();
            let mut paces = Vec::new();
            let mut cadences = Vec::new();
            for detail in details {
                if let FrameDetail::EnduranceRun {
                    stride,
                    pace,
                    cadence,
                    step_recorded: true,
                } = detail
                {
                    strides.push(*stride);
                    if *pace > 0.0 {
                        paces.push(*pace);
                    }
                    if *cadence > 0.0 {
                        cadences.push(*cadence);
                    }
                }
            }
            let stride_length = round_to(mean_or(&strides, 0.0), 3);
            ExerciseSummary::EnduranceRuns {
                average_pace: mean_or(&paces, 0.0).round(),
                cadence: mean_or(&cadences, 0.0).round(),
                stride_length,
                total_distance: round_to(f64::from(total_reps) * stride_length * 2.0, 2),
            }
        }
    }
}
