//! Frame Orchestrator
//!
//! Drives one analysis pass over a video:
//! - samples the timeline at a fixed rate
//! - pulls each frame from a [`FrameSource`] and its landmarks from a [`PoseEstimator`]
//! - feeds the landmarks to the exercise analyzer and the frame to the face verifier
//! - appends one session entry per sampled position, in timestamp order
//! - aggregates the record into the final [`AnalysisResult`]
//!
//! Any decode failure aborts the pass. A frame without a detected person is
//! still recorded through the analyzer's lost-tracking path.

use std::future::Future;

use image::DynamicImage;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::models::analysis_result::AnalysisResult;
use crate::models::landmark::Landmark;
use crate::models::metrics::{DetailedMetrics, ExerciseType};
use crate::models::session::SessionRecord;
use crate::services::aggregator::ResultAggregator;
use crate::services::analyzers::{ExerciseAnalyzer, MovementAnalyzer};
use crate::services::face_verifier::FaceVerifier;

/// Source of decoded video frames
pub trait FrameSource {
    /// Video length in seconds
    fn duration(&mut self) -> impl Future<Output = Result<f64>> + Send;

    /// Decode the frame shown at `timestamp` seconds
    fn frame_at(&mut self, timestamp: f64) -> impl Future<Output = Result<DynamicImage>> + Send;
}

/// External pose estimator producing 33 landmarks per frame
pub trait PoseEstimator {
    /// `Ok(None)` means no person was found in the frame
    fn estimate(
        &mut self,
        timestamp: f64,
        frame: &DynamicImage,
    ) -> impl Future<Output = Result<Option<Vec<Landmark>>>> + Send;
}

/// Progress of a sampling pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleProgress {
    /// Zero-based index of the sample just processed
    pub index: usize,
    pub total: usize,
    pub timestamp: f64,
}

pub type ProgressCallback = Box<dyn FnMut(SampleProgress) + Send>;

/// Everything produced by one analysis pass
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub record: SessionRecord,
    pub result: AnalysisResult,
    pub detailed: DetailedMetrics,
}

/// Sample positions for a video: `floor(duration * rate)` evenly spaced
/// timestamps starting at zero
pub fn sample_timestamps(duration: f64, sample_rate_hz: f64) -> Vec<f64> {
    if !(duration.is_finite() && duration > 0.0 && sample_rate_hz > 0.0) {
        return Vec::new();
    }
    let total = (duration * sample_rate_hz).floor() as usize;
    if total == 0 {
        return Vec::new();
    }
    let interval = duration / total as f64;
    (0..total).map(|i| i as f64 * interval).collect()
}

pub struct FrameOrchestrator<S, P> {
    source: S,
    estimator: P,
    config: EngineConfig,
    verifier: FaceVerifier,
    progress: Option<ProgressCallback>,
}

impl<S: FrameSource, P: PoseEstimator> FrameOrchestrator<S, P> {
    pub fn new(source: S, estimator: P, config: EngineConfig) -> Self {
        let verifier = FaceVerifier::new(config.face.clone());
        Self {
            source,
            estimator,
            config,
            verifier,
            progress: None,
        }
    }

    /// Enroll the reference face; an unusable image leaves the verifier disabled
    pub fn with_reference(mut self, reference: &[u8]) -> Self {
        if !self.verifier.initialize(reference) {
            tracing::warn!("Continuing with simulated face verification");
        }
        self
    }

    /// Enroll the reference face from a data URL
    pub fn with_reference_data_url(mut self, data_url: &str) -> Self {
        if !self.verifier.initialize_from_data_url(data_url) {
            tracing::warn!("Continuing with simulated face verification");
        }
        self
    }

    pub fn with_progress(mut self, callback: impl FnMut(SampleProgress) + Send + 'static) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    pub fn verifier(&self) -> &FaceVerifier {
        &self.verifier
    }

    /// Run a full analysis pass for one exercise
    pub async fn run(&mut self, exercise: ExerciseType) -> Result<AnalysisOutcome> {
        self.config.validate()?;

        let duration = self.source.duration().await?;
        if !(duration.is_finite() && duration >= 0.0) {
            return Err(EngineError::VideoProbe(format!(
                "invalid video duration: {}",
                duration
            )));
        }

        let timestamps = sample_timestamps(duration, self.config.sample_rate_hz);
        let total = timestamps.len();
        tracing::info!(
            "Analyzing {} over {:.2}s of video ({} samples at {} Hz)",
            exercise,
            duration,
            total,
            self.config.sample_rate_hz
        );

        self.verifier.reset_session();
        let mut analyzer = ExerciseAnalyzer::new(exercise);
        let mut record = SessionRecord::new(exercise, self.config.sample_rate_hz);

        for (index, timestamp) in timestamps.into_iter().enumerate() {
            let frame = self.source.frame_at(timestamp).await?;
            let landmarks = self.estimator.estimate(timestamp, &frame).await?;

            let metrics = analyzer.analyze_frame(timestamp, landmarks.as_deref());
            let face = self.verifier.verify_frame(&frame);
            record.push(timestamp, metrics, face)?;

            if let Some(progress) = self.progress.as_mut() {
                progress(SampleProgress {
                    index,
                    total,
                    timestamp,
                });
            }
        }

        let result = ResultAggregator::new(self.config.face_presence_ratio)
            .aggregate_session(&record, duration);
        tracing::info!(
            "Analysis complete: {} reps, form {}, face detected {}",
            result.total_reps,
            result.form_score,
            result.face_verification.detected
        );

        Ok(AnalysisOutcome {
            detailed: analyzer.detailed_metrics(),
            record,
            result,
        })
    }
}

/// Re-score a recorded landmark track without video
///
/// The face verifier runs in its disabled mode, so every face result is
/// marked simulated.
pub fn replay<I>(exercise: ExerciseType, frames: I, config: &EngineConfig) -> Result<AnalysisOutcome>
where
    I: IntoIterator<Item = (f64, Option<Vec<Landmark>>)>,
{
    let mut analyzer = ExerciseAnalyzer::new(exercise);
    let mut verifier = FaceVerifier::new(config.face.clone());
    let mut record = SessionRecord::new(exercise, config.sample_rate_hz);

    for (timestamp, landmarks) in frames {
        let metrics = analyzer.analyze_frame(timestamp, landmarks.as_deref());
        let face = verifier.verify_absent_frame();
        record.push(timestamp, metrics, face)?;
    }

    let duration = record
        .entries()
        .last()
        .map(|e| e.timestamp + 1.0 / config.sample_rate_hz)
        .unwrap_or(0.0);
    tracing::info!("Replayed {} frames of {}", record.len(), exercise);

    let result =
        ResultAggregator::new(config.face_presence_ratio).aggregate_session(&record, duration);
    Ok(AnalysisOutcome {
        detailed: analyzer.detailed_metrics(),
        record,
        result,
    })
}
