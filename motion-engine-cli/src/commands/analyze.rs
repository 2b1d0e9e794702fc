use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use motion_engine::models::ExerciseType;
use motion_engine::services::{
    FrameOrchestrator, RecordedPoseTrack, SampleProgress, VideoFrameSource,
};
use std::path::{Path, PathBuf};

use super::output::{self, OutputArgs};
use super::parse_exercise;
use crate::config::Config;

#[derive(Args)]
pub struct AnalyzeCommand {
    /// Exercise performed in the video (squats, pushups, situps, vertical-jumps, shuttle-run, endurance-runs)
    #[arg(short, long, value_parser = parse_exercise)]
    exercise: ExerciseType,

    /// Video file to analyze
    #[arg(long)]
    video: PathBuf,

    /// Landmark track produced by the pose estimator for this video
    #[arg(short, long)]
    landmarks: PathBuf,

    /// Reference face image captured at enrollment
    #[arg(short, long)]
    reference: Option<PathBuf>,

    /// Frames sampled per second of video (overrides config)
    #[arg(long)]
    sample_rate: Option<f64>,

    #[command(flatten)]
    output: OutputArgs,
}

impl AnalyzeCommand {
    pub async fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let mut config = Config::load_from(config_path)?;
        if let Some(rate) = self.sample_rate {
            config.engine.sample_rate_hz = rate;
        }
        config.engine.validate()?;

        let track = RecordedPoseTrack::load(&self.landmarks, config.engine.sample_rate_hz)
            .with_context(|| format!("Failed to load landmark track {:?}", self.landmarks))?;
        let source = VideoFrameSource::from_config(self.video.clone(), &config.engine);

        let mut orchestrator = FrameOrchestrator::new(source, track, config.engine.clone());
        if let Some(reference) = &self.reference {
            let bytes = std::fs::read(reference)
                .with_context(|| format!("Failed to read reference image {:?}", reference))?;
            orchestrator = orchestrator.with_reference(&bytes);
        }

        let bar = if config.output.show_progress {
            let bar = ProgressBar::new(0);
            bar.set_style(
                ProgressStyle::with_template(
                    "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} frames {msg}",
                )?
                .progress_chars("=> "),
            );
            let handle = bar.clone();
            orchestrator = orchestrator.with_progress(move |progress: SampleProgress| {
                handle.set_length(progress.total as u64);
                handle.set_position(progress.index as u64 + 1);
                handle.set_message(format!("{:.1}s", progress.timestamp));
            });
            Some(bar)
        } else {
            None
        };

        let outcome = orchestrator.run(self.exercise).await;
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
        let outcome =
            outcome.with_context(|| format!("Analysis of {:?} failed", self.video))?;

        output::emit(&outcome, &self.output, config.output.pretty_json)
    }
}
