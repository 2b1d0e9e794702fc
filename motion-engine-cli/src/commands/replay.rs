use anyhow::{Context, Result};
use clap::Args;
use motion_engine::models::ExerciseType;
use motion_engine::services::{replay, RecordedPoseTrack};
use std::path::{Path, PathBuf};

use super::output::{self, OutputArgs};
use super::parse_exercise;
use crate::config::Config;

#[derive(Args)]
pub struct ReplayCommand {
    /// Exercise recorded in the track
    #[arg(short, long, value_parser = parse_exercise)]
    exercise: ExerciseType,

    /// Landmark track to re-score
    #[arg(short, long)]
    landmarks: PathBuf,

    /// Sample rate the track was recorded at (overrides config)
    #[arg(long)]
    sample_rate: Option<f64>,

    #[command(flatten)]
    output: OutputArgs,
}

impl ReplayCommand {
    pub fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let mut config = Config::load_from(config_path)?;
        if let Some(rate) = self.sample_rate {
            config.engine.sample_rate_hz = rate;
        }
        config.engine.validate()?;

        let track = RecordedPoseTrack::load(&self.landmarks, config.engine.sample_rate_hz)
            .with_context(|| format!("Failed to load landmark track {:?}", self.landmarks))?;
        if track.is_empty() {
            tracing::warn!("Landmark track {:?} has no frames", self.landmarks);
        }

        let outcome = replay(self.exercise, track.into_replay_frames(), &config.engine)?;
        output::emit(&outcome, &self.output, config.output.pretty_json)
    }
}
