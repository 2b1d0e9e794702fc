use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use motion_engine::models::{AnalysisResult, DetailedMetrics, ExerciseSummary};
use motion_engine::services::AnalysisOutcome;
use serde::Serialize;
use std::path::PathBuf;

/// Where and how an analysis result is reported
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Write the JSON result to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print a human-readable summary instead of JSON
    #[arg(long)]
    pub summary: bool,

    /// Include the analyzer's detailed metrics in the JSON output
    #[arg(long)]
    pub detailed: bool,
}

#[derive(Serialize)]
struct DetailedReport<'a> {
    #[serde(flatten)]
    result: &'a AnalysisResult,
    detailed: &'a DetailedMetrics,
}

pub(crate) fn render_json(outcome: &AnalysisOutcome, detailed: bool, pretty: bool) -> Result<String> {
    let json = match (detailed, pretty) {
        (true, true) => serde_json::to_string_pretty(&DetailedReport {
            result: &outcome.result,
            detailed: &outcome.detailed,
        }),
        (true, false) => serde_json::to_string(&DetailedReport {
            result: &outcome.result,
            detailed: &outcome.detailed,
        }),
        (false, true) => serde_json::to_string_pretty(&outcome.result),
        (false, false) => serde_json::to_string(&outcome.result),
    };
    json.context("Failed to serialize analysis result")
}

/// Report an outcome: JSON to a file or stdout, or a summary
pub(crate) fn emit(outcome: &AnalysisOutcome, args: &OutputArgs, pretty: bool) -> Result<()> {
    if let Some(path) = &args.output {
        let json = render_json(outcome, args.detailed, pretty)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write result to {:?}", path))?;
        print_summary(outcome);
        println!();
        println!("✓ Result written to: {}", path.display());
    } else if args.summary {
        print_summary(outcome);
    } else {
        println!("{}", render_json(outcome, args.detailed, pretty)?);
    }
    Ok(())
}

fn colored_score(score: f64) -> colored::ColoredString {
    let text = format!("{:.0}", score);
    if score >= 80.0 {
        text.green().bold()
    } else if score >= 60.0 {
        text.yellow().bold()
    } else {
        text.red().bold()
    }
}

pub(crate) fn print_summary(outcome: &AnalysisOutcome) {
    let result = &outcome.result;

    println!("{}", "Analysis Summary".bold());
    println!("────────────────────────────────");
    println!("Exercise:      {}", result.exercise_type());
    println!("Reps:          {}", result.total_reps.to_string().cyan().bold());
    println!("Form score:    {}", colored_score(result.form_score));
    println!("Consistency:   {}", colored_score(outcome.detailed.consistency));
    println!("Duration:      {}s", result.duration);

    match &result.summary {
        ExerciseSummary::Squats { average_depth }
        | ExerciseSummary::Pushups { average_depth }
        | ExerciseSummary::Situps { average_depth } => {
            println!("Average depth: {}%", average_depth);
        }
        ExerciseSummary::VerticalJumps {
            max_height,
            average_height,
            hang_time,
        } => {
            println!("Max height:    {}", max_height);
            println!("Avg height:    {}", average_height);
            println!("Hang time:     {}s", hang_time);
        }
        ExerciseSummary::ShuttleRun {
            average_speed,
            total_distance,
        } => {
            println!("Avg speed:     {}", average_speed);
            println!("Distance:      {}", total_distance);
        }
        ExerciseSummary::EnduranceRuns {
            average_pace,
            cadence,
            stride_length,
            total_distance,
        } => {
            println!("Pace:          {} steps/min", average_pace);
            println!("Cadence:       {} steps/min", cadence);
            println!("Stride:        {}", stride_length);
            println!("Distance:      {}", total_distance);
        }
    }

    let face = &result.face_verification;
    let verdict = if face.detected {
        "verified".green()
    } else {
        "not verified".red()
    };
    let simulated = if face.simulated { " (simulated)" } else { "" };
    println!(
        "Face:          {} ({}% over {} frames){}",
        verdict, face.confidence, face.continuous_frames, simulated
    );
}
