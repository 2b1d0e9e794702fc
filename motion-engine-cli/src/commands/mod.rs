mod analyze;
mod benchmark;
mod config_cmd;
mod output;
mod replay;

use anyhow::Result;
use clap::{Parser, Subcommand};
use motion_engine::models::ExerciseType;

pub use analyze::AnalyzeCommand;
pub use benchmark::BenchmarkCommand;
pub use output::OutputArgs;
pub use replay::ReplayCommand;

#[derive(Parser)]
#[command(name = "motion-engine")]
#[command(about = "Exercise video analysis: rep counting, form scoring and face verification", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "MOTION_ENGINE_CONFIG")]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze an exercise video against its landmark track
    Analyze(AnalyzeCommand),

    /// Re-score a recorded landmark track without video
    Replay(ReplayCommand),

    /// Grade a rep count against age and gender benchmarks
    Benchmark(BenchmarkCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigSubcommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Show current configuration
    Show,

    /// Initialize configuration with defaults
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        if self.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        let config_path = self.config.as_deref().map(std::path::Path::new);

        match self.command {
            Commands::Analyze(cmd) => cmd.execute(config_path).await,
            Commands::Replay(cmd) => cmd.execute(config_path),
            Commands::Benchmark(cmd) => cmd.execute(),
            Commands::Config(subcmd) => match subcmd {
                ConfigSubcommands::Show => config_cmd::show_config(config_path),
                ConfigSubcommands::Init { force } => config_cmd::init_config(config_path, force),
            },
            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

/// clap value parser accepting the exercise names and their aliases
pub(crate) fn parse_exercise(value: &str) -> std::result::Result<ExerciseType, String> {
    value.parse::<ExerciseType>().map_err(|e| e.to_string())
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
