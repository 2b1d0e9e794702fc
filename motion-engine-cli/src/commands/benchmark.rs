use anyhow::Result;
use clap::Args;
use colored::Colorize;
use motion_engine::models::{AthleteProfile, Gender};
use motion_engine::services::benchmark_service::{age_band, composite_score};
use motion_engine::services::BenchmarkService;

#[derive(Args)]
pub struct BenchmarkCommand {
    /// Repetitions completed
    #[arg(short, long)]
    reps: u32,

    /// Athlete age in years
    #[arg(short, long)]
    age: u32,

    /// Athlete gender (male or female)
    #[arg(short, long, value_parser = parse_gender)]
    gender: Gender,

    /// Form score (0-100); enables the composite score
    #[arg(long)]
    form: Option<f64>,

    /// Consistency score (0-100) for the composite score
    #[arg(long, default_value = "100")]
    consistency: f64,

    /// Average depth (0-100) for the composite score
    #[arg(long, default_value = "0")]
    depth: f64,
}

fn parse_gender(value: &str) -> std::result::Result<Gender, String> {
    value.parse::<Gender>().map_err(|e| e.to_string())
}

impl BenchmarkCommand {
    pub fn execute(self) -> Result<()> {
        let profile = AthleteProfile::new(self.age, self.gender);
        let result = BenchmarkService::new().compare(self.reps, &profile);

        println!("{}", "Benchmark Comparison".bold());
        println!("────────────────────────────────");
        println!("Age band:      {} ({:?})", age_band(self.age), self.gender);
        println!("Reps:          {}", self.reps);
        println!("Grade:         {}", result.grade.cyan().bold());
        println!("Percentile:    {}", result.percentile);
        println!("Category:      {}", result.category);

        if let Some(form) = self.form {
            let score = composite_score(self.reps, form, self.consistency, self.depth);
            println!("Composite:     {}", score);
        }

        println!();
        println!("{}", result.recommendation);

        Ok(())
    }
}
