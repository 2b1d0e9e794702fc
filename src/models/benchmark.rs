use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl std::str::FromStr for Gender {
    type Err = crate::error::EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            other => Err(crate::error::EngineError::InvalidInput(format!(
                "unknown gender: {}",
                other
            ))),
        }
    }
}

/// Athlete attributes used for benchmark lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AthleteProfile {
    pub age: u32,
    pub gender: Gender,
    /// Height in cm
    pub height: Option<f64>,
    /// Weight in kg
    pub weight: Option<f64>,
}

impl AthleteProfile {
    pub fn new(age: u32, gender: Gender) -> Self {
        Self {
            age,
            gender,
            height: None,
            weight: None,
        }
    }
}

/// Rep thresholds for one age band and gender
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkBand {
    pub age_min: u32,
    pub age_max: u32,
    pub gender: Gender,
    pub excellent: u32,
    pub good: u32,
    pub average: u32,
    pub below_average: u32,
}

/// Result of comparing a rep count against the benchmarks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub grade: String,
    pub percentile: u32,
    pub category: String,
    pub recommendation: String,
}
