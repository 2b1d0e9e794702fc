use crate::models::benchmark::{AthleteProfile, BenchmarkBand, BenchmarkResult, Gender};
use crate::services::statistics::round_to;

/// Reps that earn the full volume component of the composite score
const COMPOSITE_FULL_REPS: f64 = 50.0;

/// Compares rep counts against age and gender benchmarks
#[derive(Debug, Clone)]
pub struct BenchmarkService {
    bands: Vec<BenchmarkBand>,
}

impl Default for BenchmarkService {
    fn default() -> Self {
        Self::new()
    }
}

impl BenchmarkService {
    /// Create a service with the standard benchmark table
    pub fn new() -> Self {
        let band = |age_min, age_max, gender, [excellent, good, average, below_average]: [u32; 4]| {
            BenchmarkBand {
                age_min,
                age_max,
                gender,
                excellent,
                good,
                average,
                below_average,
            }
        };

        Self {
            bands: vec![
                band(13, 15, Gender::Male, [30, 25, 20, 15]),
                band(16, 18, Gender::Male, [35, 30, 25, 20]),
                band(19, 25, Gender::Male, [40, 35, 30, 25]),
                band(26, 35, Gender::Male, [35, 30, 25, 20]),
                band(13, 15, Gender::Female, [25, 20, 16, 12]),
                band(16, 18, Gender::Female, [30, 25, 20, 16]),
                band(19, 25, Gender::Female, [35, 30, 25, 20]),
                band(26, 35, Gender::Female, [30, 25, 20, 16]),
            ],
        }
    }

    /// Create a service with a custom benchmark table
    pub fn with_bands(bands: Vec<BenchmarkBand>) -> Self {
        Self { bands }
    }

    pub fn bands(&self) -> &[BenchmarkBand] {
        &self.bands
    }

    fn find_band(&self, age: u32, gender: Gender) -> Option<&BenchmarkBand> {
        self.bands
            .iter()
            .find(|b| b.gender == gender && age >= b.age_min && age <= b.age_max)
    }

    /// Grade a rep count for an athlete
    pub fn compare(&self, reps: u32, profile: &AthleteProfile) -> BenchmarkResult {
        let Some(band) = self.find_band(profile.age, profile.gender) else {
            tracing::debug!("No benchmark for age {} {:?}", profile.age, profile.gender);
            return BenchmarkResult {
                grade: "N/A".to_string(),
                percentile: 50,
                category: "No benchmark available".to_string(),
                recommendation: "Keep practicing!".to_string(),
            };
        };

        // Fraction of the way from `low` to `high`
        let progress = |low: u32, high: u32| -> f64 {
            if high > low {
                f64::from(reps - low) / f64::from(high - low)
            } else {
                0.0
            }
        };

        let (grade, percentile, category, recommendation) = if reps >= band.excellent {
            (
                "A+",
                90 + ((reps - band.excellent) / 2).min(10),
                "Excellent",
                "Outstanding performance! You're in the top tier for your age group.",
            )
        } else if reps >= band.good {
            (
                "B+",
                70 + (progress(band.good, band.excellent) * 20.0).floor() as u32,
                "Good",
                "Great job! You're performing above average for your age group.",
            )
        } else if reps >= band.average {
            (
                "B",
                40 + (progress(band.average, band.good) * 30.0).floor() as u32,
                "Average",
                "Solid performance! With consistent training, you can reach the next level.",
            )
        } else if reps >= band.below_average {
            (
                "C+",
                20 + (progress(band.below_average, band.average) * 20.0).floor() as u32,
                "Below Average",
                "Keep working! Focus on proper form and gradual improvement.",
            )
        } else {
            let share = if band.below_average > 0 {
                f64::from(reps) / f64::from(band.below_average)
            } else {
                0.0
            };
            (
                "C",
                ((share * 20.0).floor() as u32).max(5),
                "Needs Improvement",
                "Don't give up! Every rep counts towards building your strength.",
            )
        };

        BenchmarkResult {
            grade: grade.to_string(),
            percentile,
            category: category.to_string(),
            recommendation: recommendation.to_string(),
        }
    }
}

/// Age band label used in reports
pub fn age_band(age: u32) -> &'static str {
    match age {
        0..=15 => "13-15",
        16..=18 => "16-18",
        19..=25 => "19-25",
        26..=35 => "26-35",
        _ => "36+",
    }
}

/// Single 0-100 performance score blending volume, form, consistency and depth
pub fn composite_score(reps: u32, form_score: f64, consistency: f64, depth: f64) -> f64 {
    let volume = (f64::from(reps) / COMPOSITE_FULL_REPS * 100.0).min(100.0);
    round_to(
        volume * 0.4 + form_score * 0.3 + consistency * 0.2 + depth * 0.1,
        1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn male(age: u32) -> AthleteProfile {
        AthleteProfile::new(age, Gender::Male)
    }

    #[test]
    fn test_grades_for_male_19_25() {
        let service = BenchmarkService::new();
        let profile = male(22);

        let excellent = service.compare(46, &profile);
        assert_eq!(excellent.grade, "A+");
        assert_eq!(excellent.percentile, 93);

        let good = service.compare(37, &profile);
        assert_eq!(good.grade, "B+");
        assert_eq!(good.percentile, 78);

        let average = service.compare(30, &profile);
        assert_eq!(average.grade, "B");
        assert_eq!(average.percentile, 40);

        let below = service.compare(27, &profile);
        assert_eq!(below.grade, "C+");
        assert_eq!(below.percentile, 28);
        assert_eq!(below.category, "Below Average");

        let poor = service.compare(10, &profile);
        assert_eq!(poor.grade, "C");
        assert_eq!(poor.percentile, 8);

        assert_eq!(service.compare(0, &profile).percentile, 5);
    }

    #[test]
    fn test_percentile_caps_at_100() {
        let service = BenchmarkService::new();
        assert_eq!(service.compare(200, &male(20)).percentile, 100);
    }

    #[test]
    fn test_female_band() {
        let service = BenchmarkService::new();
        let result = service.compare(25, &AthleteProfile::new(14, Gender::Female));
        assert_eq!(result.grade, "A+");
    }

    #[test]
    fn test_missing_band() {
        let service = BenchmarkService::new();
        let result = service.compare(30, &male(50));
        assert_eq!(result.grade, "N/A");
        assert_eq!(result.percentile, 50);
    }

    #[test]
    fn test_age_band_labels() {
        assert_eq!(age_band(14), "13-15");
        assert_eq!(age_band(18), "16-18");
        assert_eq!(age_band(25), "19-25");
        assert_eq!(age_band(30), "26-35");
        assert_eq!(age_band(40), "36+");
    }

    #[test]
    fn test_composite_score() {
        assert_eq!(composite_score(50, 100.0, 100.0, 100.0), 100.0);
        assert_eq!(composite_score(100, 100.0, 100.0, 100.0), 100.0);
        // 0.4 * 50 + 0.3 * 80 + 0.2 * 90 + 0.1 * 70
        assert_eq!(composite_score(25, 80.0, 90.0, 70.0), 69.0);
    }
}
