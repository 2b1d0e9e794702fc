//! Face similarity verifier
//!
//! Compares a centre crop of each sampled frame against a reference raster
//! captured once at enrollment. Both are reduced to small luminance rasters
//! and scored by mean absolute difference over non-dark pixels, then
//! smoothed over the recent history.
//!
//! Without a usable reference the verifier runs in an explicit disabled
//! mode: confidences come from a seeded generator and every result is tagged
//! [`VerificationMode::Simulated`] so downstream consumers can tell.
//!
//! This is raster similarity, not biometric recognition.

use std::collections::VecDeque;

use base64ct::{Base64, Encoding};
use image::{imageops::FilterType, DynamicImage};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::config::FaceVerifierConfig;
use crate::models::face::{FaceFrameResult, VerificationMode, VerifierStats};
use crate::services::statistics::{mean, mean_or, round_to};

/// Square single-channel luminance raster
#[derive(Debug, Clone, PartialEq)]
pub struct LumaRaster {
    size: u32,
    pixels: Vec<u8>,
}

impl LumaRaster {
    /// Crop a centred square covering `fraction` of the shorter side and
    /// resample it to `size` x `size`
    pub fn from_center_crop(image: &DynamicImage, fraction: f64, size: u32) -> Option<Self> {
        let (width, height) = (image.width(), image.height());
        let side = (f64::from(width.min(height)) * fraction).floor() as u32;
        if side == 0 || size == 0 {
            return None;
        }
        let x = (width - side) / 2;
        let y = (height - side) / 2;

        let rgb = image
            .crop_imm(x, y, side, side)
            .resize_exact(size, size, FilterType::Triangle)
            .to_rgb8();

        let pixels = rgb
            .pixels()
            .map(|p| {
                let [r, g, b] = p.0;
                (0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b))
                    .round()
                    .clamp(0.0, 255.0) as u8
            })
            .collect();

        Some(Self { size, pixels })
    }

    /// Build a raster from raw luminance values
    pub fn from_pixels(size: u32, pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == (size as usize) * (size as usize)).then_some(Self { size, pixels })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Similarity in [0, 1]
    ///
    /// Pixels dark in both rasters are skipped. With no comparable pixels
    /// the similarity is 0.1.
    pub fn similarity(&self, other: &LumaRaster, darkness_cutoff: u8, exponent: f64) -> f64 {
        if self.size != other.size {
            return 0.0;
        }

        let (total, count) = self
            .pixels
            .iter()
            .zip(&other.pixels)
            .filter(|(a, b)| **a > darkness_cutoff || **b > darkness_cutoff)
            .fold((0u64, 0u64), |(total, count), (a, b)| {
                (total + u64::from(a.abs_diff(*b)), count + 1)
            });

        if count == 0 {
            return 0.1;
        }
        let avg_diff = total as f64 / count as f64;
        (1.0 - avg_diff / 128.0).max(0.0).powf(exponent)
    }
}

/// Per-session face verifier
#[derive(Debug, Clone)]
pub struct FaceVerifier {
    config: FaceVerifierConfig,
    reference: Option<LumaRaster>,
    history: VecDeque<f64>,
    rng: StdRng,
    initialized: bool,
}

impl FaceVerifier {
    /// Create a verifier in disabled mode until a reference is enrolled
    pub fn new(config: FaceVerifierConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.simulation_seed);
        Self {
            config,
            reference: None,
            history: VecDeque::new(),
            rng,
            initialized: false,
        }
    }

    /// Enroll a reference face from encoded image bytes
    ///
    /// Returns false and stays in disabled mode when the data is too small
    /// or cannot be decoded.
    pub fn initialize(&mut self, reference: &[u8]) -> bool {
        self.initialized = false;
        self.history.clear();

        if reference.len() < self.config.min_reference_bytes {
            tracing::warn!(
                "Reference image too small ({} bytes), face verification disabled",
                reference.len()
            );
            self.reference = None;
            return false;
        }

        let raster = image::load_from_memory(reference)
            .map_err(|e| tracing::warn!("Failed to decode reference image: {}", e))
            .ok()
            .and_then(|img| LumaRaster::from_center_crop(&img, 1.0, self.config.raster_size));

        match raster {
            Some(raster) => {
                tracing::info!(
                    "Face verifier initialized with {}x{} reference",
                    raster.size(),
                    raster.size()
                );
                self.reference = Some(raster);
                self.initialized = true;
                true
            }
            None => {
                tracing::warn!("Unusable reference image, face verification disabled");
                self.reference = None;
                false
            }
        }
    }

    /// Enroll a reference from a `data:image/...;base64,` URL
    pub fn initialize_from_data_url(&mut self, data_url: &str) -> bool {
        let encoded = data_url
            .split_once(";base64,")
            .map(|(_, data)| data)
            .unwrap_or(data_url);

        match Base64::decode_vec(encoded.trim()) {
            Ok(bytes) => self.initialize(&bytes),
            Err(e) => {
                tracing::warn!("Invalid base64 reference image: {}", e);
                self.initialize(&[])
            }
        }
    }

    /// True when a reference raster is enrolled and frames are compared for real
    pub fn is_enabled(&self) -> bool {
        self.reference.is_some()
    }

    /// Verify one decoded video frame
    pub fn verify_frame(&mut self, frame: &DynamicImage) -> FaceFrameResult {
        let Some(reference) = self.reference.as_ref() else {
            return self.simulated_result();
        };

        let Some(raster) =
            LumaRaster::from_center_crop(frame, self.config.crop_fraction, self.config.raster_size)
        else {
            return FaceFrameResult::unavailable();
        };

        let raw = raster.similarity(
            reference,
            self.config.darkness_cutoff,
            self.config.similarity_exponent,
        );
        let confidence = self.smooth(raw);
        tracing::debug!("Face similarity raw {:.3}, smoothed {:.3}", raw, confidence);

        FaceFrameResult {
            detected: confidence >= self.config.detection_threshold,
            confidence,
            mode: VerificationMode::Compared,
        }
    }

    /// Verify one encoded frame; undecodable data yields a low-confidence result
    pub fn verify_frame_bytes(&mut self, frame: &[u8]) -> FaceFrameResult {
        match image::load_from_memory(frame) {
            Ok(img) => self.verify_frame(&img),
            Err(e) => {
                tracing::debug!("Failed to decode frame for face verification: {}", e);
                FaceFrameResult::unavailable()
            }
        }
    }

    /// Result for a sample with no raster, as in landmark-only replay
    pub fn verify_absent_frame(&mut self) -> FaceFrameResult {
        if self.is_enabled() {
            FaceFrameResult::unavailable()
        } else {
            self.simulated_result()
        }
    }

    /// Blend the current similarity with the mean of the last few results
    fn smooth(&mut self, raw: f64) -> f64 {
        let window = self.config.smoothing_window.min(self.history.len());
        let recent: Vec<f64> = self.history.iter().rev().take(window).copied().collect();
        let smoothed = match mean(&recent) {
            Some(avg) => {
                self.config.current_weight * raw + (1.0 - self.config.current_weight) * avg
            }
            None => raw,
        }
        .clamp(0.0, 1.0);

        self.record(smoothed);
        smoothed
    }

    fn record(&mut self, confidence: f64) {
        self.history.push_back(confidence);
        while self.history.len() > self.config.history_capacity {
            self.history.pop_front();
        }
    }

    /// Disabled-mode confidence, skewed towards a plausible match
    fn simulated_result(&mut self) -> FaceFrameResult {
        let bucket: f64 = self.rng.gen();
        let value = if bucket < 0.1 {
            self.rng.gen_range(0.1..0.3)
        } else if bucket < 0.3 {
            self.rng.gen_range(0.2..0.5)
        } else {
            self.rng.gen_range(0.5..0.9)
        };

        let confidence = match self.history.back() {
            Some(last) => round_to((value + last) / 2.0, 2),
            None => round_to(value, 2),
        };
        self.record(confidence);

        FaceFrameResult {
            detected: confidence >= self.config.detection_threshold,
            confidence,
            mode: VerificationMode::Simulated,
        }
    }

    pub fn is_matching_person(&self, confidence: f64) -> bool {
        confidence >= self.config.match_threshold
    }

    /// Human-readable label for a frame result
    pub fn detection_status(&self, result: &FaceFrameResult) -> String {
        if !result.detected {
            return "No face detected".to_string();
        }
        let percent = (result.confidence * 100.0).round();
        let label = if percent >= 80.0 {
            "Strong match"
        } else if percent >= 60.0 {
            "Good match"
        } else if percent >= 40.0 {
            "Weak match"
        } else {
            "Poor match"
        };
        format!("{} ({}%)", label, percent)
    }

    pub fn stats(&self) -> VerifierStats {
        let history: Vec<f64> = self.history.iter().copied().collect();
        VerifierStats {
            is_initialized: self.initialized,
            has_reference: self.reference.is_some(),
            recent_confidence_avg: round_to(mean_or(&history, 0.0), 2),
            history_len: history.len(),
        }
    }

    /// Start a new video: forget the confidence history and restart the
    /// disabled-mode sequence, keeping any enrolled reference
    pub fn reset_session(&mut self) {
        self.history.clear();
        self.rng = StdRng::seed_from_u64(self.config.simulation_seed);
    }

    /// Drop the reference and history; the verifier returns to disabled mode
    pub fn clear(&mut self) {
        self.reference = None;
        self.history.clear();
        self.initialized = false;
        self.rng = StdRng::seed_from_u64(self.config.simulation_seed);
        tracing::info!("Face verifier cleared");
    }
}

impl Default for FaceVerifier {
    fn default() -> Self {
        Self::new(FaceVerifierConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn textured(width: u32, height: u32, offset: u8) -> DynamicImage {
        let img: RgbImage = ImageBuffer::from_fn(width, height, |x, y| {
            let v = ((x.wrapping_mul(2_654_435_761) ^ y.wrapping_mul(40_503)) >> 7) % 200;
            let v = v as u8 + offset;
            Rgb([v, v, v])
        });
        DynamicImage::ImageRgb8(img)
    }

    fn png_bytes(image: &DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_identical_rasters_are_fully_similar() {
        let raster = LumaRaster::from_center_crop(&textured(200, 200, 40), 0.6, 32).unwrap();
        assert_eq!(raster.similarity(&raster, 30, 0.7), 1.0);
    }

    #[test]
    fn test_all_dark_rasters_return_floor() {
        let dark = LumaRaster::from_pixels(4, vec![10; 16]).unwrap();
        assert_eq!(dark.similarity(&dark, 30, 0.7), 0.1);
    }

    #[test]
    fn test_opposite_rasters_are_dissimilar() {
        let black = LumaRaster::from_pixels(2, vec![0; 4]).unwrap();
        let white = LumaRaster::from_pixels(2, vec![255; 4]).unwrap();
        assert_eq!(black.similarity(&white, 30, 0.7), 0.0);
    }

    #[test]
    fn test_from_pixels_checks_length() {
        assert!(LumaRaster::from_pixels(3, vec![0; 8]).is_none());
    }

    #[test]
    fn test_small_reference_disables_verification() {
        let mut verifier = FaceVerifier::default();
        assert!(!verifier.initialize(&[0u8; 50]));
        assert!(!verifier.is_enabled());

        let result = verifier.verify_frame(&textured(64, 64, 40));
        assert_eq!(result.mode, VerificationMode::Simulated);
        assert!(result.confidence >= 0.1 && result.confidence <= 0.9);
    }

    #[test]
    fn test_undecodable_reference_disables_verification() {
        let mut verifier = FaceVerifier::default();
        assert!(!verifier.initialize(&[7u8; 500]));
        assert!(!verifier.stats().has_reference);
        assert!(!verifier.stats().is_initialized);
    }

    #[test]
    fn test_failed_enrollment_after_success_is_not_initialized() {
        let mut verifier = FaceVerifier::default();
        assert!(verifier.initialize(&png_bytes(&textured(64, 64, 40))));
        assert!(verifier.stats().is_initialized);

        assert!(!verifier.initialize(&[0u8; 20]));
        let stats = verifier.stats();
        assert!(!stats.is_initialized);
        assert!(!stats.has_reference);
    }

    #[test]
    fn test_reset_session_keeps_reference_and_restarts_sequence() {
        let frame = textured(8, 8, 0);
        let mut simulated = FaceVerifier::default();
        let first: Vec<_> = (0..5).map(|_| simulated.verify_frame(&frame)).collect();
        simulated.reset_session();
        assert_eq!(simulated.stats().history_len, 0);
        let second: Vec<_> = (0..5).map(|_| simulated.verify_frame(&frame)).collect();
        assert_eq!(first, second);

        let mut enrolled = FaceVerifier::default();
        enrolled.initialize(&png_bytes(&textured(64, 64, 40)));
        enrolled.verify_frame(&textured(64, 64, 40));
        enrolled.reset_session();
        let stats = enrolled.stats();
        assert!(stats.is_initialized);
        assert!(stats.has_reference);
        assert_eq!(stats.history_len, 0);
    }

    #[test]
    fn test_same_scene_converges_to_full_confidence() {
        let scene = textured(240, 240, 40);
        let mut verifier = FaceVerifier::default();
        // A reference equal to the frame's centre crop
        let crop = scene.crop_imm(48, 48, 144, 144);
        assert!(verifier.initialize(&png_bytes(&crop)));

        let mut last = FaceFrameResult::unavailable();
        for _ in 0..10 {
            last = verifier.verify_frame(&scene);
        }
        assert_eq!(last.mode, VerificationMode::Compared);
        assert!(last.detected);
        assert!(last.confidence > 0.95, "confidence was {}", last.confidence);
    }

    #[test]
    fn test_undecodable_frame_is_unavailable() {
        let mut verifier = FaceVerifier::default();
        verifier.initialize(&png_bytes(&textured(64, 64, 40)));
        let result = verifier.verify_frame_bytes(b"not an image");
        assert_eq!(result, FaceFrameResult::unavailable());
        assert_eq!(verifier.stats().history_len, 0);
    }

    #[test]
    fn test_history_is_capped() {
        let mut verifier = FaceVerifier::default();
        for _ in 0..25 {
            verifier.verify_frame(&textured(8, 8, 0));
        }
        assert_eq!(verifier.stats().history_len, 10);
    }

    #[test]
    fn test_simulated_sequence_is_reproducible() {
        let mut a = FaceVerifier::default();
        let mut b = FaceVerifier::default();
        let frame = textured(8, 8, 0);
        for _ in 0..5 {
            assert_eq!(a.verify_frame(&frame), b.verify_frame(&frame));
        }
    }

    #[test]
    fn test_data_url_reference() {
        let bytes = png_bytes(&textured(64, 64, 40));
        let url = format!("data:image/png;base64,{}", Base64::encode_string(&bytes));
        let mut verifier = FaceVerifier::default();
        assert!(verifier.initialize_from_data_url(&url));
        assert!(verifier.is_enabled());

        assert!(!verifier.initialize_from_data_url("data:image/png;base64,@@@"));
        assert!(!verifier.is_enabled());
    }

    #[test]
    fn test_detection_status_labels() {
        let verifier = FaceVerifier::default();
        let result = |detected, confidence| FaceFrameResult {
            detected,
            confidence,
            mode: VerificationMode::Compared,
        };
        assert_eq!(verifier.detection_status(&result(true, 0.85)), "Strong match (85%)");
        assert_eq!(verifier.detection_status(&result(true, 0.6)), "Good match (60%)");
        assert_eq!(verifier.detection_status(&result(true, 0.45)), "Weak match (45%)");
        assert_eq!(verifier.detection_status(&result(true, 0.3)), "Poor match (30%)");
        assert_eq!(verifier.detection_status(&result(false, 0.9)), "No face detected");
        assert!(verifier.is_matching_person(0.6));
        assert!(!verifier.is_matching_person(0.59));
    }

    #[test]
    fn test_clear_returns_to_disabled_mode() {
        let mut verifier = FaceVerifier::default();
        verifier.initialize(&png_bytes(&textured(64, 64, 40)));
        verifier.verify_frame(&textured(64, 64, 40));
        verifier.clear();
        let stats = verifier.stats();
        assert!(!stats.is_initialized);
        assert!(!stats.has_reference);
        assert_eq!(stats.history_len, 0);
    }
}
