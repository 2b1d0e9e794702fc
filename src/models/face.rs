use serde::{Deserialize, Serialize};

/// How a face result was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationMode {
    /// Genuine raster comparison against the enrolled reference
    Compared,
    /// Placeholder confidence; no usable reference was enrolled
    Simulated,
    /// The frame could not be decoded or cropped
    Unavailable,
}

/// Per-frame face verification result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceFrameResult {
    pub detected: bool,
    /// Smoothed confidence in [0, 1]
    pub confidence: f64,
    pub mode: VerificationMode,
}

impl FaceFrameResult {
    /// Low-confidence result used when a frame cannot be compared
    pub fn unavailable() -> Self {
        Self {
            detected: false,
            confidence: 0.1,
            mode: VerificationMode::Unavailable,
        }
    }

    pub fn is_simulated(&self) -> bool {
        self.mode == VerificationMode::Simulated
    }
}

/// Verifier diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifierStats {
    pub is_initialized: bool,
    pub has_reference: bool,
    /// Mean of the confidence history (2 decimals)
    pub recent_confidence_avg: f64,
    pub history_len: usize,
}
