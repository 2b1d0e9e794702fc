use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::face::FaceFrameResult;
use crate::models::metrics::{ExerciseType, FrameMetrics};

/// One sampled position of a video analysis pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    /// Seconds from the start of the video
    pub timestamp: f64,
    pub metrics: FrameMetrics,
    pub face: FaceFrameResult,
}

/// Append-only, timestamp-ordered record of one analysis pass
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: Uuid,
    pub exercise_type: ExerciseType,
    pub started_at: DateTime<Utc>,
    pub sample_rate_hz: f64,
    entries: Vec<SessionEntry>,
}

impl SessionRecord {
    pub fn new(exercise_type: ExerciseType, sample_rate_hz: f64) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            exercise_type,
            started_at: Utc::now(),
            sample_rate_hz,
            entries: Vec::new(),
        }
    }

    /// Append an entry. Entries must arrive in strictly increasing timestamp order.
    pub fn push(
        &mut self,
        timestamp: f64,
        metrics: FrameMetrics,
        face: FaceFrameResult,
    ) -> crate::error::Result<()> {
        if let Some(last) = self.entries.last() {
            if timestamp <= last.timestamp {
                return Err(crate::error::EngineError::InvalidInput(format!(
                    "timestamp {:.3}s does not follow {:.3}s",
                    timestamp, last.timestamp
                )));
            }
        }
        self.entries.push(SessionEntry {
            timestamp,
            metrics,
            face,
        });
        Ok(())
    }

    pub fn entries(&self) -> &[SessionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn timestamps(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.timestamp).collect()
    }
}
