/// Edge-triggered repetition counter with a dead-band
///
/// A repetition is armed when the start condition holds and counted only on
/// the first frame the completion condition holds afterwards. Holding either
/// state never counts twice; frames between the two bands leave the state
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct RepCounter {
    count: u32,
    in_progress: bool,
    rep_timestamps: Vec<f64>,
}

impl RepCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame's band membership; returns true when a rep completed
    pub fn update(&mut self, start: bool, complete: bool, timestamp: f64) -> bool {
        if !self.in_progress && start {
            self.in_progress = true;
            false
        } else if self.in_progress && complete {
            self.in_progress = false;
            self.count += 1;
            self.rep_timestamps.push(timestamp);
            true
        } else {
            false
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    /// Timestamps (seconds) at which reps completed
    pub fn rep_timestamps(&self) -> &[f64] {
        &self.rep_timestamps
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
