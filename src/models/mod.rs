// Data models for pose frames, per-frame metrics and session summaries

pub mod analysis_result;
pub mod benchmark;
pub mod face;
pub mod landmark;
pub mod metrics;
pub mod session;

pub use analysis_result::*;
pub use benchmark::*;
pub use face::*;
pub use landmark::*;
pub use metrics::*;
pub use session::*;
