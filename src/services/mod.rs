// Analysis services: geometry, exercise analyzers, face verification and aggregation

pub mod aggregator;
pub mod analyzers;
pub mod benchmark_service;
pub mod face_verifier;
pub mod frame_orchestrator;
pub mod geometry;
pub mod pose_track;
pub mod statistics;
pub mod video_frame_source;

pub use aggregator::ResultAggregator;
pub use analyzers::{ExerciseAnalyzer, MovementAnalyzer};
pub use benchmark_service::BenchmarkService;
pub use face_verifier::{FaceVerifier, LumaRaster};
pub use frame_orchestrator::{
    replay, AnalysisOutcome, FrameOrchestrator, FrameSource, PoseEstimator, SampleProgress,
};
pub use pose_track::{RecordedPoseTrack, TrackedFrame};
pub use video_frame_source::{VideoFrameSource, VideoInfo};
