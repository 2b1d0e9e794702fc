use image::DynamicImage;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::services::frame_orchestrator::FrameSource;

/// Frame source backed by the `ffprobe` and `ffmpeg` executables
pub struct VideoFrameSource {
    video_path: PathBuf,
    ffmpeg_path: String,
    ffprobe_path: String,
    info: Option<VideoInfo>,
}

impl VideoFrameSource {
    pub fn new(video_path: impl Into<PathBuf>) -> Self {
        Self {
            video_path: video_path.into(),
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            info: None,
        }
    }

    /// Create source with the executable paths from the engine configuration
    pub fn from_config(video_path: impl Into<PathBuf>, config: &EngineConfig) -> Self {
        Self::new(video_path).with_paths(config.ffmpeg_path.clone(), config.ffprobe_path.clone())
    }

    /// Create source with custom FFmpeg paths
    pub fn with_paths(mut self, ffmpeg_path: String, ffprobe_path: String) -> Self {
        self.ffmpeg_path = ffmpeg_path;
        self.ffprobe_path = ffprobe_path;
        self
    }

    pub fn video_path(&self) -> &Path {
        &self.video_path
    }

    fn path_arg(&self) -> Result<&str> {
        self.video_path.to_str().ok_or_else(|| {
            EngineError::InvalidInput(format!("non UTF-8 video path: {:?}", self.video_path))
        })
    }

    /// Probe video metadata (duration, resolution, codec, frame rate)
    pub async fn probe(&mut self) -> Result<VideoInfo> {
        if let Some(info) = &self.info {
            return Ok(info.clone());
        }

        info!("Probing video: {:?}", self.video_path);

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=width,height,duration,codec_name,r_frame_rate",
                "-show_entries",
                "format=duration",
                "-of",
                "json",
                self.path_arg()?,
            ])
            .output()
            .await
            .map_err(|e| EngineError::VideoProbe(format!("failed to execute ffprobe: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::VideoProbe(stderr.trim().to_string()));
        }

        let metadata: FfprobeOutput = serde_json::from_slice(&output.stdout)
            .map_err(|e| EngineError::VideoProbe(format!("unreadable ffprobe output: {}", e)))?;
        let info = parse_video_info(metadata)?;

        info!(
            "Video {}x{} {} at {:.2} fps, {:.2}s",
            info.width, info.height, info.video_codec, info.fps, info.duration_seconds
        );
        self.info = Some(info.clone());
        Ok(info)
    }

    /// Decode the single frame at `timestamp` seconds as PNG over stdout
    async fn extract_frame(&self, timestamp: f64) -> Result<DynamicImage> {
        debug!("Extracting frame at {:.3}s", timestamp);

        let output = Command::new(&self.ffmpeg_path)
            .args([
                "-v",
                "error",
                "-ss",
                &format!("{:.3}", timestamp),
                "-i",
                self.path_arg()?,
                "-frames:v",
                "1",
                "-f",
                "image2pipe",
                "-vcodec",
                "png",
                "-",
            ])
            .output()
            .await
            .map_err(|e| EngineError::FrameExtraction {
                timestamp,
                message: format!("failed to execute ffmpeg: {}", e),
            })?;

        if !output.status.success() || output.stdout.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::FrameExtraction {
                timestamp,
                message: if stderr.trim().is_empty() {
                    "no frame decoded".to_string()
                } else {
                    stderr.trim().to_string()
                },
            });
        }

        image::load_from_memory(&output.stdout)
            .map_err(|e| EngineError::VideoDecode(format!("frame at {:.3}s: {}", timestamp, e)))
    }
}

impl FrameSource for VideoFrameSource {
    async fn duration(&mut self) -> Result<f64> {
        Ok(self.probe().await?.duration_seconds)
    }

    async fn frame_at(&mut self, timestamp: f64) -> Result<DynamicImage> {
        self.extract_frame(timestamp).await
    }
}

/// Video metadata information
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub duration_seconds: f64,
    pub video_codec: String,
    pub fps: f64,
}

impl VideoInfo {
    pub fn resolution_string(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

fn parse_video_info(metadata: FfprobeOutput) -> Result<VideoInfo> {
    let stream = metadata
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| EngineError::VideoProbe("no video stream found".to_string()))?;

    let duration_seconds = stream
        .duration
        .as_deref()
        .or(metadata.format.duration.as_deref())
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| EngineError::VideoProbe("video duration unavailable".to_string()))?;

    Ok(VideoInfo {
        width: stream.width,
        height: stream.height,
        duration_seconds,
        video_codec: stream.codec_name,
        fps: parse_frame_rate(&stream.r_frame_rate),
    })
}

/// Parse frame rate string (e.g., "30/1" -> 30.0)
fn parse_frame_rate(rate_str: &str) -> f64 {
    if let Some((num, den)) = rate_str.split_once('/') {
        if let (Ok(n), Ok(d)) = (num.parse::<f64>(), den.parse::<f64>()) {
            if d != 0.0 {
                return n / d;
            }
        }
    }
    0.0
}

// FFprobe JSON output structures
#[derive(Debug, serde::Deserialize)]
struct FfprobeOutput {
    streams: Vec<FfprobeStream>,
    #[serde(default)]
    format: FfprobeFormat,
}

#[derive(Debug, serde::Deserialize)]
struct FfprobeStream {
    width: u32,
    height: u32,
    duration: Option<String>,
    #[serde(default)]
    codec_name: String,
    #[serde(default)]
    r_frame_rate: String,
}

#[derive(Debug, Default, serde::Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}
