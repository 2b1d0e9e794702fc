//! Shared builders for integration tests: synthetic poses, in-memory video
//! frames and a scripted pose estimator.
#![allow(dead_code)]

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

use motion_engine::error::{EngineError, Result};
use motion_engine::models::{BodyLandmark, Landmark, LANDMARK_COUNT};
use motion_engine::services::{FrameSource, PoseEstimator};

pub fn set(lms: &mut [Landmark], which: BodyLandmark, x: f64, y: f64) {
    lms[which.index()] = Landmark::new(x, y);
}

/// Upright athlete facing the camera with straight legs
pub fn standing_pose() -> Vec<Landmark> {
    let mut lms = vec![Landmark::new(0.5, 0.5); LANDMARK_COUNT];
    set(&mut lms, BodyLandmark::Nose, 0.5, 0.15);
    set(&mut lms, BodyLandmark::LeftShoulder, 0.45, 0.3);
    set(&mut lms, BodyLandmark::RightShoulder, 0.55, 0.3);
    set(&mut lms, BodyLandmark::LeftElbow, 0.43, 0.42);
    set(&mut lms, BodyLandmark::RightElbow, 0.57, 0.42);
    set(&mut lms, BodyLandmark::LeftWrist, 0.42, 0.52);
    set(&mut lms, BodyLandmark::RightWrist, 0.58, 0.52);
    set(&mut lms, BodyLandmark::LeftHip, 0.46, 0.55);
    set(&mut lms, BodyLandmark::RightHip, 0.54, 0.55);
    set(&mut lms, BodyLandmark::LeftKnee, 0.46, 0.72);
    set(&mut lms, BodyLandmark::RightKnee, 0.54, 0.72);
    set(&mut lms, BodyLandmark::LeftAnkle, 0.46, 0.9);
    set(&mut lms, BodyLandmark::RightAnkle, 0.54, 0.9);
    set(&mut lms, BodyLandmark::LeftFootIndex, 0.44, 0.93);
    set(&mut lms, BodyLandmark::RightFootIndex, 0.56, 0.93);
    lms
}

/// Standing pose with both hip-knee-ankle angles set to `degrees`
pub fn squat_pose(degrees: f64) -> Vec<Landmark> {
    let mut lms = standing_pose();
    for (hip, knee, ankle) in [
        (BodyLandmark::LeftHip, BodyLandmark::LeftKnee, BodyLandmark::LeftAnkle),
        (BodyLandmark::RightHip, BodyLandmark::RightKnee, BodyLandmark::RightAnkle),
    ] {
        let h = lms[hip.index()];
        let k = Landmark::new(h.x, h.y + 0.17);
        let theta = degrees.to_radians();
        lms[knee.index()] = k;
        lms[ankle.index()] = Landmark::new(k.x + 0.18 * theta.sin(), k.y - 0.18 * theta.cos());
    }
    lms
}

/// Whole body shifted up by `rise` normalized units
pub fn lifted_pose(rise: f64) -> Vec<Landmark> {
    standing_pose()
        .into_iter()
        .map(|lm| Landmark::new(lm.x, lm.y - rise))
        .collect()
}

/// Knee angles for `reps` squats: standing, descending, bottom, rising
pub fn squat_cycle(reps: usize) -> Vec<f64> {
    let mut angles = vec![175.0];
    for _ in 0..reps {
        angles.extend([150.0, 100.0, 90.0, 100.0, 150.0, 175.0]);
    }
    angles
}

/// Grey noise pattern that survives PNG compression above 100 bytes
pub fn textured(width: u32, height: u32, offset: u8) -> DynamicImage {
    let img: RgbImage = ImageBuffer::from_fn(width, height, |x, y| {
        let v = ((x.wrapping_mul(2_654_435_761) ^ y.wrapping_mul(40_503)) >> 7) % 200;
        let v = v as u8 + offset;
        Rgb([v, v, v])
    });
    DynamicImage::ImageRgb8(img)
}

pub fn png_bytes(image: &DynamicImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// Frame source serving one fixed image, optionally failing from a timestamp on
pub struct StillFrameSource {
    pub duration: f64,
    pub frame: DynamicImage,
    pub fail_from: Option<f64>,
    pub requested: Vec<f64>,
}

impl StillFrameSource {
    pub fn new(duration: f64, frame: DynamicImage) -> Self {
        Self {
            duration,
            frame,
            fail_from: None,
            requested: Vec::new(),
        }
    }

    pub fn failing_from(mut self, timestamp: f64) -> Self {
        self.fail_from = Some(timestamp);
        self
    }
}

impl FrameSource for StillFrameSource {
    async fn duration(&mut self) -> Result<f64> {
        Ok(self.duration)
    }

    async fn frame_at(&mut self, timestamp: f64) -> Result<DynamicImage> {
        self.requested.push(timestamp);
        match self.fail_from {
            Some(limit) if timestamp >= limit => Err(EngineError::FrameExtraction {
                timestamp,
                message: "corrupt packet".to_string(),
            }),
            _ => Ok(self.frame.clone()),
        }
    }
}

/// Pose estimator answering from a function of the sample index
pub struct ScriptedEstimator<F> {
    script: F,
    calls: usize,
}

impl<F> ScriptedEstimator<F>
where
    F: FnMut(usize, f64) -> Result<Option<Vec<Landmark>>> + Send,
{
    pub fn new(script: F) -> Self {
        Self { script, calls: 0 }
    }
}

impl<F> PoseEstimator for ScriptedEstimator<F>
where
    F: FnMut(usize, f64) -> Result<Option<Vec<Landmark>>> + Send,
{
    async fn estimate(
        &mut self,
        timestamp: f64,
        _frame: &DynamicImage,
    ) -> Result<Option<Vec<Landmark>>> {
        let index = self.calls;
        self.calls += 1;
        (self.script)(index, timestamp)
    }
}
