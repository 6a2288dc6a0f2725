//! Camera capture session.
//!
//! A [`CaptureSession`] owns at most one live camera stream. The stream is
//! a scarce resource: it is acquired when a capture scene is entered and
//! must be released on every way out of it: capture success, retake,
//! scene change, error, teardown. [`CaptureSession::close`] is therefore
//! idempotent and also runs on drop.

use crate::error::{AppError, Result};
use image::{DynamicImage, ImageFormat, RgbImage};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
    Resolution,
};
use nokhwa::{Camera, query};
use std::io::Cursor;

/// Which camera the capture scene wants, mirroring the front/back
/// distinction of mobile devices. On machines with a single camera both
/// resolve to the same device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    /// Front-facing camera (face capture).
    User,
    /// Rear/world-facing camera (palm capture).
    Environment,
}

/// A captured still, PNG-encoded, with its pixel dimensions.
#[derive(Debug, Clone)]
pub struct CapturedStill {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Owns the live stream handle. At most one stream is open per instance.
pub struct CaptureSession {
    base_index: u32,
    facing: Option<Facing>,
    camera: Option<Camera>,
}

impl CaptureSession {
    /// Creates a session preferring the given device index. No stream is
    /// opened yet.
    pub fn new(base_index: u32) -> Self {
        Self {
            base_index,
            facing: None,
            camera: None,
        }
    }

    /// Acquires a live stream for the given facing. An already-open
    /// stream is closed first. Fails with
    /// [`AppError::DeviceUnavailable`] when no device matches or access
    /// is denied.
    pub fn open(&mut self, facing: Facing) -> Result<()> {
        self.close();

        let devices = query(ApiBackend::Auto)
            .map_err(|e| AppError::device(format!("Failed to enumerate cameras: {}", e)))?;
        if devices.is_empty() {
            return Err(AppError::device("No cameras detected"));
        }

        // User-facing prefers the next device over the environment one;
        // both clamp to the devices that actually exist.
        let offset = match facing {
            Facing::Environment => 0,
            Facing::User => 1,
        };
        let index = (self.base_index + offset).min(devices.len() as u32 - 1);

        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(Resolution::new(1280, 720), FrameFormat::MJPEG, 30),
        ));

        let mut camera = Camera::new(CameraIndex::Index(index), requested)
            .map_err(|e| AppError::device(format!("Failed to open camera {}: {}", index, e)))?;
        camera
            .open_stream()
            .map_err(|e| AppError::device(format!("Failed to start stream: {}", e)))?;

        self.camera = Some(camera);
        self.facing = Some(facing);
        Ok(())
    }

    /// Whether a stream is currently open.
    pub fn is_open(&self) -> bool {
        self.camera.is_some()
    }

    /// Decodes the current frame for live preview. Valid only while open.
    pub fn preview(&mut self) -> Result<RgbImage> {
        let camera = self.camera.as_mut().ok_or(AppError::StreamInactive)?;
        let buffer = camera
            .frame()
            .map_err(|e| AppError::device(format!("Failed to read frame: {}", e)))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| AppError::image(format!("Failed to decode frame: {}", e)))?;

        // Rebuild from raw bytes so the frame lands in our image types
        // even when the backend links its own image-crate version.
        let (width, height) = (decoded.width(), decoded.height());
        RgbImage::from_raw(width, height, decoded.into_raw())
            .ok_or_else(|| AppError::image("Frame buffer size mismatch"))
    }

    /// Reads the current frame into a PNG still and closes the stream;
    /// capturing ends the live preview. Valid only while open.
    pub fn capture(&mut self) -> Result<CapturedStill> {
        let frame = self.preview()?;
        let (width, height) = frame.dimensions();
        let png = encode_png(&frame);
        self.close();
        let png = png?;
        Ok(CapturedStill { png, width, height })
    }

    /// Reopens the stream with the same facing as originally requested,
    /// discarding any captured still held by the caller.
    pub fn retake(&mut self) -> Result<()> {
        let facing = self.facing.ok_or(AppError::StreamInactive)?;
        self.open(facing)
    }

    /// Releases the stream. Safe to call when already closed.
    pub fn close(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            if let Err(e) = camera.stop_stream() {
                eprintln!("Warning: failed to stop camera stream: {}", e);
            }
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Encodes an RGB frame as PNG bytes.
fn encode_png(frame: &RgbImage) -> Result<Vec<u8>> {
    let mut buffer: Vec<u8> = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);

    DynamicImage::ImageRgb8(frame.clone())
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|e| AppError::image(format!("Failed to encode still: {}", e)))?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_is_idempotent_without_open() {
        let mut session = CaptureSession::new(0);
        session.close();
        session.close();
        assert!(!session.is_open());
    }

    #[test]
    fn capture_and_preview_require_open_stream() {
        let mut session = CaptureSession::new(0);
        assert!(matches!(session.preview(), Err(AppError::StreamInactive)));
        assert!(matches!(session.capture(), Err(AppError::StreamInactive)));
    }

    #[test]
    fn retake_requires_a_prior_open() {
        let mut session = CaptureSession::new(0);
        assert!(matches!(session.retake(), Err(AppError::StreamInactive)));
    }

    #[test]
    fn encode_png_produces_png_magic() {
        let frame = RgbImage::from_pixel(4, 2, image::Rgb([10, 20, 30]));
        let png = encode_png(&frame).expect("encoding succeeds");
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
