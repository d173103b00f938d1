//! Capture backend abstraction for screenshot capture.
//!
//! This module provides a unified interface for different capture methods:
//! - `BrowserSession` (WebDriver viewport screenshots)
//! - `MockFramebuffer` (testing and programmatic fixtures)

use image::{ImageBuffer, RgbImage};
use std::fs;
use std::io::Cursor;
use tracing::debug;

use super::types::{ScreenshotRole, Snapshot, SnapshotConfig, SnapshotError, SnapshotResult};
use super::utils::{generate_filename, generate_timestamp, write_manifest};

/// Result of a capture operation
#[derive(Debug, Clone)]
pub struct CaptureResult {
    /// PNG-encoded image data
    pub image_data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl CaptureResult {
    /// Wrap PNG bytes, reading the dimensions from the image header
    pub fn from_png(image_data: Vec<u8>) -> SnapshotResult<Self> {
        let (width, height) = image::io::Reader::new(Cursor::new(&image_data))
            .with_guessed_format()?
            .into_dimensions()?;
        Ok(Self {
            image_data,
            width,
            height,
        })
    }
}

/// Trait for capture backends
///
/// Implementations provide different methods of capturing visual output:
/// - `BrowserSession` for the current browser viewport
/// - `MockFramebuffer` for testing with programmatic drawing
pub trait CaptureBackend {
    /// Perform a capture and return the result
    fn capture(&mut self) -> SnapshotResult<CaptureResult>;

    /// Get the source type identifier (e.g., "webdriver", "mock")
    fn source_type(&self) -> &str;
}

/// A virtual framebuffer for tests and programmatic fixtures
#[derive(Debug, Clone)]
pub struct MockFramebuffer {
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// RGB pixel buffer (row-major, 3 bytes per pixel)
    buffer: Vec<u8>,
}

impl MockFramebuffer {
    /// Create a new framebuffer with the given dimensions, initialized to black
    pub fn new(width: u32, height: u32) -> Self {
        let buffer = vec![0u8; (width * height * 3) as usize];
        Self {
            width,
            height,
            buffer,
        }
    }

    /// Create a framebuffer initialized to a specific color
    pub fn with_color(width: u32, height: u32, color: [u8; 3]) -> Self {
        let mut fb = Self::new(width, height);
        fb.fill(color);
        fb
    }

    /// Load a framebuffer from PNG image bytes
    pub fn from_png_bytes(data: &[u8]) -> SnapshotResult<Self> {
        let rgb = image::load_from_memory(data)?.to_rgb8();
        Ok(Self {
            width: rgb.width(),
            height: rgb.height(),
            buffer: rgb.into_raw(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Fill the entire framebuffer with a color
    pub fn fill(&mut self, color: [u8; 3]) {
        for chunk in self.buffer.chunks_exact_mut(3) {
            chunk.copy_from_slice(&color);
        }
    }

    /// Draw a filled rectangle, clipped to the framebuffer
    pub fn draw_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: [u8; 3]) {
        for py in y..(y + h).min(self.height) {
            for px in x..(x + w).min(self.width) {
                self.set_pixel(px, py, color);
            }
        }
    }

    /// Get the color of a pixel
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        if x >= self.width || y >= self.height {
            return [0, 0, 0];
        }
        let idx = ((y * self.width + x) * 3) as usize;
        [self.buffer[idx], self.buffer[idx + 1], self.buffer[idx + 2]]
    }

    /// Set the color of a pixel
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = ((y * self.width + x) * 3) as usize;
        self.buffer[idx..idx + 3].copy_from_slice(&color);
    }

    /// Convert to an image buffer
    pub fn to_image(&self) -> SnapshotResult<RgbImage> {
        ImageBuffer::from_raw(self.width, self.height, self.buffer.clone())
            .ok_or_else(|| SnapshotError::Capture("Buffer size does not match dimensions".to_string()))
    }

    /// Encode the framebuffer as PNG bytes
    pub fn to_png(&self) -> SnapshotResult<Vec<u8>> {
        let img = self.to_image()?;
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
        Ok(bytes)
    }
}

impl CaptureBackend for MockFramebuffer {
    fn capture(&mut self) -> SnapshotResult<CaptureResult> {
        Ok(CaptureResult {
            image_data: self.to_png()?,
            width: self.width,
            height: self.height,
        })
    }

    fn source_type(&self) -> &str {
        "mock"
    }
}

/// Capture a screenshot with the provided backend into the current-role directory.
///
/// The file is named `<name>_<unix-seconds>.png`. Two captures with the same
/// name inside the same second resolve to the same path and the later one wins.
pub fn capture_with_backend(
    backend: &mut dyn CaptureBackend,
    config: &SnapshotConfig,
    name: &str,
) -> SnapshotResult<Snapshot> {
    let dir = config.dir(ScreenshotRole::Current);
    fs::create_dir_all(&dir)?;

    let timestamp = generate_timestamp();
    let image_path = dir.join(generate_filename(name, timestamp));

    let result = backend.capture()?;
    fs::write(&image_path, &result.image_data)?;
    debug!(path = %image_path.display(), source = backend.source_type(), "captured screenshot");

    let snapshot = Snapshot {
        name: name.to_string(),
        image_path,
        source: backend.source_type().to_string(),
        width: result.width,
        height: result.height,
        timestamp: chrono::DateTime::from_timestamp(timestamp, 0).unwrap_or_else(chrono::Utc::now),
    };

    write_manifest(&snapshot, config)?;

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_framebuffer_new() {
        let fb = MockFramebuffer::new(100, 50);
        assert_eq!(fb.width(), 100);
        assert_eq!(fb.height(), 50);
        assert_eq!(fb.get_pixel(0, 0), [0, 0, 0]);
        assert_eq!(fb.get_pixel(99, 49), [0, 0, 0]);
    }

    #[test]
    fn test_mock_framebuffer_draw_rect() {
        let mut fb = MockFramebuffer::new(20, 20);
        fb.draw_rect(5, 5, 10, 10, [255, 0, 0]);

        assert_eq!(fb.get_pixel(4, 4), [0, 0, 0]);
        assert_eq!(fb.get_pixel(5, 5), [255, 0, 0]);
        assert_eq!(fb.get_pixel(14, 14), [255, 0, 0]);
        assert_eq!(fb.get_pixel(15, 15), [0, 0, 0]);
    }

    #[test]
    fn test_mock_framebuffer_capture_is_png() {
        let mut fb = MockFramebuffer::with_color(50, 50, [128, 128, 128]);
        let result = fb.capture().unwrap();

        assert_eq!(result.width, 50);
        assert_eq!(result.height, 50);
        assert_eq!(&result.image_data[0..4], &[0x89, 0x50, 0x4E, 0x47]);
    }

    #[test]
    fn test_capture_result_reads_dimensions() {
        let png = MockFramebuffer::new(31, 17).to_png().unwrap();
        let result = CaptureResult::from_png(png).unwrap();
        assert_eq!((result.width, result.height), (31, 17));
    }

    #[test]
    fn test_capture_with_backend_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = SnapshotConfig::new(dir.path()).with_manifest(true);
        let mut fb = MockFramebuffer::with_color(8, 8, [10, 20, 30]);

        let snapshot = capture_with_backend(&mut fb, &config, "takeaways_default").unwrap();

        assert!(snapshot.image_path.exists());
        assert!(snapshot.image_path.starts_with(dir.path().join("current")));
        let file_name = snapshot.image_path.file_name().unwrap().to_string_lossy().to_string();
        assert!(file_name.starts_with("takeaways_default_"));
        assert!(file_name.ends_with(".png"));
        assert!(snapshot.image_path.with_extension("json").exists());
        assert_eq!(snapshot.source, "mock");
    }
}
