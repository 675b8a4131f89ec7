//! Integration tests for the primary-then-fallback sequence
//!
//! Custom primary removers are plugged into the public processor API to check
//! which strategy ends up writing the output.

use image::{Rgba, RgbaImage};
use remove_bg::{
    BackgroundRemovalProcessor, BgRemovalError, ImageIOService, PrimaryRemover, RemovalConfig,
    Result, Strategy,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Primary remover that makes everything opaque
struct OpaqueRemover {
    calls: Arc<AtomicUsize>,
}

impl PrimaryRemover for OpaqueRemover {
    fn name(&self) -> &'static str {
        "opaque"
    }

    fn unavailable_reason(&self) -> Option<String> {
        None
    }

    fn remove(&mut self, image_bytes: &[u8]) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut image = ImageIOService::decode(image_bytes)?.to_rgba8();
        for pixel in image.pixels_mut() {
            pixel[3] = 255;
        }
        ImageIOService::encode_png(&image)
    }
}

/// Primary remover whose runtime always errors
struct CrashingRemover;

impl PrimaryRemover for CrashingRemover {
    fn name(&self) -> &'static str {
        "crashing"
    }

    fn unavailable_reason(&self) -> Option<String> {
        None
    }

    fn remove(&mut self, _image_bytes: &[u8]) -> Result<Vec<u8>> {
        Err(BgRemovalError::inference("session aborted"))
    }
}

fn write_scene(dir: &Path) -> PathBuf {
    let image = RgbaImage::from_fn(60, 40, |x, y| {
        if (20..40).contains(&x) && (10..30).contains(&y) {
            Rgba([10, 10, 200, 255])
        } else {
            Rgba([240, 240, 240, 255])
        }
    });
    let path = dir.join("scene.png");
    image.save(&path).expect("Failed to write scene");
    path
}

#[test]
fn test_available_primary_wins() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = write_scene(temp_dir.path());
    let output = temp_dir.path().join("out.png");

    let calls = Arc::new(AtomicUsize::new(0));
    let remover = OpaqueRemover {
        calls: Arc::clone(&calls),
    };
    let mut processor =
        BackgroundRemovalProcessor::with_primary(RemovalConfig::default(), Box::new(remover))
            .expect("Failed to create processor");

    let report = processor.process_file(&input, &output).expect("Processing failed");

    assert_eq!(report.strategy, Strategy::Primary);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let result = image::open(&output).expect("Output is not an image").to_rgba8();
    assert!(result.pixels().all(|pixel| pixel[3] == 255));
}

#[test]
fn test_crashing_primary_falls_back() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = write_scene(temp_dir.path());
    let output = temp_dir.path().join("out.png");

    let config = RemovalConfig::builder()
        .threshold_percentile(20)
        .build()
        .expect("Invalid config");
    let mut processor =
        BackgroundRemovalProcessor::with_primary(config, Box::new(CrashingRemover))
            .expect("Failed to create processor");

    let report = processor.process_file(&input, &output).expect("Processing failed");

    assert!(report.used_fallback());
    assert_eq!(report.dimensions, Some((60, 40)));
    let result = image::open(&output).expect("Output is not an image").to_rgba8();
    assert!(result.get_pixel(30, 20)[3] > 200);
    assert!(result.get_pixel(0, 0)[3] < 50);
}

#[test]
fn test_fallback_only_never_calls_model() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = write_scene(temp_dir.path());
    let output = temp_dir.path().join("out.png");

    let config = RemovalConfig::builder()
        .model_path(temp_dir.path().join("model.onnx"))
        .fallback_only(true)
        .build()
        .expect("Invalid config");
    let mut processor = BackgroundRemovalProcessor::new(config).expect("Failed to create processor");

    let report = processor.process_file(&input, &output).expect("Processing failed");
    assert!(matches!(report.strategy, Strategy::Fallback { .. }));
}

#[test]
fn test_existing_output_survives_failed_run() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = temp_dir.path().join("garbage.jpg");
    std::fs::write(&input, b"not really a jpeg").expect("Failed to write input");
    let output = temp_dir.path().join("out.png");
    std::fs::write(&output, b"previous result").expect("Failed to write output");

    let mut processor =
        BackgroundRemovalProcessor::with_primary(RemovalConfig::default(), Box::new(CrashingRemover))
            .expect("Failed to create processor");

    assert!(processor.process_file(&input, &output).is_err());
    assert_eq!(
        std::fs::read(&output).expect("Output vanished"),
        b"previous result"
    );
}
