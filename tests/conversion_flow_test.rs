// End-to-end session scenarios against the public service API
use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageBuffer, ImageFormat, Rgba};
use image_converter::converter::data_url::parse_data_url;
use image_converter::converter::view::size_ratio_percent;
use image_converter::converter::{
    ConvertOutcome, ConverterError, ConverterServiceState, SkipReason, SourceFile, TargetFormat,
};

fn create_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgba([(x * 2 % 255) as u8, (y * 3 % 255) as u8, ((x + y) % 255) as u8, 255])
    });
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut cursor, ImageFormat::Png)
        .expect("failed to encode test image");
    cursor.into_inner()
}

fn png_file(name: &str, width: u32, height: u32) -> SourceFile {
    SourceFile::new(name, "image/png", create_png_bytes(width, height))
}

#[tokio::test]
async fn load_then_convert_to_jpeg_reports_ratio() {
    let service = ConverterServiceState::new().unwrap();
    let file = png_file("banner.png", 100, 50);
    let source_size = file.bytes.len() as u64;

    let snapshot = service.load_source(file).await.unwrap();
    let source = snapshot.source.expect("source should be loaded");
    assert_eq!((source.width, source.height), (100, 50));
    assert_eq!(source.size, source_size);

    service.set_format(TargetFormat::Jpeg).unwrap();
    service.set_quality(0.8).unwrap();
    let outcome = service.convert().await.unwrap();

    let ConvertOutcome::Completed(result) = outcome else {
        panic!("expected completed conversion, got {:?}", outcome);
    };
    assert_eq!(result.format, TargetFormat::Jpeg);
    assert!(result.size > 0);

    let snapshot = service.snapshot().unwrap();
    let summary = snapshot.result.expect("result should be visible");
    assert_eq!(summary.ratio_percent, size_ratio_percent(result.size, source_size));
    assert_eq!(
        summary.ratio_percent,
        Some((result.size as f64 / source_size as f64 * 100.0).round() as u64)
    );

    let (_, bytes) = parse_data_url(&result.data_url, u64::MAX).unwrap();
    assert_eq!(image::load_from_memory(&bytes).unwrap().dimensions(), (100, 50));
}

#[tokio::test]
async fn dropped_text_file_is_rejected_without_state_change() {
    let service = ConverterServiceState::new().unwrap();

    let result = service
        .load_source(SourceFile::new("notes.txt", "text/plain", b"just text".to_vec()))
        .await;

    assert!(matches!(result, Err(ConverterError::InvalidFileType(_))));
    let snapshot = service.snapshot().unwrap();
    assert!(snapshot.source.is_none());
    assert!(snapshot.notice.is_none());
}

#[tokio::test]
async fn rapid_double_convert_runs_once() {
    let service = ConverterServiceState::new().unwrap();
    service.load_source(png_file("a.png", 64, 64)).await.unwrap();
    service.set_format(TargetFormat::Webp).unwrap();

    let (first, second) = tokio::join!(service.convert(), service.convert());
    let outcomes = [first.unwrap(), second.unwrap()];

    let completed = outcomes
        .iter()
        .filter(|o| matches!(o, ConvertOutcome::Completed(_)))
        .count();
    let skipped = outcomes
        .iter()
        .filter(|o| **o == ConvertOutcome::Skipped(SkipReason::InFlight))
        .count();
    assert_eq!((completed, skipped), (1, 1));
    assert!(!service.snapshot().unwrap().converting);
}

#[tokio::test]
async fn new_source_clears_previous_result() {
    let service = ConverterServiceState::new().unwrap();
    service.load_source(png_file("a.png", 10, 10)).await.unwrap();
    service.convert().await.unwrap();
    assert!(service.snapshot().unwrap().result.is_some());

    let snapshot = service.load_source(png_file("b.png", 20, 5)).await.unwrap();

    assert!(snapshot.result.is_none());
    assert_eq!(snapshot.source.map(|s| (s.width, s.height)), Some((20, 5)));
}

#[tokio::test]
async fn convert_leaves_source_untouched() {
    let service = ConverterServiceState::new().unwrap();
    let before = service.load_source(png_file("a.png", 30, 30)).await.unwrap();

    service.set_format(TargetFormat::Jpeg).unwrap();
    service.convert().await.unwrap();

    let after = service.snapshot().unwrap().source.unwrap();
    let before = before.source.unwrap();
    assert_eq!(before.preview, after.preview);
    assert_eq!((before.width, before.height, before.size), (after.width, after.height, after.size));
}

#[tokio::test]
async fn png_output_is_identical_across_quality() {
    let service = ConverterServiceState::new().unwrap();
    service.load_source(png_file("a.png", 33, 17)).await.unwrap();
    service.set_format(TargetFormat::Png).unwrap();

    service.set_quality(0.1).unwrap();
    let low = service.convert().await.unwrap();
    service.set_quality(0.9).unwrap();
    let high = service.convert().await.unwrap();

    match (low, high) {
        (ConvertOutcome::Completed(low), ConvertOutcome::Completed(high)) => {
            assert_eq!(low.data_url, high.data_url);
        }
        other => panic!("expected two completed conversions, got {:?}", other),
    }
}

#[tokio::test]
async fn reset_returns_to_empty_session() {
    let service = ConverterServiceState::new().unwrap();
    service.load_source(png_file("a.png", 8, 8)).await.unwrap();
    service.convert().await.unwrap();

    let snapshot = service.reset().unwrap();

    assert!(snapshot.source.is_none());
    assert!(snapshot.result.is_none());
    assert!(!snapshot.converting);
    assert!(!snapshot.can_convert);
    assert!(service.download().unwrap().is_none());
}

#[tokio::test]
async fn load_from_path_sniffs_declared_type() {
    let dir = std::env::temp_dir();
    let image_path = dir.join(format!("image-converter-test-{}.png", std::process::id()));
    let text_path = dir.join(format!("image-converter-test-{}.txt", std::process::id()));
    std::fs::write(&image_path, create_png_bytes(7, 3)).unwrap();
    std::fs::write(&text_path, b"plain text, no signature").unwrap();

    let service = ConverterServiceState::new().unwrap();
    let snapshot = service.load_source_path(&image_path).await.unwrap();
    let rejected = service.load_source_path(&text_path).await;

    let _ = std::fs::remove_file(&image_path);
    let _ = std::fs::remove_file(&text_path);

    let source = snapshot.source.unwrap();
    assert_eq!(source.mime_type, "image/png");
    assert_eq!((source.width, source.height), (7, 3));
    assert!(matches!(rejected, Err(ConverterError::InvalidFileType(_))));
}

#[tokio::test]
async fn missing_path_is_io_error() {
    let service = ConverterServiceState::new().unwrap();

    let result = service
        .load_source_path("/definitely/not/here/image-converter.png")
        .await;

    assert!(matches!(result, Err(ConverterError::Io(_))));
}
