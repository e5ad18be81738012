//! # 视图模型
//!
//! 界面渲染所需的只读快照与展示规则：质量滑块可见性、体积文案、压缩比、
//! 下载文件名。这里不持有状态，全部由 `Session` 与表单选择派生。

use serde::Serialize;

use super::session::Session;
use super::source::{ConversionRequest, TargetFormat};

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// 质量滑块仅对有损格式显示。
pub fn quality_visible(format: TargetFormat) -> bool {
    format.is_lossy()
}

/// 人类可读体积：1024 进制，最多两位小数并去掉末尾的 0。
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut index = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && index < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        index += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[index])
}

/// 结果体积占源文件体积的百分比（四舍五入）。
pub fn size_ratio_percent(result_size: u64, source_size: u64) -> Option<u64> {
    if source_size == 0 {
        return None;
    }
    Some((result_size as f64 / source_size as f64 * 100.0).round() as u64)
}

/// `converted-<去掉扩展名的原文件名>.<目标扩展名>`
pub fn download_file_name(source_name: &str, format: TargetFormat) -> String {
    let stem = match source_name.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() && !ext.contains('/') => stem,
        _ => source_name,
    };
    format!("converted-{}.{}", stem, format.extension())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadLink {
    pub file_name: String,
    pub href: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceSummary {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub size_label: String,
    pub width: u32,
    pub height: u32,
    pub preview: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultSummary {
    pub format: TargetFormat,
    pub size: u64,
    pub size_label: String,
    pub ratio_percent: Option<u64>,
    pub preview: String,
    pub download: DownloadLink,
}

/// 整个会话的序列化快照，前端据此渲染。
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub source: Option<SourceSummary>,
    pub format: TargetFormat,
    pub quality: f64,
    pub quality_visible: bool,
    pub converting: bool,
    pub can_convert: bool,
    pub result: Option<ResultSummary>,
    pub notice: Option<String>,
}

impl SessionSnapshot {
    pub fn build(session: &Session, form: ConversionRequest) -> Self {
        let source = session.source().map(|source| SourceSummary {
            name: source.name.clone(),
            mime_type: source.mime_type.clone(),
            size: source.size,
            size_label: format_bytes(source.size),
            width: source.width,
            height: source.height,
            preview: source.data_url.clone(),
        });

        let result = session.source().zip(session.result()).map(|(source, result)| ResultSummary {
            format: result.format,
            size: result.size,
            size_label: format_bytes(result.size),
            ratio_percent: size_ratio_percent(result.size, source.size),
            preview: result.data_url.clone(),
            download: DownloadLink {
                file_name: download_file_name(&source.name, result.format),
                href: result.data_url.clone(),
            },
        });

        Self {
            can_convert: source.is_some() && !session.is_converting(),
            source,
            format: form.format,
            quality: form.quality.value(),
            quality_visible: quality_visible(form.format),
            converting: session.is_converting(),
            result,
            notice: session.notice().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::source::{ConversionResult, Quality, SourceImage};

    #[test]
    fn quality_visible_only_for_lossy_formats() {
        assert!(!quality_visible(TargetFormat::Png));
        assert!(quality_visible(TargetFormat::Jpeg));
        assert!(quality_visible(TargetFormat::Webp));
    }

    #[test]
    fn format_bytes_matches_display_rules() {
        assert_eq!(format_bytes(0), "0 Bytes");
        assert_eq!(format_bytes(734), "734 Bytes");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(2000), "1.95 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5 MB");
    }

    #[test]
    fn ratio_rounds_to_whole_percent() {
        assert_eq!(size_ratio_percent(734, 2000), Some(37));
        assert_eq!(size_ratio_percent(2000, 2000), Some(100));
        assert_eq!(size_ratio_percent(10, 0), None);
    }

    #[test]
    fn download_name_strips_last_extension() {
        assert_eq!(
            download_file_name("holiday.photo.png", TargetFormat::Jpeg),
            "converted-holiday.photo.jpeg"
        );
        assert_eq!(download_file_name("scan", TargetFormat::Webp), "converted-scan.webp");
        assert_eq!(download_file_name("logo.PNG", TargetFormat::Png), "converted-logo.png");
        assert_eq!(download_file_name(".png", TargetFormat::Png), "converted-.png");
        assert_eq!(download_file_name("draft.", TargetFormat::Webp), "converted-draft..webp");
    }

    #[test]
    fn snapshot_reflects_converted_session() {
        let mut session = Session::new();
        session.load(SourceImage {
            name: "cat.png".to_string(),
            mime_type: "image/png".to_string(),
            size: 2000,
            width: 100,
            height: 50,
            data_url: "data:image/png;base64,AAAA".to_string(),
            bytes: Vec::new(),
        });
        let request = ConversionRequest::new(TargetFormat::Jpeg, Quality::new(0.8).unwrap());
        let job = session.begin_convert(request).unwrap();
        session.finish_convert(
            job.id,
            Ok(ConversionResult {
                data_url: "data:image/jpeg;base64,BBBB".to_string(),
                format: TargetFormat::Jpeg,
                size: 734,
            }),
        );

        let snapshot = SessionSnapshot::build(&session, request);

        assert!(snapshot.quality_visible);
        assert!(snapshot.can_convert);
        let result = snapshot.result.expect("result should be present");
        assert_eq!(result.ratio_percent, Some(37));
        assert_eq!(result.download.file_name, "converted-cat.jpeg");
        assert_eq!(result.download.href, "data:image/jpeg;base64,BBBB");
    }

    #[test]
    fn empty_snapshot_disables_convert() {
        let session = Session::new();
        let form = ConversionRequest::new(TargetFormat::Png, Quality::default());

        let snapshot = SessionSnapshot::build(&session, form);

        assert!(snapshot.source.is_none());
        assert!(!snapshot.can_convert);
        assert!(!snapshot.quality_visible);
        assert!(!snapshot.converting);
    }
}
