//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入”和“会话内模型”解耦：
//! - `SourceFile` 表示用户选择 / 拖入的文件（名称、声明类型、原始字节）
//! - `SourceImage` 表示已接受并解码出尺寸的源图片
//! - `ConversionRequest` / `ConversionResult` 表示一次转换的输入与输出

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ConverterError;

/// 文件签名无法识别时使用的声明类型。
pub const UNKNOWN_MIME_TYPE: &str = "application/octet-stream";

/// 目标格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Png,
    Jpeg,
    Webp,
}

impl TargetFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    /// 下载文件扩展名（JPEG 使用 `jpeg` 而非 `jpg`）。
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Webp => "webp",
        }
    }

    /// 有损格式才使用质量参数。
    pub fn is_lossy(self) -> bool {
        matches!(self, Self::Jpeg | Self::Webp)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Webp => "WEBP",
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TargetFormat {
    type Err = ConverterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "png" | "image/png" => Ok(Self::Png),
            "jpeg" | "jpg" | "image/jpeg" => Ok(Self::Jpeg),
            "webp" | "image/webp" => Ok(Self::Webp),
            other => Err(ConverterError::InvalidRequest(format!(
                "未知目标格式：{}（可选：png / jpeg / webp）",
                other
            ))),
        }
    }
}

/// 有损压缩质量，取值 [0.1, 1.0]，步长 0.05。
///
/// 内部按步数存储（2..=20），保证相等比较与序列化稳定。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Quality(u8);

impl Quality {
    const STEPS_PER_UNIT: f64 = 20.0;
    const MIN_STEPS: u8 = 2;
    const MAX_STEPS: u8 = 20;

    pub const MIN: Quality = Quality(Self::MIN_STEPS);
    pub const MAX: Quality = Quality(Self::MAX_STEPS);

    /// 校验并吸附到最近的 0.05 刻度。
    pub fn new(value: f64) -> Result<Self, ConverterError> {
        if !value.is_finite() || !(0.1 - 1e-9..=1.0 + 1e-9).contains(&value) {
            return Err(ConverterError::InvalidRequest(format!(
                "质量必须在 0.10 ~ 1.00 之间：{}",
                value
            )));
        }

        let steps = (value * Self::STEPS_PER_UNIT).round() as u8;
        Ok(Self(steps.clamp(Self::MIN_STEPS, Self::MAX_STEPS)))
    }

    pub fn value(self) -> f64 {
        f64::from(self.0) / Self::STEPS_PER_UNIT
    }

    /// JPEG 编码器使用的 1..=100 质量。
    pub fn as_jpeg_quality(self) -> u8 {
        self.0 * 5
    }

    /// WebP 编码器使用的 0..=100 浮点质量。
    pub fn as_webp_quality(self) -> f32 {
        f32::from(self.0) * 5.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(18)
    }
}

impl TryFrom<f64> for Quality {
    type Error = ConverterError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quality> for f64 {
    fn from(quality: Quality) -> Self {
        quality.value()
    }
}

/// 用户选择或拖入的文件。
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    /// 声明的内容类型（等价于浏览器 `File.type`）。
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// 从本地路径读取文件，声明类型按文件签名推断。
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ConverterError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let mime_type = infer::get(&bytes)
            .map(|kind| kind.mime_type())
            .unwrap_or(UNKNOWN_MIME_TYPE)
            .to_string();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            name,
            mime_type,
            bytes,
        })
    }

    /// 仅做 MIME 前缀检查，不做更深层校验。
    pub fn is_image(&self) -> bool {
        is_image_mime_type(&self.mime_type)
    }
}

pub(crate) fn is_image_mime_type(mime_type: &str) -> bool {
    mime_type.trim().to_ascii_lowercase().starts_with("image/")
}

/// 已接受的源图片。
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub name: String,
    pub mime_type: String,
    /// 原始文件字节数。
    pub size: u64,
    pub width: u32,
    pub height: u32,
    /// 预览用 Data URL，同时作为转换阶段的解码输入。
    pub data_url: String,
    pub bytes: Vec<u8>,
}

/// 一次转换请求。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub format: TargetFormat,
    pub quality: Quality,
}

impl ConversionRequest {
    pub fn new(format: TargetFormat, quality: Quality) -> Self {
        Self { format, quality }
    }
}

/// 转换结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    /// 编码结果的 Data URL（可预览、可下载）。
    pub data_url: String,
    pub format: TargetFormat,
    /// 由 Data URL 长度估算的字节数。
    pub size: u64,
}
