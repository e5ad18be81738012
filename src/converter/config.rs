//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `ConverterConfig`：文件体积上限、解码像素与内存上限、
//! 以及表单的默认目标格式与质量。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的配置。
//! - 支持从 JSON 设置文件反序列化，缺省字段回落到默认值。
//! - `validate` 在设置生效前做范围校验，拒绝明显不合理的值。

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::source::{Quality, TargetFormat};
use super::ConverterError;

/// 图片转换配置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// 读取源文件时允许的最大体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 绘制表面允许的内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
    /// 表单默认目标格式。
    pub default_format: TargetFormat,
    /// 表单默认质量。
    pub default_quality: Quality,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            default_format: TargetFormat::Webp,
            default_quality: Quality::default(),
        }
    }
}

impl ConverterConfig {
    /// 从 JSON 字符串解析配置并校验。
    pub fn from_json_str(content: &str) -> Result<Self, ConverterError> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| ConverterError::InvalidRequest(format!("解析设置失败：{}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 设置文件加载配置。
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConverterError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConverterError> {
        if self.max_file_size < 1024 {
            return Err(ConverterError::InvalidRequest(
                "max_file_size 不能小于 1KB".to_string(),
            ));
        }
        if self.max_decoded_pixels == 0 {
            return Err(ConverterError::InvalidRequest(
                "max_decoded_pixels 必须大于 0".to_string(),
            ));
        }
        if self.max_decoded_bytes < 4 {
            return Err(ConverterError::InvalidRequest(
                "max_decoded_bytes 至少需要容纳一个 RGBA 像素".to_string(),
            ));
        }
        Ok(())
    }
}
