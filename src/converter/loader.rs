//! # 加载与校验模块
//!
//! ## 设计思路
//!
//! 接收用户选择 / 拖入的文件，尽可能早地完成校验：先看声明类型，再看体积，
//! 最后才把字节编码为 Data URL 并读取尺寸。任何一步失败都不产生半成品。
//!
//! ## 实现思路
//!
//! - 类型：只检查 `image/` 前缀，不做签名级校验。
//! - 体积：超过 `max_file_size` 直接拒绝。
//! - 尺寸：从内存中的图片头读取宽高，读取是可等待的单次操作。

use std::io::Cursor;

use super::data_url::encode_data_url;
use super::source::{SourceFile, SourceImage};
use super::{ConverterConfig, ConverterError, ImageConverter};

impl ImageConverter {
    /// 校验并加载源文件，成功时返回完整的 `SourceImage`。
    pub(crate) async fn load_source_file(
        &self,
        file: SourceFile,
        config: &ConverterConfig,
    ) -> Result<SourceImage, ConverterError> {
        log::info!(
            "📁 开始加载源图片 - 名称: {} 类型: {} 大小: {} 字节",
            file.name,
            file.mime_type,
            file.bytes.len()
        );

        Self::validate_declared_type(&file)?;
        Self::validate_file_size(&file, config)?;

        let mime_type = file.mime_type.trim().to_string();
        let data_url = encode_data_url(&mime_type, &file.bytes);
        let (width, height) = Self::decode_dimensions(&file.bytes).await?;

        Ok(SourceImage {
            name: file.name,
            mime_type,
            size: file.bytes.len() as u64,
            width,
            height,
            data_url,
            bytes: file.bytes,
        })
    }

    fn validate_declared_type(file: &SourceFile) -> Result<(), ConverterError> {
        if !file.is_image() {
            return Err(ConverterError::InvalidFileType(file.mime_type.clone()));
        }
        Ok(())
    }

    fn validate_file_size(
        file: &SourceFile,
        config: &ConverterConfig,
    ) -> Result<(), ConverterError> {
        let size = file.bytes.len() as u64;
        if size > config.max_file_size {
            return Err(ConverterError::ResourceLimit(format!(
                "文件过大：{:.2} MB（限制：{:.2} MB）",
                size as f64 / 1024.0 / 1024.0,
                config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }
        Ok(())
    }

    /// 读取图片固有尺寸。
    ///
    /// 先让出一次执行权，等价于浏览器中 `onload` 回调前的挂起点。
    async fn decode_dimensions(bytes: &[u8]) -> Result<(u32, u32), ConverterError> {
        tokio::task::yield_now().await;

        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ConverterError::SourceDecode(format!("无法识别图片格式：{}", e)))?;

        reader
            .into_dimensions()
            .map_err(|e| ConverterError::SourceDecode(format!("无法读取图片尺寸：{}", e)))
    }
}
