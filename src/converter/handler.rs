//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `ImageConverter` 只负责流程编排与配置管理，不持有会话状态。
//! 处理链路固定为：
//! 1. 读取配置快照
//! 2. 加载：类型 / 体积校验 → Data URL → 读取尺寸
//! 3. 转换：解码 → 绘制 → 编码 → 体积估算
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<ConverterConfig>>` 支持运行时替换。
//! - 单次请求内使用“同一配置快照”，避免处理中途配置漂移。
//! - 记录各阶段耗时，便于性能诊断。

use std::sync::{Arc, RwLock};
use std::time::Instant;

use super::source::{ConversionRequest, ConversionResult, SourceFile, SourceImage};
use super::{ConverterConfig, ConverterError};

/// 图片转换器。
pub struct ImageConverter {
    pub(super) config: Arc<RwLock<ConverterConfig>>,
}

impl ImageConverter {
    /// 根据初始配置创建转换器。
    ///
    /// # 示例
    /// ```rust
    /// use image_converter::converter::{ConverterConfig, ImageConverter};
    ///
    /// let converter = ImageConverter::new(ConverterConfig::default())?;
    /// # Ok::<(), image_converter::converter::ConverterError>(())
    /// ```
    pub fn new(config: ConverterConfig) -> Result<Self, ConverterError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(RwLock::new(config)),
        })
    }

    /// 获取配置快照。
    pub fn config_snapshot(&self) -> Result<ConverterConfig, ConverterError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| ConverterError::ResourceLimit("配置读取锁已中毒".to_string()))
    }

    /// 校验后整体替换配置。
    pub fn set_config(&self, config: ConverterConfig) -> Result<(), ConverterError> {
        config.validate()?;
        let mut current = self
            .config
            .write()
            .map_err(|_| ConverterError::ResourceLimit("配置写入锁已中毒".to_string()))?;

        log::info!(
            "⚙️ 已更新转换配置（max_file_size={}, max_pixels={}, max_bytes={}）",
            config.max_file_size,
            config.max_decoded_pixels,
            config.max_decoded_bytes
        );
        *current = config;
        Ok(())
    }

    /// 加载入口：校验文件并读取尺寸。
    pub async fn load(&self, file: SourceFile) -> Result<SourceImage, ConverterError> {
        let config = self.config_snapshot()?;
        let start = Instant::now();

        let source = self.load_source_file(file, &config).await?;

        log::info!(
            "✅ 源图片加载完成 - {} {}x{} {} 字节 load={}ms",
            source.name,
            source.width,
            source.height,
            source.size,
            start.elapsed().as_millis()
        );
        Ok(source)
    }

    /// 转换入口：失败时记录底层原因并原样返回。
    pub async fn convert(
        &self,
        source: &SourceImage,
        request: ConversionRequest,
    ) -> Result<ConversionResult, ConverterError> {
        let config = self.config_snapshot()?;
        let start = Instant::now();

        match self.convert_source(source, request, &config).await {
            Ok(result) => {
                log::info!(
                    "✅ 图片转换完成 - {} → {} total={}ms",
                    source.name,
                    result.format,
                    start.elapsed().as_millis()
                );
                Ok(result)
            }
            Err(err) => {
                log::error!("❌ 图片转换失败 - {}: {}", source.name, err);
                Err(err)
            }
        }
    }
}
