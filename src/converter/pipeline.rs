//! # 解码、绘制与编码流水线
//!
//! ## 设计思路
//!
//! 复刻“画布重编码”的语义：源图按原始尺寸解码，绘制到同尺寸的离屏 RGBA 表面，
//! 原点对齐、不缩放、不裁剪、不做色彩变换，再按目标格式编码。
//!
//! ## 实现思路
//!
//! 1. 解析源 Data URL 并完整解码
//! 2. 按像素 / 内存上限分配绘制表面，失败即“绘制表面不可用”
//! 3. 在 (0,0) 绘制
//! 4. PNG 无损；JPEG 先按画布行为把透明区域合成到黑色；WebP 使用有损编码
//! 5. 生成结果 Data URL 并估算体积

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

use super::data_url::{encode_data_url, estimate_size, parse_data_url};
use super::source::{ConversionRequest, ConversionResult, SourceImage, TargetFormat};
use super::{ConverterConfig, ConverterError, ImageConverter};

impl ImageConverter {
    /// 执行一次完整转换，不修改 `source`。
    pub(crate) async fn convert_source(
        &self,
        source: &SourceImage,
        request: ConversionRequest,
        config: &ConverterConfig,
    ) -> Result<ConversionResult, ConverterError> {
        let decoded = Self::decode_surface(&source.data_url).await?;
        let (width, height) = decoded.dimensions();

        let mut surface = Self::allocate_surface(width, height, config)?;
        image::imageops::replace(&mut surface, &decoded.to_rgba8(), 0, 0);

        let encoded = Self::encode_surface(surface, request)?;
        let data_url = encode_data_url(request.format.mime_type(), &encoded);
        let size = estimate_size(&data_url)?;

        log::info!(
            "🎨 编码完成 - 格式: {} 质量: {:.2} 尺寸: {}x{} 实际: {} 字节 估算: {} 字节",
            request.format,
            request.quality.value(),
            width,
            height,
            encoded.len(),
            size
        );

        Ok(ConversionResult {
            data_url,
            format: request.format,
            size,
        })
    }

    /// 将源 Data URL 解码为像素。
    ///
    /// 体积上限已在加载阶段按真实字节数校验，这里不再重复；
    /// 此阶段的任何失败都归为转换失败。
    async fn decode_surface(data_url: &str) -> Result<DynamicImage, ConverterError> {
        tokio::task::yield_now().await;

        let (_, bytes) = parse_data_url(data_url, u64::MAX)
            .map_err(|e| ConverterError::ConversionFailure(format!("源数据无效：{}", e)))?;
        image::load_from_memory(&bytes)
            .map_err(|e| ConverterError::ConversionFailure(format!("图片解码失败：{}", e)))
    }

    /// 分配与源图同尺寸的离屏表面（初始为全透明黑）。
    pub(crate) fn allocate_surface(
        width: u32,
        height: u32,
        config: &ConverterConfig,
    ) -> Result<RgbaImage, ConverterError> {
        if width == 0 || height == 0 {
            return Err(ConverterError::RasterizationUnavailable(format!(
                "表面尺寸为空：{}x{}",
                width, height
            )));
        }

        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| ConverterError::RasterizationUnavailable("像素数溢出".to_string()))?;
        if pixels > config.max_decoded_pixels {
            return Err(ConverterError::RasterizationUnavailable(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, config.max_decoded_pixels
            )));
        }

        let estimated = pixels
            .checked_mul(4)
            .ok_or_else(|| ConverterError::RasterizationUnavailable("表面内存估算溢出".to_string()))?;
        if estimated > config.max_decoded_bytes {
            return Err(ConverterError::RasterizationUnavailable(format!(
                "表面预计内存过大：{:.2} MB（限制：{:.2} MB）",
                estimated as f64 / 1024.0 / 1024.0,
                config.max_decoded_bytes as f64 / 1024.0 / 1024.0
            )));
        }

        Ok(RgbaImage::new(width, height))
    }

    /// 按目标格式编码表面像素。PNG 忽略质量参数。
    pub(crate) fn encode_surface(
        surface: RgbaImage,
        request: ConversionRequest,
    ) -> Result<Vec<u8>, ConverterError> {
        let mut buf = Cursor::new(Vec::new());

        match request.format {
            TargetFormat::Png => {
                surface
                    .write_to(&mut buf, ImageFormat::Png)
                    .map_err(|e| ConverterError::ConversionFailure(format!("PNG 编码失败：{}", e)))?;
            }
            TargetFormat::Jpeg => {
                let encoder =
                    JpegEncoder::new_with_quality(&mut buf, request.quality.as_jpeg_quality());
                flatten_onto_black(&surface)
                    .write_with_encoder(encoder)
                    .map_err(|e| ConverterError::ConversionFailure(format!("JPEG 编码失败：{}", e)))?;
            }
            TargetFormat::Webp => {
                let image = DynamicImage::ImageRgba8(surface);
                let encoder = webp::Encoder::from_image(&image).map_err(|e| {
                    ConverterError::ConversionFailure(format!("WebP 编码器初始化失败：{}", e))
                })?;
                let memory = encoder
                    .encode_simple(false, request.quality.as_webp_quality())
                    .map_err(|e| ConverterError::ConversionFailure(format!("WebP 编码失败：{:?}", e)))?;
                return Ok(memory.to_vec());
            }
        }

        Ok(buf.into_inner())
    }
}

/// 画布导出 JPEG 时透明像素按预乘后的黑色输出。
fn flatten_onto_black(surface: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(surface.width(), surface.height(), |x, y| {
        let Rgba([r, g, b, a]) = *surface.get_pixel(x, y);
        let scale = |c: u8| ((u16::from(c) * u16::from(a) + 127) / 255) as u8;
        Rgb([scale(r), scale(g), scale(b)])
    })
}
