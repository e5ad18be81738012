//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载转换链路（加载 → 解码 → 绘制 → 编码）中的所有错误来源。
//! 每个分支都能给出稳定的 `code` / `stage`，以及面向用户的提示文案 `notice`，
//! 底层原因只进入日志，不直接暴露给界面。

/// 图片转换统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum ConverterError {
    /// 声明的 MIME 类型不是 `image/*`。
    #[error("不支持的文件类型：{0}")]
    InvalidFileType(String),

    /// 已接受的文件无法解码出像素尺寸。
    #[error("源图片解码失败：{0}")]
    SourceDecode(String),

    /// 离屏绘制表面无法分配。
    #[error("无法创建绘制表面：{0}")]
    RasterizationUnavailable(String),

    /// 解码 / 绘制 / 编码阶段的其余失败。
    #[error("图片转换失败：{0}")]
    ConversionFailure(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    /// 非法的格式字符串或质量参数。
    #[error("请求参数错误：{0}")]
    InvalidRequest(String),

    #[error("文件错误：{0}")]
    Io(#[from] std::io::Error),
}

impl ConverterError {
    /// 稳定错误码，供命令层与前端分支判断。
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFileType(_) => "invalid_file_type",
            Self::SourceDecode(_) => "source_decode",
            Self::RasterizationUnavailable(_) => "rasterization_unavailable",
            Self::ConversionFailure(_) => "conversion_failure",
            Self::ResourceLimit(_) => "resource_limit",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Io(_) => "io",
        }
    }

    /// 错误发生的阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidFileType(_) | Self::ResourceLimit(_) | Self::Io(_) => "load",
            Self::SourceDecode(_) => "decode",
            Self::RasterizationUnavailable(_) | Self::ConversionFailure(_) => "convert",
            Self::InvalidRequest(_) => "request",
        }
    }

    /// 面向用户的提示文案（阻塞式弹窗内容）。
    ///
    /// 转换类失败统一为一条通用提示，具体原因只写日志。
    pub fn notice(&self) -> String {
        match self {
            Self::InvalidFileType(_) => "请选择图片文件".to_string(),
            Self::SourceDecode(_) => "无法读取该图片，请换一个文件".to_string(),
            Self::RasterizationUnavailable(_) => "无法创建绘制画布，转换已中止".to_string(),
            Self::ConversionFailure(_) => "图片转换失败，请重试".to_string(),
            Self::ResourceLimit(detail) | Self::InvalidRequest(detail) => detail.clone(),
            Self::Io(_) => "无法读取文件".to_string(),
        }
    }
}
