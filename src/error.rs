//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，宿主层（IPC 桥、设置加载）统一返回
//! `Result<T, AppError>`，避免各处 `.map_err(|e| e.to_string())` 的不一致写法。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `ConverterError` 提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize` 将错误序列化为字符串，便于直接回传前端。

use serde::Serialize;

use crate::converter::ConverterError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 转换流水线错误（加载 / 解码 / 编码）
    #[error("{0}")]
    Converter(#[from] ConverterError),

    /// 标准输入输出等 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 设置文件不可用
    #[error("设置不可用: {0}")]
    Settings(String),

    /// 响应序列化失败
    #[error("序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
