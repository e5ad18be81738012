//! # 图片格式转换模块（converter）
//!
//! ## 设计思路
//!
//! 该模块将“文件接收 → 加载校验 → 解码绘制编码 → 会话状态 → 命令暴露”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `commands`：仅做 IPC 入参/出参适配（薄封装）
//! - `service`：承载可注入状态（`ConverterServiceState`）
//! - `session`：会话状态机（唯一权威状态）
//! - `handler`：编排加载与转换流程
//! - `loader`：负责类型 / 体积校验与尺寸读取
//! - `pipeline`：负责解码、离屏绘制与按格式编码
//! - `data_url`：Data URL 编解码与体积估算
//! - `view`：界面快照与展示规则
//! - `config/error/source`：配置、错误、数据模型
//!
//! ## 调用链
//!
//! ```text
//! 宿主 IPC
//!    ↓
//! commands.rs（参数适配）
//!    ↓
//! service.rs（会话 + 表单，单次转换门控）
//!    ↓
//! handler.rs（统一编排 + 阶段耗时日志）
//!    ├─ loader.rs（类型 / 体积校验 + 尺寸）
//!    └─ pipeline.rs（解码 + 绘制 + 编码 + 估算）
//!    ↓
//! SessionSnapshot / CommandError 返回给前端
//! ```

pub mod commands;
mod config;
pub mod data_url;
mod error;
mod handler;
mod loader;
mod pipeline;
mod service;
pub mod session;
mod source;
pub mod view;

pub use commands::{Command, CommandError, CommandResponse, dispatch, dispatch_json};
pub use config::ConverterConfig;
pub use error::ConverterError;
pub use handler::ImageConverter;
pub use service::{ConvertOutcome, ConverterServiceState};
pub use session::{Session, SessionState, SkipReason};
pub use source::{
    ConversionRequest, ConversionResult, Quality, SourceFile, SourceImage, TargetFormat,
};
pub use view::{DownloadLink, SessionSnapshot};
