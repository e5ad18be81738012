//! # 本地图片格式转换工具 — 应用入口
//!
//! 本文件仅负责日志初始化、设置加载与 IPC 桥启动。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use image_converter::converter::ConverterServiceState;
use image_converter::error::AppError;
use image_converter::host;
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("setup: begin");
    let config = host::load_settings_from_env()?;
    let state = ConverterServiceState::with_config(config)?;
    log::info!("setup: converter service ready");

    host::run(&state, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}
