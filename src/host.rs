//! # 宿主 IPC 桥
//!
//! ## 设计思路
//!
//! 扮演 webview 与后端之间的 invoke 通道：每行一条 JSON 命令，每行一条 JSON 响应。
//! 命令按到达顺序逐条执行，与界面单线程事件循环的语义一致。
//!
//! ## 实现思路
//!
//! - 读写端均为泛型，测试中可用内存缓冲替代 stdin/stdout。
//! - 空行忽略；输入结束即退出。
//! - 设置文件路径来自环境变量 `IMAGE_CONVERTER_SETTINGS`，缺省使用默认配置。

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::converter::{ConverterConfig, ConverterServiceState, dispatch_json};
use crate::error::AppError;

pub const SETTINGS_ENV: &str = "IMAGE_CONVERTER_SETTINGS";

/// 按环境变量加载设置。
pub fn load_settings_from_env() -> Result<ConverterConfig, AppError> {
    match std::env::var_os(SETTINGS_ENV) {
        Some(path) => {
            log::info!("⚙️ 读取设置文件: {}", path.to_string_lossy());
            ConverterConfig::from_json_file(&path).map_err(|e| {
                AppError::Settings(format!("{}: {}", path.to_string_lossy(), e))
            })
        }
        None => Ok(ConverterConfig::default()),
    }
}

/// 逐行读取命令并写回响应，直到输入结束。
pub async fn run<R, W>(
    state: &ConverterServiceState,
    reader: R,
    mut writer: W,
) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = dispatch_json(state, line).await;
        if let Some(error) = &response.error {
            log::warn!(
                "⚠️ 命令失败 - code={} stage={}: {}",
                error.code,
                error.stage,
                error.message
            );
        }

        let mut payload = serde_json::to_vec(&response)?;
        payload.push(b'\n');
        writer.write_all(&payload).await?;
        writer.flush().await?;
    }

    log::info!("输入结束，IPC 桥退出");
    Ok(())
}
