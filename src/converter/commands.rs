//! # 命令层
//!
//! ## 设计思路
//!
//! 命令层仅做 IPC 参数接收与结果返回，不承载业务逻辑。
//! 所有实际处理交由 `ConverterServiceState`，保持命令函数薄、稳定、易测试。

use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::service::{ConvertOutcome, ConverterServiceState};
use super::source::{SourceFile, TargetFormat};
use super::{ConverterConfig, ConverterError};

/// 前端可调用的命令。
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// 选择或拖入文件：文件内容以 base64 传入。
    LoadSource {
        name: String,
        mime_type: String,
        data_base64: String,
    },
    LoadSourcePath {
        path: String,
    },
    SetFormat {
        format: String,
    },
    SetQuality {
        quality: f64,
    },
    Convert,
    Reset,
    Snapshot,
    Download,
    /// 读取当前运行时配置。
    GetConfig,
    /// 整体替换运行时配置，缺省字段取默认值。
    SetConfig {
        config: ConverterConfig,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct CommandError {
    pub code: &'static str,
    pub stage: &'static str,
    pub message: String,
}

impl From<ConverterError> for CommandError {
    fn from(error: ConverterError) -> Self {
        Self {
            code: error.code(),
            stage: error.stage(),
            message: error.notice(),
        }
    }
}

/// 统一响应包：`{"ok": true, "data": ...}` 或 `{"ok": false, "error": {...}}`。
#[derive(Debug, Clone, Serialize)]
pub struct CommandResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl CommandResponse {
    fn success(data: Value) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    fn failure(error: CommandError) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error),
        }
    }
}

/// 执行单条命令。
pub async fn dispatch(state: &ConverterServiceState, command: Command) -> CommandResponse {
    match execute(state, command).await {
        Ok(data) => CommandResponse::success(data),
        Err(err) => CommandResponse::failure(err),
    }
}

/// 解析一行 JSON 命令并执行；解析失败同样返回结构化错误。
pub async fn dispatch_json(state: &ConverterServiceState, line: &str) -> CommandResponse {
    match serde_json::from_str::<Command>(line) {
        Ok(command) => dispatch(state, command).await,
        Err(e) => CommandResponse::failure(CommandError {
            code: "invalid_command",
            stage: "request",
            message: format!("无法解析命令：{}", e),
        }),
    }
}

async fn execute(state: &ConverterServiceState, command: Command) -> Result<Value, CommandError> {
    match command {
        Command::LoadSource {
            name,
            mime_type,
            data_base64,
        } => {
            let bytes = general_purpose::STANDARD
                .decode(data_base64.trim())
                .map_err(|e| {
                    ConverterError::InvalidRequest(format!("文件内容不是合法的 base64：{}", e))
                })?;
            let snapshot = state
                .load_source(SourceFile::new(name, mime_type, bytes))
                .await?;
            to_value(&snapshot)
        }
        Command::LoadSourcePath { path } => to_value(&state.load_source_path(path).await?),
        Command::SetFormat { format } => {
            let format: TargetFormat = format.parse()?;
            to_value(&state.set_format(format)?)
        }
        Command::SetQuality { quality } => to_value(&state.set_quality(quality)?),
        Command::Convert => {
            let outcome = match state.convert().await? {
                ConvertOutcome::Completed(_) => serde_json::json!({ "status": "completed" }),
                ConvertOutcome::Skipped(reason) => {
                    serde_json::json!({ "status": "skipped", "reason": reason })
                }
                ConvertOutcome::Discarded => serde_json::json!({ "status": "discarded" }),
            };
            let snapshot = to_value(&state.snapshot()?)?;
            Ok(serde_json::json!({ "outcome": outcome, "session": snapshot }))
        }
        Command::Reset => to_value(&state.reset()?),
        Command::Snapshot => to_value(&state.snapshot()?),
        Command::Download => to_value(&state.download()?),
        Command::GetConfig => to_value(&state.config()?),
        Command::SetConfig { config } => to_value(&state.set_config(config)?),
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, CommandError> {
    serde_json::to_value(value).map_err(|e| CommandError {
        code: "serialize",
        stage: "response",
        message: format!("序列化响应失败：{}", e),
    })
}
