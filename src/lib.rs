//! # 本地图片格式转换工具 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                前端（选择 / 拖入 / 表单 / 预览）            │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ JSON 行协议（CommandResponse）
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕              后端 (Rust)                          │
//! │                                                          │
//! │  ┌─ error ─────── AppError (统一错误类型)                  │
//! │  ├─ host ──────── stdin/stdout IPC 桥                     │
//! │  └─ converter                                            │
//! │      ├─ commands   命令适配                               │
//! │      ├─ service    会话 + 表单 + 单次转换门控              │
//! │      ├─ session    状态机 Empty/Loaded/Converting/...     │
//! │      ├─ loader     类型 / 体积校验、尺寸读取               │
//! │      ├─ pipeline   解码 → 绘制 → PNG/JPEG/WebP 编码        │
//! │      ├─ data_url   Data URL 与体积估算                     │
//! │      └─ view       快照、体积文案、下载文件名               │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`converter`] | 源图加载、格式转换、会话状态与命令 |
//! | [`host`] | 行分隔 JSON 命令桥与设置加载 |

pub mod converter;
pub mod error;
pub mod host;
