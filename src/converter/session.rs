//! # 会话状态机
//!
//! ## 设计思路
//!
//! 会话只有一个权威持有者，状态用带数据的枚举表达，而不是若干互相独立的标志位，
//! 从类型上排除“转换中但没有源图”这类不可能组合。
//!
//! ```text
//! Empty ──load──▶ Loaded ──begin──▶ Converting ──ok──▶ Converted
//!                   ▲                   │
//!                   │                   └──err──▶ Failed（保留源图）
//!   任意状态 ──load──▶ Loaded      任意状态 ──reset──▶ Empty
//! ```
//!
//! ## 实现思路
//!
//! - 每次 `begin_convert` 分配一个递增的任务号。
//! - `finish_convert` 只接受当前正在进行的任务号，重置或换图后迟到的结果会被丢弃。
//! - 所有迁移都是对状态值的纯函数，不做 I/O。

use std::sync::Arc;

use super::source::{ConversionRequest, ConversionResult, SourceImage};

/// 会话的五种逻辑状态。
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    Empty,
    Loaded {
        source: Arc<SourceImage>,
    },
    Converting {
        source: Arc<SourceImage>,
        request: ConversionRequest,
        job_id: u64,
    },
    Converted {
        source: Arc<SourceImage>,
        result: ConversionResult,
    },
    Failed {
        source: Arc<SourceImage>,
        notice: String,
    },
}

/// 已开始的转换任务。
#[derive(Debug, Clone)]
pub struct ConvertJob {
    pub id: u64,
    pub source: Arc<SourceImage>,
    pub request: ConversionRequest,
}

/// 转换触发被忽略的原因（对应界面上按钮处于禁用状态）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoSource,
    InFlight,
}

#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
    next_job_id: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// 新源图整体替换旧源图，并清空任何已有结果。
    pub fn load(&mut self, source: SourceImage) {
        self.state = SessionState::Loaded {
            source: Arc::new(source),
        };
    }

    pub fn begin_convert(&mut self, request: ConversionRequest) -> Result<ConvertJob, SkipReason> {
        let source = match &self.state {
            SessionState::Empty => return Err(SkipReason::NoSource),
            SessionState::Converting { .. } => return Err(SkipReason::InFlight),
            SessionState::Loaded { source }
            | SessionState::Converted { source, .. }
            | SessionState::Failed { source, .. } => Arc::clone(source),
        };

        self.next_job_id += 1;
        let job_id = self.next_job_id;
        self.state = SessionState::Converting {
            source: Arc::clone(&source),
            request,
            job_id,
        };

        Ok(ConvertJob {
            id: job_id,
            source,
            request,
        })
    }

    /// 提交任务结果；返回 `false` 表示任务已过期、结果被丢弃。
    pub fn finish_convert(
        &mut self,
        job_id: u64,
        outcome: Result<ConversionResult, String>,
    ) -> bool {
        let source = match &self.state {
            SessionState::Converting {
                source,
                job_id: current,
                ..
            } if *current == job_id => Arc::clone(source),
            _ => return false,
        };

        self.state = match outcome {
            Ok(result) => SessionState::Converted { source, result },
            Err(notice) => SessionState::Failed { source, notice },
        };
        true
    }

    pub fn reset(&mut self) {
        self.state = SessionState::Empty;
    }

    pub fn source(&self) -> Option<&SourceImage> {
        match &self.state {
            SessionState::Empty => None,
            SessionState::Loaded { source }
            | SessionState::Converting { source, .. }
            | SessionState::Converted { source, .. }
            | SessionState::Failed { source, .. } => Some(source.as_ref()),
        }
    }

    pub fn result(&self) -> Option<&ConversionResult> {
        match &self.state {
            SessionState::Converted { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn is_converting(&self) -> bool {
        matches!(self.state, SessionState::Converting { .. })
    }

    pub fn notice(&self) -> Option<&str> {
        match &self.state {
            SessionState::Failed { notice, .. } => Some(notice.as_str()),
            _ => None,
        }
    }
}
