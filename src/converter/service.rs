//! # 服务层（可注入状态）
//!
//! ## 设计思路
//!
//! 使用 `ConverterServiceState` 持有唯一的会话与表单选择，替代散落的全局状态。
//! 宿主（命令层 / IPC 桥）只与它交互，测试可创建独立实例。
//!
//! ## 实现思路
//!
//! - 会话与表单放在同一把短持有的互斥锁内，锁从不跨越 `.await`。
//! - 加载：校验与解码完成前不触碰会话，失败时状态保持原样。
//! - 转换：先在锁内完成 `begin_convert`（忙碌时直接忽略），锁外执行编码，
//!   再回到锁内提交结果；过期结果被丢弃。

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::session::{Session, SkipReason};
use super::source::{ConversionRequest, ConversionResult, Quality, SourceFile, TargetFormat};
use super::view::{DownloadLink, SessionSnapshot};
use super::{ConverterConfig, ConverterError, ImageConverter};

/// 一次转换触发的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertOutcome {
    Completed(ConversionResult),
    /// 触发被忽略（无源图或已有转换在进行）。
    Skipped(SkipReason),
    /// 转换期间会话被重置或换图，结果已丢弃。
    Discarded,
}

struct ServiceInner {
    session: Session,
    form: ConversionRequest,
}

/// 图片转换服务状态。
pub struct ConverterServiceState {
    converter: ImageConverter,
    inner: Mutex<ServiceInner>,
}

impl ConverterServiceState {
    /// 使用默认配置创建服务状态。
    ///
    /// # 示例
    /// ```rust
    /// use image_converter::converter::ConverterServiceState;
    ///
    /// let service = ConverterServiceState::new()?;
    /// assert!(!service.snapshot()?.converting);
    /// # Ok::<(), image_converter::converter::ConverterError>(())
    /// ```
    pub fn new() -> Result<Self, ConverterError> {
        Self::with_config(ConverterConfig::default())
    }

    pub fn with_config(config: ConverterConfig) -> Result<Self, ConverterError> {
        let form = ConversionRequest::new(config.default_format, config.default_quality);
        let converter = ImageConverter::new(config)?;
        Ok(Self {
            converter,
            inner: Mutex::new(ServiceInner {
                session: Session::new(),
                form,
            }),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, ServiceInner>, ConverterError> {
        self.inner
            .lock()
            .map_err(|_| ConverterError::ResourceLimit("会话状态锁已中毒".to_string()))
    }

    /// 加载新源图；成功后旧结果被清空。
    pub async fn load_source(&self, file: SourceFile) -> Result<SessionSnapshot, ConverterError> {
        let source = match self.converter.load(file).await {
            Ok(source) => source,
            Err(err) => {
                log::warn!("⚠️ 源图片被拒绝: {}", err);
                return Err(err);
            }
        };

        let mut inner = self.lock()?;
        inner.session.load(source);
        Ok(SessionSnapshot::build(&inner.session, inner.form))
    }

    /// 从本地路径加载源图，声明类型按文件签名推断。
    pub async fn load_source_path(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<SessionSnapshot, ConverterError> {
        let file = SourceFile::from_path(path).await?;
        self.load_source(file).await
    }

    pub fn set_format(&self, format: TargetFormat) -> Result<SessionSnapshot, ConverterError> {
        let mut inner = self.lock()?;
        inner.form.format = format;
        Ok(SessionSnapshot::build(&inner.session, inner.form))
    }

    pub fn set_quality(&self, quality: f64) -> Result<SessionSnapshot, ConverterError> {
        let quality = Quality::new(quality)?;
        let mut inner = self.lock()?;
        inner.form.quality = quality;
        Ok(SessionSnapshot::build(&inner.session, inner.form))
    }

    /// 按当前表单选择转换；忙碌或无源图时为空操作。
    pub async fn convert(&self) -> Result<ConvertOutcome, ConverterError> {
        let job = {
            let mut inner = self.lock()?;
            let form = inner.form;
            match inner.session.begin_convert(form) {
                Ok(job) => job,
                Err(reason) => {
                    log::debug!("⏸️ 忽略转换触发：{:?}", reason);
                    return Ok(ConvertOutcome::Skipped(reason));
                }
            }
        };

        let outcome = self.converter.convert(&job.source, job.request).await;

        let mut inner = self.lock()?;
        let applied = inner
            .session
            .finish_convert(job.id, outcome.as_ref().cloned().map_err(|err| err.notice()));

        if !applied {
            log::info!("🗑️ 转换任务 #{} 已过期，结果被丢弃", job.id);
            return Ok(ConvertOutcome::Discarded);
        }

        outcome.map(ConvertOutcome::Completed)
    }

    /// 清空源图、结果与进行中标志，回到初始状态。
    pub fn reset(&self) -> Result<SessionSnapshot, ConverterError> {
        let mut inner = self.lock()?;
        inner.session.reset();
        log::info!("🔄 会话已重置");
        Ok(SessionSnapshot::build(&inner.session, inner.form))
    }

    pub fn snapshot(&self) -> Result<SessionSnapshot, ConverterError> {
        let inner = self.lock()?;
        Ok(SessionSnapshot::build(&inner.session, inner.form))
    }

    /// 当前结果的下载链接。
    pub fn download(&self) -> Result<Option<DownloadLink>, ConverterError> {
        let snapshot = self.snapshot()?;
        Ok(snapshot.result.map(|result| result.download))
    }

    /// 替换运行时配置；对下一次加载 / 转换生效，不影响当前表单与会话。
    pub fn set_config(&self, config: ConverterConfig) -> Result<ConverterConfig, ConverterError> {
        self.converter.set_config(config)?;
        self.config()
    }

    pub fn config(&self) -> Result<ConverterConfig, ConverterError> {
        self.converter.config_snapshot()
    }
}
