//! 引擎错误类型

use thiserror::Error;

/// 搜索引擎错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// 引擎进程缺失、退出或超时未响应
    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    /// 等待队列已满
    #[error("Engine busy: {waiting} requests already queued")]
    Busy { waiting: usize },

    /// 引擎输出无法解析或给出非法走法
    #[error("Engine protocol error: {0}")]
    Protocol(String),
}

impl EngineError {
    /// 调用方是否可以重试
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EngineError::Unavailable(_) | EngineError::Busy { .. })
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Unavailable(e.to_string())
    }
}
