//! 错误类型定义

use thiserror::Error;

/// 国际象棋规则错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    /// 走法格式无法解析
    #[error("Invalid move notation: {notation}")]
    InvalidNotation { notation: String },

    /// 走法在当前局面不合法
    #[error("Illegal move: {notation}")]
    IllegalMove { notation: String },

    /// 无效的 FEN 字符串
    #[error("Invalid FEN string: {reason}")]
    InvalidFen { reason: String },

    /// 难度超出范围
    #[error("Difficulty out of range: {value} (max: {max})")]
    InvalidDifficulty { value: u8, max: u8 },

    /// 不支持的时限
    #[error("Unsupported time limit: {minutes} minutes")]
    InvalidTimeLimit { minutes: u8 },
}

/// 协议错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 序列化错误（bincode）
    #[error("Bincode serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// 协议版本不匹配
    #[error("Protocol version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: u8, actual: u8 },

    /// 帧大小超限
    #[error("Frame too large: {size} bytes (max: {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// 连接超时
    #[error("Connection timeout")]
    ConnectionTimeout,

    /// 连接已关闭
    #[error("Connection closed")]
    ConnectionClosed,
}

/// 协议操作结果类型
pub type Result<T> = std::result::Result<T, ProtocolError>;
