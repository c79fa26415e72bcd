//! 对局层错误类型

use arena_ai::EngineError;
use protocol::{ChessError, ErrorCode, SessionId, Side};
use thiserror::Error;

/// 对局操作错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Game is already over")]
    GameAlreadyOver,

    /// 当前轮到 `0` 走棋
    #[error("Out of turn: {0} is to move")]
    OutOfTurn(Side),

    #[error(transparent)]
    IllegalMove(ChessError),

    #[error("Clock expired for {0}")]
    ClockExpired(Side),

    #[error("Hint budget exhausted ({max} hints per game)")]
    HintBudgetExhausted { max: u8 },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl SessionError {
    /// 对应的协议错误码
    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::NotFound(_) => ErrorCode::SessionNotFound,
            SessionError::GameAlreadyOver => ErrorCode::GameAlreadyOver,
            SessionError::OutOfTurn(_) => ErrorCode::OutOfTurn,
            SessionError::IllegalMove(_) => ErrorCode::IllegalMove,
            SessionError::ClockExpired(_) => ErrorCode::ClockExpired,
            SessionError::HintBudgetExhausted { .. } => ErrorCode::HintBudgetExhausted,
            SessionError::InvalidRequest(_) => ErrorCode::InvalidRequest,
            SessionError::Engine(EngineError::Unavailable(_)) => ErrorCode::EngineUnavailable,
            SessionError::Engine(EngineError::Busy { .. }) => ErrorCode::EngineBusy,
            SessionError::Engine(EngineError::Protocol(_)) => ErrorCode::EngineProtocolError,
        }
    }

    /// 调用方是否可以原样重试
    pub fn is_recoverable(&self) -> bool {
        match self {
            SessionError::Engine(e) => e.is_recoverable(),
            _ => false,
        }
    }
}

impl From<ChessError> for SessionError {
    fn from(e: ChessError) -> Self {
        match e {
            ChessError::InvalidNotation { .. } | ChessError::IllegalMove { .. } => {
                SessionError::IllegalMove(e)
            }
            other => SessionError::InvalidRequest(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SessionError::NotFound(3).code(), ErrorCode::SessionNotFound);
        assert_eq!(
            SessionError::Engine(EngineError::Busy { waiting: 2 }).code(),
            ErrorCode::EngineBusy
        );
        assert_eq!(
            SessionError::Engine(EngineError::Protocol("x".into())).code(),
            ErrorCode::EngineProtocolError
        );
    }

    #[test]
    fn test_chess_error_mapping() {
        let illegal: SessionError = ChessError::IllegalMove {
            notation: "e2e5".into(),
        }
        .into();
        assert_eq!(illegal.code(), ErrorCode::IllegalMove);
        assert_eq!(illegal.to_string(), "Illegal move: e2e5");

        let bad: SessionError = ChessError::InvalidTimeLimit { minutes: 7 }.into();
        assert_eq!(bad.code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn test_recoverable() {
        assert!(SessionError::Engine(EngineError::Unavailable("x".into())).is_recoverable());
        assert!(!SessionError::Engine(EngineError::Protocol("x".into())).is_recoverable());
        assert!(!SessionError::GameAlreadyOver.is_recoverable());
    }
}
