//! 国际象棋对练共享协议库
//!
//! 包含:
//! - 走法、阵营等核心数据结构
//! - 走法校验和终局判定（基于 shakmaty）
//! - 消息类型定义 (ClientMessage, ServerMessage)
//! - 传输层抽象 (Connector, Connection, Listener traits)
//! - 帧编解码
//! - 棋谱格式 (PGN, JSON)

mod constants;
mod error;
mod message;
mod moves;
mod record;
mod rules;
mod side;
mod transport;

pub use constants::*;
pub use error::{ChessError, ProtocolError, Result};
pub use message::{
    Analysis, ClientMessage, Difficulty, EndReason, ErrorCode, Evaluation, GameSnapshot,
    GameStatus, RankedMove, ServerMessage, SessionConfig, SessionId, TimeLimit,
};
pub use moves::MoveSpec;
pub use record::{result_token, GameMetadata, GameRecord, MoveRecord};
pub use rules::{MoveValidator, Verdict};
pub use side::Side;
pub use transport::{
    encode_frame, Connection, Connector, FrameReader, FrameWriter, Listener, TcpConnection,
    TcpConnector, TcpListener,
};

/// 重新导出规则引擎的局面类型
pub use shakmaty::Chess;
