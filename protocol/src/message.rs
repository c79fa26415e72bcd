//! 消息类型定义

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{ALLOWED_TIME_LIMITS, MAX_DIFFICULTY};
use crate::error::ChessError;
use crate::moves::MoveSpec;
use crate::side::Side;

/// 对局 ID
pub type SessionId = u64;

/// 对手强度（0 经常失误，20 接近满血）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    /// 最强档位
    pub const MAX: Difficulty = Difficulty(MAX_DIFFICULTY);

    pub fn new(value: u8) -> Result<Self, ChessError> {
        if value > MAX_DIFFICULTY {
            return Err(ChessError::InvalidDifficulty {
                value,
                max: MAX_DIFFICULTY,
            });
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::MAX
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, MAX_DIFFICULTY)
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = ChessError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Difficulty> for u8 {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.0
    }
}

/// 对局时限（每方）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeLimit {
    /// 无限制
    #[default]
    Unlimited,
    /// 1 分钟
    OneMinute,
    /// 3 分钟
    ThreeMinutes,
    /// 5 分钟
    FiveMinutes,
    /// 10 分钟
    TenMinutes,
    /// 15 分钟
    FifteenMinutes,
}

impl TimeLimit {
    /// 从分钟数解析，`None` 表示无限制
    pub fn from_minutes(minutes: Option<u8>) -> Result<Self, ChessError> {
        match minutes {
            None => Ok(TimeLimit::Unlimited),
            Some(1) => Ok(TimeLimit::OneMinute),
            Some(3) => Ok(TimeLimit::ThreeMinutes),
            Some(5) => Ok(TimeLimit::FiveMinutes),
            Some(10) => Ok(TimeLimit::TenMinutes),
            Some(15) => Ok(TimeLimit::FifteenMinutes),
            Some(minutes) => Err(ChessError::InvalidTimeLimit { minutes }),
        }
    }

    /// 每方分钟数，无限制时为 `None`
    pub fn minutes(self) -> Option<u8> {
        match self {
            TimeLimit::Unlimited => None,
            TimeLimit::OneMinute => Some(ALLOWED_TIME_LIMITS[0]),
            TimeLimit::ThreeMinutes => Some(ALLOWED_TIME_LIMITS[1]),
            TimeLimit::FiveMinutes => Some(ALLOWED_TIME_LIMITS[2]),
            TimeLimit::TenMinutes => Some(ALLOWED_TIME_LIMITS[3]),
            TimeLimit::FifteenMinutes => Some(ALLOWED_TIME_LIMITS[4]),
        }
    }

    /// 每方时长
    pub fn allotment(self) -> Option<Duration> {
        self.minutes().map(|m| Duration::from_secs(u64::from(m) * 60))
    }

    /// PGN TimeControl 标签值
    pub fn pgn_tag(self) -> String {
        match self.minutes() {
            Some(m) => (u32::from(m) * 60).to_string(),
            None => "-".to_string(),
        }
    }
}

/// 对局状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// 进行中
    InProgress,
    /// 将死
    Checkmate,
    /// 逼和
    Stalemate,
    /// 和棋
    Draw,
    /// 超时
    TimedOut,
    /// 认输
    Resigned,
}

impl GameStatus {
    /// 是否已结束
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

/// 对局结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndReason {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    SeventyFiveMoves,
    FivefoldRepetition,
    Timeout,
    Resignation,
}

impl EndReason {
    /// 简短标签
    pub fn tag(&self) -> &'static str {
        match self {
            EndReason::Checkmate => "checkmate",
            EndReason::Stalemate => "stalemate",
            EndReason::InsufficientMaterial => "insufficient_material",
            EndReason::SeventyFiveMoves => "seventy_five_moves",
            EndReason::FivefoldRepetition => "fivefold_repetition",
            EndReason::Timeout => "timeout",
            EndReason::Resignation => "resignation",
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// 局面评估（统一为白方视角）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Evaluation {
    /// 厘兵分值
    Centipawns(i32),
    /// N 步杀，正数白方杀，负数黑方杀
    Mate(i32),
}

impl Evaluation {
    /// 翻转视角
    pub fn flipped(self) -> Self {
        match self {
            Evaluation::Centipawns(cp) => Evaluation::Centipawns(-cp),
            Evaluation::Mate(n) => Evaluation::Mate(-n),
        }
    }

    /// 将走子方视角的评估转换为白方视角
    pub fn from_side_to_move(self, side_to_move: Side) -> Self {
        match side_to_move {
            Side::White => self,
            Side::Black => self.flipped(),
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::Centipawns(cp) => write!(f, "{:+.2}", f64::from(*cp) / 100.0),
            Evaluation::Mate(n) => write!(f, "#{}", n),
        }
    }
}

/// 带评估的候选走法
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedMove {
    pub mv: MoveSpec,
    pub evaluation: Evaluation,
}

/// 局面分析结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    /// 局面评估（取最佳候选的评估）
    pub evaluation: Option<Evaluation>,
    /// 按优劣排序的候选走法
    pub lines: Vec<RankedMove>,
}

/// 对局快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub id: SessionId,
    /// 当前局面 FEN
    pub fen: String,
    /// SAN 走法序列（如 "1. e4 e5 2. Nf3"）
    pub movetext: String,
    /// UCI 走法历史
    pub moves: Vec<MoveSpec>,
    pub turn: Side,
    pub in_check: bool,
    /// 走子方的全部合法走法
    pub legal_moves: Vec<MoveSpec>,
    pub half_move_count: u32,
    pub hints_used: u8,
    pub max_hints: u8,
    pub status: GameStatus,
    pub winner: Option<Side>,
    pub reason: Option<EndReason>,
    pub difficulty: Difficulty,
    pub time_limit: TimeLimit,
    pub player_side: Side,
    /// 白方剩余时间（毫秒），`None` 表示无限制
    pub white_time_ms: Option<u64>,
    /// 黑方剩余时间（毫秒），`None` 表示无限制
    pub black_time_ms: Option<u64>,
    pub game_over: bool,
}

/// 新对局配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    pub difficulty: Difficulty,
    pub time_limit: TimeLimit,
    /// 玩家执棋方
    pub player_side: Side,
}

/// 客户端发送给服务端的消息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClientMessage {
    // === 对局管理 ===
    /// 创建对局（难度 0-20，时限分钟数）
    CreateSession {
        difficulty: u8,
        time_limit_minutes: Option<u8>,
        player_side: Side,
    },
    /// 查询快照
    GetSnapshot { session_id: SessionId },
    /// 关闭对局
    CloseSession { session_id: SessionId },

    // === 游戏操作 ===
    /// 走棋（UCI 或 SAN）
    MakeMove { session_id: SessionId, notation: String },
    /// 请求引擎走棋
    EngineMove { session_id: SessionId },
    /// 认输
    Resign { session_id: SessionId },

    // === 辅助 ===
    /// 请求提示
    RequestHint { session_id: SessionId },
    /// 请求局面分析
    RequestAnalysis { session_id: SessionId, lines: usize },
    /// 导出 PGN
    ExportPgn { session_id: SessionId },

    // === 心跳 ===
    /// 心跳请求
    Ping,
}

/// 服务端发送给客户端的消息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ServerMessage {
    /// 对局创建成功
    SessionCreated {
        session_id: SessionId,
        snapshot: GameSnapshot,
    },
    /// 对局快照
    Snapshot { snapshot: GameSnapshot },
    /// 对局已关闭
    SessionClosed { session_id: SessionId },
    /// 提示
    Hint {
        mv: MoveSpec,
        hints_used: u8,
        max_hints: u8,
    },
    /// 分析结果
    Analysis { analysis: Analysis },
    /// PGN 文本
    Pgn { pgn: String },
    /// 心跳响应
    Pong,
    /// 错误消息
    Error { code: ErrorCode, message: String },
}

/// 错误码定义
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum ErrorCode {
    // === 对局相关 (1xx) ===
    /// 对局不存在
    SessionNotFound = 100,
    /// 请求参数无效
    InvalidRequest = 101,

    // === 游戏相关 (2xx) ===
    /// 非法走法
    IllegalMove = 200,
    /// 游戏已结束
    GameAlreadyOver = 201,
    /// 超时
    ClockExpired = 202,
    /// 提示次数用尽
    HintBudgetExhausted = 203,
    /// 不是该方的回合
    OutOfTurn = 204,

    // === 引擎相关 (3xx) ===
    /// 引擎不可用（可重试）
    EngineUnavailable = 300,
    /// 引擎繁忙（可重试）
    EngineBusy = 301,
    /// 引擎响应异常
    EngineProtocolError = 302,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
