//! 协议常量定义

use std::time::Duration;

/// 协议版本号
pub const PROTOCOL_VERSION: u8 = 1;

/// 消息帧最大大小
pub const MAX_FRAME_SIZE: usize = 65536;

/// 连接超时（秒）
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// 连接超时 Duration
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(CONNECT_TIMEOUT_SECS);

/// 默认监听地址
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:9527";

/// 每局提示次数上限
pub const MAX_HINTS: u8 = 5;

/// 对手强度上限（0 最弱，20 最强）
pub const MAX_DIFFICULTY: u8 = 20;

/// 提示使用的固定强度
pub const HINT_STRENGTH: u8 = MAX_DIFFICULTY;

/// 单次分析最多返回的候选走法数
pub const MAX_ANALYSIS_LINES: usize = 10;

/// 允许的对局时限（分钟）
pub const ALLOWED_TIME_LIMITS: [u8; 5] = [1, 3, 5, 10, 15];

/// 引擎走棋默认思考时间（毫秒）
pub const ENGINE_MOVE_TIME_MS: u64 = 1000;

/// 提示默认思考时间（毫秒）
pub const HINT_TIME_MS: u64 = 1000;

/// 分析默认思考时间（毫秒）
pub const ANALYSIS_TIME_MS: u64 = 1500;

/// 七十五步规则（半回合数）
pub const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;

/// 五次重复局面判和
pub const FIVEFOLD_REPETITION: usize = 5;
