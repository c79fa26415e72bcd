//! 棋谱记录格式
//!
//! 支持 PGN 导出和 JSON 存储

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::{GameStatus, TimeLimit};
use crate::moves::MoveSpec;
use crate::side::Side;

/// 棋谱版本
pub const RECORD_VERSION: &str = "1.0";

/// PGN 结果标记
pub fn result_token(status: GameStatus, winner: Option<Side>) -> &'static str {
    match (status, winner) {
        (GameStatus::InProgress, _) => "*",
        (_, Some(Side::White)) => "1-0",
        (_, Some(Side::Black)) => "0-1",
        (_, None) => "1/2-1/2",
    }
}

/// 游戏元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    /// 白方玩家名
    pub white_player: String,
    /// 黑方玩家名
    pub black_player: String,
    /// 开局时间
    pub started_at: DateTime<Utc>,
    /// 结果标记（"1-0"、"0-1"、"1/2-1/2"、"*"）
    pub result: String,
    /// 时间控制
    pub time_control: TimeLimit,
}

/// 走法记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRecord {
    /// UCI 走法
    pub mv: MoveSpec,
    /// SAN 记法
    pub san: String,
}

/// 完整的棋谱记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    /// 版本号
    pub version: String,
    /// 元数据
    pub metadata: GameMetadata,
    /// 走法列表
    pub moves: Vec<MoveRecord>,
}

impl GameRecord {
    /// 创建新的棋谱记录
    pub fn new(white_player: String, black_player: String, time_control: TimeLimit) -> Self {
        Self {
            version: RECORD_VERSION.to_string(),
            metadata: GameMetadata {
                white_player,
                black_player,
                started_at: Utc::now(),
                result: "*".to_string(),
                time_control,
            },
            moves: Vec::new(),
        }
    }

    /// 添加走法
    pub fn add_move(&mut self, mv: MoveSpec, san: String) {
        self.moves.push(MoveRecord { mv, san });
    }

    /// 设置游戏结果
    pub fn set_result(&mut self, status: GameStatus, winner: Option<Side>) {
        self.metadata.result = result_token(status, winner).to_string();
    }

    /// SAN 走法文本
    pub fn movetext(&self) -> String {
        let sans: Vec<String> = self.moves.iter().map(|m| m.san.clone()).collect();
        crate::rules::MoveValidator::movetext(&sans)
    }

    /// 导出 PGN
    pub fn to_pgn(&self) -> String {
        let meta = &self.metadata;
        let mut output = String::new();

        let tags = [
            ("Event", "Practice Game".to_string()),
            ("Site", "Chess Arena".to_string()),
            ("Date", meta.started_at.format("%Y.%m.%d").to_string()),
            ("Round", "-".to_string()),
            ("White", meta.white_player.clone()),
            ("Black", meta.black_player.clone()),
            ("Result", meta.result.clone()),
            ("TimeControl", meta.time_control.pgn_tag()),
        ];
        for (name, value) in tags {
            output.push_str(&format!("[{} \"{}\"]\n", name, value.replace('"', "'")));
        }
        output.push('\n');

        let movetext = self.movetext();
        if movetext.is_empty() {
            output.push_str(&meta.result);
        } else {
            output.push_str(&format!("{} {}", movetext, meta.result));
        }
        output.push('\n');
        output
    }

    /// 转换为 JSON 字符串
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// 从 JSON 字符串解析
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
