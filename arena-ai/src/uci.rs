//! UCI 协议文本解析与命令构造

use protocol::Evaluation;

use crate::skill::EngineLimits;

/// 引擎输出的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciResponse {
    /// `id name ...`
    IdName(String),
    /// `uciok`
    UciOk,
    /// `readyok`
    ReadyOk,
    /// `info ...`
    Info(InfoLine),
    /// `bestmove <move> [ponder <move>]`，无合法走法时为 `None`
    BestMove(Option<String>),
    /// 其他内容（option 声明、调试输出等）
    Other,
}

/// info 行中与分析相关的字段
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoLine {
    pub depth: Option<u32>,
    /// MultiPV 序号，从 1 开始
    pub multipv: u32,
    /// 走子方视角的评估
    pub score: Option<Evaluation>,
    /// 评估是否只是上下界
    pub bound: bool,
    pub pv: Vec<String>,
}

impl InfoLine {
    /// 是否为可用的完整主变
    pub fn is_exact(&self) -> bool {
        self.score.is_some() && !self.bound && !self.pv.is_empty()
    }
}

/// 解析一行引擎输出
pub fn parse_line(line: &str) -> UciResponse {
    let line = line.trim();
    let mut tokens = line.split_whitespace();
    match tokens.next() {
        Some("uciok") => UciResponse::UciOk,
        Some("readyok") => UciResponse::ReadyOk,
        Some("id") => match tokens.next() {
            Some("name") => UciResponse::IdName(tokens.collect::<Vec<_>>().join(" ")),
            _ => UciResponse::Other,
        },
        Some("bestmove") => match tokens.next() {
            None | Some("(none)") | Some("0000") => UciResponse::BestMove(None),
            Some(mv) => UciResponse::BestMove(Some(mv.to_string())),
        },
        Some("info") => UciResponse::Info(parse_info(tokens.collect())),
        _ => UciResponse::Other,
    }
}

fn parse_info(tokens: Vec<&str>) -> InfoLine {
    let mut info = InfoLine {
        multipv: 1,
        ..InfoLine::default()
    };

    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            "depth" => {
                info.depth = tokens.get(i + 1).and_then(|t| t.parse().ok());
                i += 2;
            }
            "multipv" => {
                info.multipv = tokens.get(i + 1).and_then(|t| t.parse().ok()).unwrap_or(1);
                i += 2;
            }
            "score" => {
                let value = tokens.get(i + 2).and_then(|t| t.parse::<i32>().ok());
                info.score = match (tokens.get(i + 1), value) {
                    (Some(&"cp"), Some(v)) => Some(Evaluation::Centipawns(v)),
                    (Some(&"mate"), Some(v)) => Some(Evaluation::Mate(v)),
                    _ => None,
                };
                i += 3;
                if matches!(tokens.get(i), Some(&"lowerbound") | Some(&"upperbound")) {
                    info.bound = true;
                    i += 1;
                }
            }
            "pv" => {
                // pv 总是在行尾
                info.pv = tokens[i + 1..].iter().map(|t| t.to_string()).collect();
                break;
            }
            // 以字符串结尾的字段，之后没有可解析内容
            "string" => break,
            _ => i += 1,
        }
    }
    info
}

/// `setoption` 命令
pub fn set_option(name: &str, value: impl std::fmt::Display) -> String {
    format!("setoption name {} value {}", name, value)
}

/// `position fen` 命令
pub fn position(fen: &str) -> String {
    format!("position fen {}", fen)
}

/// `go` 命令
pub fn go(limits: &EngineLimits) -> String {
    let movetime = limits.move_time.as_millis().max(1);
    match limits.depth {
        Some(depth) => format!("go depth {} movetime {}", depth, movetime),
        None => format!("go movetime {}", movetime),
    }
}
