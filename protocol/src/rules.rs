//! 走法校验与局面判定
//!
//! 规则计算全部委托给 shakmaty，这里只负责记法转换和终局判定。

use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Move, Position};

use crate::constants::SEVENTY_FIVE_MOVE_PLIES;
use crate::error::ChessError;
use crate::message::EndReason;
use crate::moves::MoveSpec;
use crate::side::Side;

/// 终局判定（仅依据局面本身，不含重复局面和时钟）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// 对局继续
    Ongoing,
    /// 将死，`winner` 为胜方
    Checkmate { winner: Side },
    /// 逼和
    Stalemate,
    /// 规则和棋
    Draw(EndReason),
}

impl Verdict {
    pub fn is_over(&self) -> bool {
        !matches!(self, Verdict::Ongoing)
    }
}

/// 走法校验器
pub struct MoveValidator;

impl MoveValidator {
    /// 初始局面
    pub fn initial() -> Chess {
        Chess::default()
    }

    /// 从 FEN 构建局面
    pub fn from_fen(fen: &str) -> Result<Chess, ChessError> {
        let parsed: Fen = fen.trim().parse().map_err(|e| ChessError::InvalidFen {
            reason: format!("{e}"),
        })?;
        parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| ChessError::InvalidFen {
                reason: format!("{e}"),
            })
    }

    /// 局面的 FEN
    pub fn fen(pos: &Chess) -> String {
        Fen::from_position(pos.clone(), EnPassantMode::Legal).to_string()
    }

    /// 重复局面比较用的键（去掉半回合计数和回合数）
    pub fn position_key(pos: &Chess) -> String {
        let fen = Self::fen(pos);
        fen.split(' ').take(4).collect::<Vec<_>>().join(" ")
    }

    /// 查找与走法对应的合法着法
    fn find_legal(pos: &Chess, mv: MoveSpec) -> Result<Move, ChessError> {
        let illegal = || ChessError::IllegalMove {
            notation: mv.to_string(),
        };
        let m = mv.to_uci().to_move(pos).map_err(|_| illegal())?;
        if !pos.is_legal(&m) {
            return Err(illegal());
        }
        Ok(m)
    }

    /// 合法走法的标准写法（王吃车式的易位输入 e1h1 记为 e1g1）
    pub fn normalize(pos: &Chess, mv: MoveSpec) -> Result<MoveSpec, ChessError> {
        Self::find_legal(pos, mv).map(|m| MoveSpec::from_move(&m))
    }

    /// 是否为合法走法
    pub fn is_legal(pos: &Chess, mv: MoveSpec) -> bool {
        Self::find_legal(pos, mv).is_ok()
    }

    /// 执行走法，返回新局面和带将军标记的 SAN
    pub fn apply(pos: &Chess, mv: MoveSpec) -> Result<(Chess, String), ChessError> {
        let m = Self::find_legal(pos, mv)?;
        let mut san = San::from_move(pos, &m).to_string();

        let mut next = pos.clone();
        next.play_unchecked(&m);
        if next.is_checkmate() {
            san.push('#');
        } else if next.is_check() {
            san.push('+');
        }
        Ok((next, san))
    }

    /// 走子方的全部合法走法
    pub fn legal_moves(pos: &Chess) -> Vec<MoveSpec> {
        pos.legal_moves().iter().map(MoveSpec::from_move).collect()
    }

    /// 解析玩家输入，支持 UCI（e2e4）和 SAN（Nf3、O-O、exd8=Q+）
    pub fn resolve(pos: &Chess, notation: &str) -> Result<MoveSpec, ChessError> {
        let input = notation.trim();
        if let Ok(mv) = MoveSpec::parse(input) {
            return Self::normalize(pos, mv);
        }

        let stripped = input.trim_end_matches(['+', '#', '!', '?']);
        // 兼容数字零写法
        let stripped = stripped.replace('0', "O");
        let san: San = stripped.parse().map_err(|_| ChessError::InvalidNotation {
            notation: input.to_string(),
        })?;
        let m = san.to_move(pos).map_err(|_| ChessError::IllegalMove {
            notation: input.to_string(),
        })?;
        Ok(MoveSpec::from_move(&m))
    }

    /// 从初始局面重放走法序列
    pub fn replay(moves: &[MoveSpec]) -> Result<Chess, ChessError> {
        moves
            .iter()
            .try_fold(Self::initial(), |pos, &mv| Self::apply(&pos, mv).map(|(next, _)| next))
    }

    /// 判定终局
    pub fn verdict(pos: &Chess) -> Verdict {
        if pos.is_checkmate() {
            Verdict::Checkmate {
                winner: Side::from(pos.turn()).opponent(),
            }
        } else if pos.is_stalemate() {
            Verdict::Stalemate
        } else if pos.is_insufficient_material() {
            Verdict::Draw(EndReason::InsufficientMaterial)
        } else if pos.halfmoves() >= SEVENTY_FIVE_MOVE_PLIES {
            Verdict::Draw(EndReason::SeventyFiveMoves)
        } else {
            Verdict::Ongoing
        }
    }

    /// 生成 SAN 走法文本（"1. e4 e5 2. Nf3"）
    pub fn movetext(sans: &[String]) -> String {
        let mut out = String::new();
        for (i, san) in sans.iter().enumerate() {
            if i % 2 == 0 {
                if i > 0 {
                    out.push(' ');
                }
                out.push_str(&format!("{}. ", i / 2 + 1));
            } else {
                out.push(' ');
            }
            out.push_str(san);
        }
        out
    }
}
