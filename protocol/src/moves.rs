//! 走法表示
//!
//! 对外统一使用 UCI 长代数记法：`e2e4`、`e7e8q`。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Move, Role, Square};

use crate::error::ChessError;

/// 走法（起点、终点和可选的升变棋子）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MoveSpec {
    from: Square,
    to: Square,
    promotion: Option<Role>,
}

impl MoveSpec {
    /// 创建普通走法
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    /// 创建升变走法
    pub fn with_promotion(from: Square, to: Square, promotion: Role) -> Self {
        Self {
            from,
            to,
            promotion: Some(promotion),
        }
    }

    /// 解析 UCI 字符串
    pub fn parse(notation: &str) -> Result<Self, ChessError> {
        let invalid = || ChessError::InvalidNotation {
            notation: notation.to_string(),
        };

        let bytes = notation.trim().as_bytes();
        if bytes.len() != 4 && bytes.len() != 5 {
            return Err(invalid());
        }

        let from = Square::from_ascii(&bytes[0..2]).map_err(|_| invalid())?;
        let to = Square::from_ascii(&bytes[2..4]).map_err(|_| invalid())?;
        let promotion = match bytes.get(4) {
            None => None,
            Some(&c) => match Role::from_char(char::from(c).to_ascii_lowercase()) {
                Some(role) if role != Role::Pawn && role != Role::King => Some(role),
                _ => return Err(invalid()),
            },
        };

        Ok(Self { from, to, promotion })
    }

    /// 从规则引擎的走法转换（王车易位使用标准记法 e1g1）
    pub fn from_move(mv: &Move) -> Self {
        match UciMove::from_move(mv, CastlingMode::Standard) {
            UciMove::Normal {
                from,
                to,
                promotion,
            } => Self { from, to, promotion },
            // 标准国际象棋不会出现落子或空着
            _ => Self::new(mv.from().unwrap_or(mv.to()), mv.to()),
        }
    }

    /// 转换为规则引擎的 UCI 走法
    pub fn to_uci(&self) -> UciMove {
        UciMove::Normal {
            from: self.from,
            to: self.to,
            promotion: self.promotion,
        }
    }

    pub fn from(&self) -> Square {
        self.from
    }

    pub fn to(&self) -> Square {
        self.to
    }

    pub fn promotion(&self) -> Option<Role> {
        self.promotion
    }
}

impl fmt::Display for MoveSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(role) = self.promotion {
            write!(f, "{}", role.char())?;
        }
        Ok(())
    }
}

impl FromStr for MoveSpec {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MoveSpec {
    type Error = ChessError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MoveSpec> for String {
    fn from(mv: MoveSpec) -> Self {
        mv.to_string()
    }
}
