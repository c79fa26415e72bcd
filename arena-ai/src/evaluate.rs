//! 局面评估函数

use shakmaty::{Chess, Color, Position, Role, Square};

/// 评估器
pub struct Evaluator;

/// 棋子位置分值表（白方视角，第一行为第 8 横线，黑方直接按格子编号取值）
mod position_tables {
    #[rustfmt::skip]
    pub const PAWN: [i32; 64] = [
         0,  0,  0,  0,  0,  0,  0,  0,
        50, 50, 50, 50, 50, 50, 50, 50,
        10, 10, 20, 30, 30, 20, 10, 10,
         5,  5, 10, 25, 25, 10,  5,  5,
         0,  0,  0, 20, 20,  0,  0,  0,
         5, -5,-10,  0,  0,-10, -5,  5,
         5, 10, 10,-20,-20, 10, 10,  5,
         0,  0,  0,  0,  0,  0,  0,  0,
    ];

    #[rustfmt::skip]
    pub const KNIGHT: [i32; 64] = [
        -50,-40,-30,-30,-30,-30,-40,-50,
        -40,-20,  0,  0,  0,  0,-20,-40,
        -30,  0, 10, 15, 15, 10,  0,-30,
        -30,  5, 15, 20, 20, 15,  5,-30,
        -30,  0, 15, 20, 20, 15,  0,-30,
        -30,  5, 10, 15, 15, 10,  5,-30,
        -40,-20,  0,  5,  5,  0,-20,-40,
        -50,-40,-30,-30,-30,-30,-40,-50,
    ];

    #[rustfmt::skip]
    pub const BISHOP: [i32; 64] = [
        -20,-10,-10,-10,-10,-10,-10,-20,
        -10,  0,  0,  0,  0,  0,  0,-10,
        -10,  0,  5, 10, 10,  5,  0,-10,
        -10,  5,  5, 10, 10,  5,  5,-10,
        -10,  0, 10, 10, 10, 10,  0,-10,
        -10, 10, 10, 10, 10, 10, 10,-10,
        -10,  5,  0,  0,  0,  0,  5,-10,
        -20,-10,-10,-10,-10,-10,-10,-20,
    ];

    #[rustfmt::skip]
    pub const ROOK: [i32; 64] = [
         0,  0,  0,  0,  0,  0,  0,  0,
         5, 10, 10, 10, 10, 10, 10,  5,
        -5,  0,  0,  0,  0,  0,  0, -5,
        -5,  0,  0,  0,  0,  0,  0, -5,
        -5,  0,  0,  0,  0,  0,  0, -5,
        -5,  0,  0,  0,  0,  0,  0, -5,
        -5,  0,  0,  0,  0,  0,  0, -5,
         0,  0,  0,  5,  5,  0,  0,  0,
    ];

    #[rustfmt::skip]
    pub const QUEEN: [i32; 64] = [
        -20,-10,-10, -5, -5,-10,-10,-20,
        -10,  0,  0,  0,  0,  0,  0,-10,
        -10,  0,  5,  5,  5,  5,  0,-10,
         -5,  0,  5,  5,  5,  5,  0, -5,
          0,  0,  5,  5,  5,  5,  0, -5,
        -10,  5,  5,  5,  5,  5,  0,-10,
        -10,  0,  5,  0,  0,  0,  0,-10,
        -20,-10,-10, -5, -5,-10,-10,-20,
    ];

    #[rustfmt::skip]
    pub const KING: [i32; 64] = [
        -30,-40,-40,-50,-50,-40,-40,-30,
        -30,-40,-40,-50,-50,-40,-40,-30,
        -30,-40,-40,-50,-50,-40,-40,-30,
        -30,-40,-40,-50,-50,-40,-40,-30,
        -20,-30,-30,-40,-40,-30,-30,-20,
        -10,-20,-20,-20,-20,-20,-20,-10,
         20, 20,  0,  0,  0,  0, 20, 20,
         20, 30, 10,  0,  0, 10, 30, 20,
    ];
}

impl Evaluator {
    /// 棋子基础分值
    pub fn piece_value(role: Role) -> i32 {
        match role {
            Role::Pawn => 100,
            Role::Knight => 320,
            Role::Bishop => 330,
            Role::Rook => 500,
            Role::Queen => 900,
            Role::King => 0,
        }
    }

    /// 评估局面（白方视角，正值对白方有利）
    pub fn evaluate(pos: &Chess) -> i32 {
        let board = pos.board();
        let mut score = 0;

        for sq in board.occupied() {
            if let Some(piece) = board.piece_at(sq) {
                let value = Self::piece_value(piece.role)
                    + Self::position_bonus(sq, piece.role, piece.color);
                match piece.color {
                    Color::White => score += value,
                    Color::Black => score -= value,
                }
            }
        }

        score
    }

    /// 获取位置加成分
    fn position_bonus(sq: Square, role: Role, color: Color) -> i32 {
        let index = match color {
            // 表格从第 8 横线开始排列，白方需要上下翻转
            Color::White => usize::from(sq.flip_vertical()),
            Color::Black => usize::from(sq),
        };

        match role {
            Role::Pawn => position_tables::PAWN[index],
            Role::Knight => position_tables::KNIGHT[index],
            Role::Bishop => position_tables::BISHOP[index],
            Role::Rook => position_tables::ROOK[index],
            Role::Queen => position_tables::QUEEN[index],
            Role::King => position_tables::KING[index],
        }
    }

    /// 快速评估（仅计算子力差）
    pub fn evaluate_material(pos: &Chess) -> i32 {
        let board = pos.board();
        board
            .occupied()
            .into_iter()
            .filter_map(|sq| board.piece_at(sq))
            .map(|piece| match piece.color {
                Color::White => Self::piece_value(piece.role),
                Color::Black => -Self::piece_value(piece.role),
            })
            .sum()
    }
}
