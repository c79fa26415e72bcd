//! 内置搜索引擎
//!
//! 实现 Alpha-Beta 剪枝 + 静态搜索 + 迭代加深

use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use shakmaty::{Chess, Move, Position};

use protocol::{Evaluation, MAX_DIFFICULTY};

use crate::evaluate::Evaluator;
use crate::skill::EngineLimits;

/// 将杀分值
const MATE_SCORE: i32 = 100_000;

/// 判定为将杀分值的阈值
const MATE_THRESHOLD: i32 = MATE_SCORE - 1_000;

/// 静态搜索最大层数
const QUIESCENCE_DEPTH: u8 = 4;

/// 最低强度下随机走子的概率
const MAX_BLUNDER_RATE: f64 = 0.3;

/// AI 配置
#[derive(Debug, Clone, PartialEq)]
pub struct AiConfig {
    pub max_depth: u8,
    pub time_limit: Duration,
    /// 随机走子概率
    pub blunder_rate: f64,
}

impl AiConfig {
    /// 从搜索限制创建：强度越低搜索越浅、失误越多
    pub fn from_limits(limits: &EngineLimits) -> Self {
        let skill = limits.skill_level.min(MAX_DIFFICULTY);
        let natural_depth = 1 + skill / 5;
        let max_depth = match limits.depth {
            Some(cap) => natural_depth.min(cap.max(1)),
            None => natural_depth,
        };
        let weakness = f64::from(MAX_DIFFICULTY - skill) / f64::from(MAX_DIFFICULTY);

        Self {
            max_depth,
            time_limit: limits.move_time,
            blunder_rate: MAX_BLUNDER_RATE * weakness,
        }
    }
}

/// 把内部分值转换为评估（走子方视角）
pub fn score_to_evaluation(score: i32) -> Evaluation {
    if score >= MATE_THRESHOLD {
        Evaluation::Mate((MATE_SCORE - score + 1) / 2)
    } else if score <= -MATE_THRESHOLD {
        Evaluation::Mate(-((MATE_SCORE + score + 1) / 2))
    } else {
        Evaluation::Centipawns(score)
    }
}

/// AI 引擎
pub struct AiEngine {
    config: AiConfig,
    rng: ChaCha8Rng,
    nodes_searched: u64,
    timed_out: bool,
}

impl AiEngine {
    /// 创建新的 AI 引擎（固定随机种子）
    pub fn new(config: AiConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            nodes_searched: 0,
            timed_out: false,
        }
    }

    /// 从搜索限制创建
    pub fn from_limits(limits: &EngineLimits) -> Self {
        Self {
            config: AiConfig::from_limits(limits),
            rng: ChaCha8Rng::from_entropy(),
            nodes_searched: 0,
            timed_out: false,
        }
    }

    /// 搜索最佳走法，返回走法和走子方视角的分值
    pub fn search(&mut self, pos: &Chess) -> Option<(Move, i32)> {
        let ranked = self.iterate(pos, false);
        let best = ranked.first().cloned()?;

        // 低强度时按概率随机走子
        if ranked.len() > 1 && self.rng.gen_bool(self.config.blunder_rate) {
            if let Some(random) = ranked.choose(&mut self.rng) {
                tracing::debug!(nodes = self.nodes_searched, "随机走子");
                return Some(random.clone());
            }
        }

        Some(best)
    }

    /// 对所有根节点走法精确打分并排序，返回前 `count` 个
    pub fn rank_moves(&mut self, pos: &Chess, count: usize) -> Vec<(Move, i32)> {
        let mut ranked = self.iterate(pos, true);
        ranked.truncate(count);
        ranked
    }

    /// 迭代加深；`exact` 为真时每个根走法都用全窗口搜索
    fn iterate(&mut self, pos: &Chess, exact: bool) -> Vec<(Move, i32)> {
        self.nodes_searched = 0;
        self.timed_out = false;
        let deadline = Instant::now() + self.config.time_limit;

        let mut moves: Vec<Move> = pos.legal_moves().into_iter().collect();
        if moves.is_empty() {
            return Vec::new();
        }
        order_moves(&mut moves);

        let mut completed: Vec<(Move, i32)> = Vec::new();
        for depth in 1..=self.config.max_depth.max(1) {
            if depth > 1 && Instant::now() >= deadline {
                break;
            }

            let mut scored = Vec::with_capacity(moves.len());
            let mut alpha = -MATE_SCORE - 1;
            for mv in &moves {
                let mut child = pos.clone();
                child.play_unchecked(mv);

                let window_alpha = if exact { -MATE_SCORE - 1 } else { alpha };
                let score = -self.alpha_beta(
                    &child,
                    depth - 1,
                    1,
                    -MATE_SCORE - 1,
                    -window_alpha,
                    &deadline,
                );
                alpha = alpha.max(score);
                scored.push((mv.clone(), score));
            }

            // 超时的那一层结果不完整，只在没有任何结果时采用
            if self.timed_out && !completed.is_empty() {
                break;
            }

            scored.sort_by(|a, b| b.1.cmp(&a.1));
            // 下一层按本层结果排序，提高剪枝效率
            moves = scored.iter().map(|(m, _)| m.clone()).collect();
            completed = scored;

            if self.timed_out {
                break;
            }
        }

        completed
    }

    /// Alpha-Beta 搜索（负极大值形式）
    fn alpha_beta(
        &mut self,
        pos: &Chess,
        depth: u8,
        ply: i32,
        mut alpha: i32,
        beta: i32,
        deadline: &Instant,
    ) -> i32 {
        self.nodes_searched += 1;

        let mut moves: Vec<Move> = pos.legal_moves().into_iter().collect();
        if moves.is_empty() {
            return if pos.is_check() {
                // 被将死，越早越差
                -(MATE_SCORE - ply)
            } else {
                0
            };
        }
        if pos.is_insufficient_material() {
            return 0;
        }

        // 超时时返回当前静态评估值
        if Instant::now() >= *deadline {
            self.timed_out = true;
            return self.evaluate(pos);
        }

        if depth == 0 {
            return self.quiescence(pos, alpha, beta, QUIESCENCE_DEPTH);
        }

        order_moves(&mut moves);
        for mv in &moves {
            let mut child = pos.clone();
            child.play_unchecked(mv);

            let score = -self.alpha_beta(&child, depth - 1, ply + 1, -beta, -alpha, deadline);
            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        alpha
    }

    /// 静态搜索（只搜索吃子和升变）
    fn quiescence(&mut self, pos: &Chess, mut alpha: i32, beta: i32, depth: u8) -> i32 {
        self.nodes_searched += 1;

        let stand_pat = self.evaluate(pos);
        if depth == 0 {
            return stand_pat;
        }
        if stand_pat >= beta {
            return beta;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let mut tactical: Vec<Move> = pos
            .legal_moves()
            .into_iter()
            .filter(|m| m.is_capture() || m.is_promotion())
            .collect();
        order_moves(&mut tactical);

        for mv in &tactical {
            let mut child = pos.clone();
            child.play_unchecked(mv);

            let score = -self.quiescence(&child, -beta, -alpha, depth - 1);
            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        alpha
    }

    /// 评估当前局面（走子方视角）
    fn evaluate(&self, pos: &Chess) -> i32 {
        let score = Evaluator::evaluate(pos);
        match pos.turn() {
            shakmaty::Color::White => score,
            shakmaty::Color::Black => -score,
        }
    }

    /// 获取搜索的节点数
    pub fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }
}

/// MVV-LVA 排序：先吃高价值子，再用低价值子吃
fn order_moves(moves: &mut [Move]) {
    moves.sort_by_cached_key(|m| {
        let victim = m.capture().map(Evaluator::piece_value).unwrap_or(0);
        let promotion = m.promotion().map(Evaluator::piece_value).unwrap_or(0);
        let attacker = Evaluator::piece_value(m.role()) / 100;
        -(victim * 10 + promotion - attacker)
    });
}
