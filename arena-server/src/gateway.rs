//! 引擎网关
//!
//! 把 0-20 强度翻译为引擎限制，从引擎池借出实例，并在返回前校验引擎给出的走法。

use std::sync::Arc;
use std::time::Duration;

use arena_ai::{EngineError, EnginePool, SkillTable};
use protocol::{
    Analysis, Chess, MoveSpec, MoveValidator, RankedMove, Side, ANALYSIS_TIME_MS,
    ENGINE_MOVE_TIME_MS, HINT_STRENGTH, HINT_TIME_MS,
};
use shakmaty::Position;

/// 各类请求的思考时间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThinkTimes {
    pub engine_move: Duration,
    pub hint: Duration,
    pub analysis: Duration,
}

impl Default for ThinkTimes {
    fn default() -> Self {
        Self {
            engine_move: Duration::from_millis(ENGINE_MOVE_TIME_MS),
            hint: Duration::from_millis(HINT_TIME_MS),
            analysis: Duration::from_millis(ANALYSIS_TIME_MS),
        }
    }
}

/// 引擎网关
pub struct AnalysisGateway {
    pool: Arc<EnginePool>,
    skills: SkillTable,
    times: ThinkTimes,
}

fn check_legal(pos: &Chess, mv: MoveSpec) -> Result<MoveSpec, EngineError> {
    if MoveValidator::is_legal(pos, mv) {
        Ok(mv)
    } else {
        tracing::error!(%mv, fen = %MoveValidator::fen(pos), "引擎给出非法走法");
        Err(EngineError::Protocol(format!("engine suggested illegal move {mv}")))
    }
}

impl AnalysisGateway {
    pub fn new(pool: Arc<EnginePool>, skills: SkillTable, times: ThinkTimes) -> Self {
        Self {
            pool,
            skills,
            times,
        }
    }

    /// 指定强度和思考时间下的最佳走法
    pub async fn best_move(
        &self,
        pos: &Chess,
        strength: u8,
        think_time: Duration,
    ) -> Result<MoveSpec, EngineError> {
        let limits = self.skills.limits(strength, think_time);
        let mut engine = self.pool.acquire().await?;
        let mv = engine.best_move(pos, &limits).await?;
        tracing::debug!(engine = engine.name(), %mv, strength, "引擎走法");
        check_legal(pos, mv)
    }

    /// 前 `count` 个候选走法，评估统一为白方视角
    pub async fn top_moves(
        &self,
        pos: &Chess,
        count: usize,
        think_time: Duration,
    ) -> Result<Analysis, EngineError> {
        let limits = self.skills.limits(HINT_STRENGTH, think_time);
        let side_to_move = Side::from(pos.turn());

        let candidates = {
            let mut engine = self.pool.acquire().await?;
            engine.top_moves(pos, count, &limits).await?
        };

        let lines = candidates
            .into_iter()
            .take(count)
            .map(|c| {
                Ok(RankedMove {
                    mv: check_legal(pos, c.mv)?,
                    evaluation: c.score.from_side_to_move(side_to_move),
                })
            })
            .collect::<Result<Vec<_>, EngineError>>()?;

        Ok(Analysis {
            evaluation: lines.first().map(|l| l.evaluation),
            lines,
        })
    }

    /// 对手走法
    pub async fn engine_move(&self, pos: &Chess, difficulty: u8) -> Result<MoveSpec, EngineError> {
        self.best_move(pos, difficulty, self.times.engine_move).await
    }

    /// 提示走法（固定强度）
    pub async fn hint(&self, pos: &Chess) -> Result<MoveSpec, EngineError> {
        self.best_move(pos, HINT_STRENGTH, self.times.hint).await
    }

    /// 局面分析
    pub async fn analyze(&self, pos: &Chess, lines: usize) -> Result<Analysis, EngineError> {
        self.top_moves(pos, lines, self.times.analysis).await
    }
}
