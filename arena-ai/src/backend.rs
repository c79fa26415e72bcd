//! 搜索后端抽象

use async_trait::async_trait;
use shakmaty::Chess;

use protocol::{Evaluation, MoveSpec};

use crate::error::EngineError;
use crate::search::{score_to_evaluation, AiConfig, AiEngine};
use crate::skill::EngineLimits;

/// 候选走法（评估为走子方视角）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub mv: MoveSpec,
    pub score: Evaluation,
}

/// 搜索后端
///
/// 实现方一次只处理一个请求，并发由 `EnginePool` 控制。
#[async_trait]
pub trait SearchBackend: Send {
    /// 后端名称（用于日志）
    fn name(&self) -> &str;

    /// 在给定限制下搜索一步最佳走法
    async fn best_move(&mut self, pos: &Chess, limits: &EngineLimits)
        -> Result<MoveSpec, EngineError>;

    /// 按优劣返回至多 `count` 个候选走法
    async fn top_moves(
        &mut self,
        pos: &Chess,
        count: usize,
        limits: &EngineLimits,
    ) -> Result<Vec<Candidate>, EngineError>;
}

/// 内置引擎后端，在阻塞线程池中运行搜索
pub struct BuiltinBackend {
    seed: Option<u64>,
}

impl BuiltinBackend {
    pub fn new() -> Self {
        Self { seed: None }
    }

    /// 固定随机种子，便于复现
    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    fn engine(&mut self, limits: &EngineLimits) -> AiEngine {
        match self.seed.as_mut() {
            Some(seed) => {
                *seed = seed.wrapping_add(1);
                AiEngine::new(AiConfig::from_limits(limits), *seed)
            }
            None => AiEngine::from_limits(limits),
        }
    }
}

impl Default for BuiltinBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchBackend for BuiltinBackend {
    fn name(&self) -> &str {
        "builtin"
    }

    async fn best_move(
        &mut self,
        pos: &Chess,
        limits: &EngineLimits,
    ) -> Result<MoveSpec, EngineError> {
        let mut engine = self.engine(limits);
        let pos = pos.clone();
        let found = tokio::task::spawn_blocking(move || engine.search(&pos))
            .await
            .map_err(|e| EngineError::Unavailable(format!("search task failed: {e}")))?;

        found
            .map(|(mv, _)| MoveSpec::from_move(&mv))
            .ok_or_else(|| EngineError::Protocol("no move in a position without legal moves".into()))
    }

    async fn top_moves(
        &mut self,
        pos: &Chess,
        count: usize,
        limits: &EngineLimits,
    ) -> Result<Vec<Candidate>, EngineError> {
        let mut engine = self.engine(limits);
        let pos = pos.clone();
        let ranked = tokio::task::spawn_blocking(move || engine.rank_moves(&pos, count))
            .await
            .map_err(|e| EngineError::Unavailable(format!("search task failed: {e}")))?;

        Ok(ranked
            .into_iter()
            .map(|(mv, score)| Candidate {
                mv: MoveSpec::from_move(&mv),
                score: score_to_evaluation(score),
            })
            .collect())
    }
}
