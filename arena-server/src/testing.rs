//! 测试辅助：可编排的搜索后端

use std::sync::{Arc, Mutex};
use std::time::Duration;

use arena_ai::{Candidate, EngineError, EngineLimits, EnginePool, SearchBackend, SkillTable};
use async_trait::async_trait;
use protocol::{Chess, Evaluation, MoveSpec, MoveValidator};

use crate::clock::ManualClock;
use crate::gateway::{AnalysisGateway, ThinkTimes};

#[derive(Default)]
struct Script {
    forced: Option<String>,
    failure: Option<EngineError>,
    last_skill: Option<u8>,
    calls: usize,
    think: Option<(Arc<ManualClock>, Duration)>,
}

/// 默认走第一个合法走法，可注入失败、指定走法或模拟思考耗时
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    script: Arc<Mutex<Script>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn force_move(&self, mv: &str) {
        self.script.lock().unwrap().forced = Some(mv.to_string());
    }

    pub fn clear_forced_move(&self) {
        self.script.lock().unwrap().forced = None;
    }

    pub fn fail_with(&self, failure: Option<EngineError>) {
        self.script.lock().unwrap().failure = failure;
    }

    /// 每次调用时把手动时钟推进 `by`
    pub fn think_for(&self, clock: Arc<ManualClock>, by: Duration) {
        self.script.lock().unwrap().think = Some((clock, by));
    }

    pub fn last_skill(&self) -> Option<u8> {
        self.script.lock().unwrap().last_skill
    }

    pub fn calls(&self) -> usize {
        self.script.lock().unwrap().calls
    }

    fn begin(&self, limits: &EngineLimits) -> Result<Option<String>, EngineError> {
        let mut script = self.script.lock().unwrap();
        script.calls += 1;
        script.last_skill = Some(limits.skill_level);
        if let Some((clock, by)) = &script.think {
            clock.advance(*by);
        }
        match &script.failure {
            Some(e) => Err(e.clone()),
            None => Ok(script.forced.clone()),
        }
    }
}

#[async_trait]
impl SearchBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn best_move(
        &mut self,
        pos: &Chess,
        limits: &EngineLimits,
    ) -> Result<MoveSpec, EngineError> {
        if let Some(forced) = self.begin(limits)? {
            return MoveSpec::parse(&forced).map_err(|e| EngineError::Protocol(e.to_string()));
        }
        MoveValidator::legal_moves(pos)
            .first()
            .copied()
            .ok_or_else(|| EngineError::Protocol("no legal moves".into()))
    }

    async fn top_moves(
        &mut self,
        pos: &Chess,
        count: usize,
        limits: &EngineLimits,
    ) -> Result<Vec<Candidate>, EngineError> {
        self.begin(limits)?;
        Ok(MoveValidator::legal_moves(pos)
            .into_iter()
            .take(count)
            .enumerate()
            .map(|(i, mv)| Candidate {
                mv,
                score: Evaluation::Centipawns(30 - 10 * i as i32),
            })
            .collect())
    }
}

/// 单实例引擎池上的网关
pub fn gateway_with(backend: ScriptedBackend) -> AnalysisGateway {
    let pool = EnginePool::new(vec![Box::new(backend) as Box<dyn SearchBackend>], 4);
    AnalysisGateway::new(Arc::new(pool), SkillTable::default(), ThinkTimes::default())
}
