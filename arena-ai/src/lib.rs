//! 国际象棋搜索引擎
//!
//! 包含:
//! - 搜索后端抽象 (SearchBackend)
//! - UCI 外部引擎驱动
//! - 内置 Alpha-Beta 搜索和局面评估
//! - 强度映射表
//! - 带等待队列的引擎池

mod backend;
mod error;
mod evaluate;
mod pool;
mod process;
mod search;
mod skill;
pub mod uci;

pub use backend::{BuiltinBackend, Candidate, SearchBackend};
pub use error::EngineError;
pub use evaluate::Evaluator;
pub use pool::{EnginePool, PooledEngine};
pub use process::{UciConfig, UciEngine};
pub use search::{score_to_evaluation, AiConfig, AiEngine};
pub use skill::{EngineLimits, SkillLevel, SkillTable};
