//! 国际象棋对练服务端
//!
//! 包含:
//! - 对局状态机与对局仓库
//! - 计时与提示额度
//! - 引擎网关（强度映射、引擎池排队）
//! - 消息处理与 TCP 服务
//! - 配置加载

pub mod clock;
pub mod config;
pub mod error;
pub mod gateway;
pub mod hints;
pub mod server;
pub mod session;
pub mod store;

#[cfg(test)]
mod testing;

pub use clock::{ClockSource, GameClock, SystemClock};
pub use config::{BackendKind, EngineSettings, ServerConfig};
pub use error::SessionError;
pub use gateway::{AnalysisGateway, ThinkTimes};
pub use hints::HintLedger;
pub use server::{handle_connection, serve, MessageHandler};
pub use session::{GameSession, HintOutcome};
pub use store::SessionStore;
