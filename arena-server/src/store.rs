//! 对局仓库

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use protocol::{Analysis, GameSnapshot, SessionConfig, SessionId};
use tokio::sync::{Mutex, RwLock};

use crate::clock::ClockSource;
use crate::error::SessionError;
use crate::gateway::AnalysisGateway;
use crate::session::{GameSession, HintOutcome};

/// 对局仓库
///
/// 同一对局上的操作由各自的互斥锁串行化，快照读取也走同一把锁。
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<GameSession>>>>,
    next_id: AtomicU64,
    gateway: AnalysisGateway,
    clock_source: Arc<dyn ClockSource>,
}

impl SessionStore {
    pub fn new(gateway: AnalysisGateway, clock_source: Arc<dyn ClockSource>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            gateway,
            clock_source,
        }
    }

    /// 创建对局
    pub async fn create(&self, config: SessionConfig) -> (SessionId, GameSnapshot) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let session = GameSession::new(id, config, self.clock_source.clone());
        let snapshot = session.snapshot();

        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(session)));
        tracing::info!(
            session = id,
            difficulty = %config.difficulty,
            time_limit = ?config.time_limit,
            player_side = %config.player_side,
            "创建对局"
        );

        (id, snapshot)
    }

    /// 查找对局
    pub async fn get(&self, id: SessionId) -> Result<Arc<Mutex<GameSession>>, SessionError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(SessionError::NotFound(id))
    }

    /// 关闭对局
    pub async fn remove(&self, id: SessionId) -> Result<(), SessionError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| tracing::info!(session = id, "关闭对局"))
            .ok_or(SessionError::NotFound(id))
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    pub async fn snapshot(&self, id: SessionId) -> Result<GameSnapshot, SessionError> {
        let session = self.get(id).await?;
        let mut session = session.lock().await;
        session.poll_clock();
        Ok(session.snapshot())
    }

    pub async fn apply_move(
        &self,
        id: SessionId,
        notation: &str,
    ) -> Result<GameSnapshot, SessionError> {
        let session = self.get(id).await?;
        let mut session = session.lock().await;
        session.apply_player_move(notation, &self.gateway).await
    }

    pub async fn engine_move(&self, id: SessionId) -> Result<GameSnapshot, SessionError> {
        let session = self.get(id).await?;
        let mut session = session.lock().await;
        session.request_engine_move(&self.gateway).await
    }

    pub async fn hint(&self, id: SessionId) -> Result<HintOutcome, SessionError> {
        let session = self.get(id).await?;
        let mut session = session.lock().await;
        session.request_hint(&self.gateway).await
    }

    pub async fn analysis(&self, id: SessionId, lines: usize) -> Result<Analysis, SessionError> {
        let session = self.get(id).await?;
        let mut session = session.lock().await;
        session.request_analysis(lines, &self.gateway).await
    }

    pub async fn resign(&self, id: SessionId) -> Result<GameSnapshot, SessionError> {
        let session = self.get(id).await?;
        let mut session = session.lock().await;
        session.resign()
    }

    pub async fn export_pgn(&self, id: SessionId) -> Result<String, SessionError> {
        let session = self.get(id).await?;
        let mut session = session.lock().await;
        session.poll_clock();
        Ok(session.export_pgn())
    }
}
