//! 对局状态机
//!
//! 一局人机对弈：玩家走子后由引擎应着，同时维护计时、提示额度和棋谱。

use std::sync::Arc;

use protocol::{
    Analysis, Chess, Difficulty, EndReason, GameRecord, GameSnapshot, GameStatus, MoveSpec,
    MoveValidator, SessionConfig, SessionId, Side, TimeLimit, Verdict, FIVEFOLD_REPETITION,
    MAX_ANALYSIS_LINES,
};
use shakmaty::Position;

use crate::clock::{ClockSource, GameClock};
use crate::error::SessionError;
use crate::gateway::AnalysisGateway;
use crate::hints::HintLedger;

/// 提示结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintOutcome {
    pub mv: MoveSpec,
    pub hints_used: u8,
    pub max_hints: u8,
}

/// 对局
pub struct GameSession {
    id: SessionId,
    position: Chess,
    history: Vec<MoveSpec>,
    /// 每个局面的重复判定键，含初始局面
    position_keys: Vec<String>,
    record: GameRecord,
    status: GameStatus,
    winner: Option<Side>,
    reason: Option<EndReason>,
    difficulty: Difficulty,
    time_limit: TimeLimit,
    player_side: Side,
    clock: GameClock,
    hints: HintLedger,
    clock_source: Arc<dyn ClockSource>,
}

impl GameSession {
    /// 在初始局面创建新对局
    pub fn new(id: SessionId, config: SessionConfig, clock_source: Arc<dyn ClockSource>) -> Self {
        let position = MoveValidator::initial();
        let engine_name = format!("Engine (level {})", config.difficulty.value());
        let (white, black) = match config.player_side {
            Side::White => ("Human".to_string(), engine_name),
            Side::Black => (engine_name, "Human".to_string()),
        };

        Self {
            id,
            position_keys: vec![MoveValidator::position_key(&position)],
            position,
            history: Vec::new(),
            record: GameRecord::new(white, black, config.time_limit),
            status: GameStatus::InProgress,
            winner: None,
            reason: None,
            difficulty: config.difficulty,
            time_limit: config.time_limit,
            player_side: config.player_side,
            clock: GameClock::new(config.time_limit, clock_source.now()),
            hints: HintLedger::default(),
            clock_source,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status.is_terminal()
    }

    /// 走子方
    pub fn turn(&self) -> Side {
        Side::from(self.position.turn())
    }

    pub fn engine_side(&self) -> Side {
        self.player_side.opponent()
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn history(&self) -> &[MoveSpec] {
        &self.history
    }

    /// 玩家走子，随后由引擎应着
    ///
    /// 引擎失败时玩家这一步保留，错误返回给调用方，之后可通过
    /// [`request_engine_move`](Self::request_engine_move) 重试。
    pub async fn apply_player_move(
        &mut self,
        notation: &str,
        gateway: &AnalysisGateway,
    ) -> Result<GameSnapshot, SessionError> {
        self.ensure_in_progress()?;
        if self.turn() != self.player_side {
            return Err(SessionError::OutOfTurn(self.turn()));
        }
        self.check_clock(self.player_side)?;

        let mv = MoveValidator::resolve(&self.position, notation)?;
        self.play(mv)?;

        if !self.is_over() {
            self.engine_reply(gateway).await?;
        }
        Ok(self.snapshot())
    }

    /// 引擎走子（玩家执黑时的第一步，或引擎失败后的重试）
    pub async fn request_engine_move(
        &mut self,
        gateway: &AnalysisGateway,
    ) -> Result<GameSnapshot, SessionError> {
        self.ensure_in_progress()?;
        let engine_side = self.engine_side();
        if self.turn() != engine_side {
            return Err(SessionError::OutOfTurn(self.turn()));
        }
        self.check_clock(engine_side)?;

        self.engine_reply(gateway).await?;
        Ok(self.snapshot())
    }

    /// 请求提示，引擎成功返回后才扣除额度
    pub async fn request_hint(
        &mut self,
        gateway: &AnalysisGateway,
    ) -> Result<HintOutcome, SessionError> {
        self.ensure_in_progress()?;
        self.check_clock(self.turn())?;
        if !self.hints.can_use() {
            return Err(SessionError::HintBudgetExhausted {
                max: self.hints.max(),
            });
        }

        let mv = gateway.hint(&self.position).await?;
        let hints_used = self.hints.consume()?;
        tracing::debug!(session = self.id, %mv, hints_used, "提示");

        Ok(HintOutcome {
            mv,
            hints_used,
            max_hints: self.hints.max(),
        })
    }

    /// 局面分析，最多返回 `lines` 个候选（上限 MAX_ANALYSIS_LINES）
    pub async fn request_analysis(
        &mut self,
        lines: usize,
        gateway: &AnalysisGateway,
    ) -> Result<Analysis, SessionError> {
        self.ensure_in_progress()?;
        self.check_clock(self.turn())?;
        if lines == 0 {
            return Ok(Analysis {
                evaluation: None,
                lines: Vec::new(),
            });
        }
        Ok(gateway
            .analyze(&self.position, lines.min(MAX_ANALYSIS_LINES))
            .await?)
    }

    /// 玩家认输
    pub fn resign(&mut self) -> Result<GameSnapshot, SessionError> {
        self.ensure_in_progress()?;
        self.check_clock(self.turn())?;
        self.finish(
            GameStatus::Resigned,
            Some(self.engine_side()),
            EndReason::Resignation,
        );
        Ok(self.snapshot())
    }

    /// 走子方超时则立即判负，返回是否发生了判定
    ///
    /// 只读请求（快照、PGN）在读取前调用，保证超时后看到的是终局状态。
    pub fn poll_clock(&mut self) -> bool {
        if self.is_over() {
            return false;
        }
        self.check_clock(self.turn()).is_err()
    }

    /// 导出 PGN
    pub fn export_pgn(&self) -> String {
        self.record.to_pgn()
    }

    /// 当前快照
    pub fn snapshot(&self) -> GameSnapshot {
        let now = self.clock_source.now();
        let game_over = self.is_over();

        GameSnapshot {
            id: self.id,
            fen: MoveValidator::fen(&self.position),
            movetext: self.record.movetext(),
            moves: self.history.clone(),
            turn: self.turn(),
            in_check: self.position.is_check(),
            legal_moves: if game_over {
                Vec::new()
            } else {
                MoveValidator::legal_moves(&self.position)
            },
            half_move_count: self.history.len() as u32,
            hints_used: self.hints.used(),
            max_hints: self.hints.max(),
            status: self.status,
            winner: self.winner,
            reason: self.reason,
            difficulty: self.difficulty,
            time_limit: self.time_limit,
            player_side: self.player_side,
            white_time_ms: self.clock.remaining(Side::White, now),
            black_time_ms: self.clock.remaining(Side::Black, now),
            game_over,
        }
    }

    fn ensure_in_progress(&self) -> Result<(), SessionError> {
        if self.is_over() {
            return Err(SessionError::GameAlreadyOver);
        }
        Ok(())
    }

    /// 超时则结束对局并拒绝请求
    fn check_clock(&mut self, side: Side) -> Result<(), SessionError> {
        if self.clock.is_expired(side, self.clock_source.now()) {
            self.finish(GameStatus::TimedOut, Some(side.opponent()), EndReason::Timeout);
            return Err(SessionError::ClockExpired(side));
        }
        Ok(())
    }

    async fn engine_reply(&mut self, gateway: &AnalysisGateway) -> Result<(), SessionError> {
        let engine_side = self.engine_side();
        let mv = match gateway
            .engine_move(&self.position, self.difficulty.value())
            .await
        {
            Ok(mv) => mv,
            Err(e) => {
                tracing::warn!(session = self.id, error = %e, "引擎应着失败");
                return Err(e.into());
            }
        };

        // 引擎思考期间用完了时间
        if self.clock.is_expired(engine_side, self.clock_source.now()) {
            self.finish(
                GameStatus::TimedOut,
                Some(self.player_side),
                EndReason::Timeout,
            );
            return Ok(());
        }

        self.play(mv).map_err(|e| {
            SessionError::Engine(arena_ai::EngineError::Protocol(e.to_string()))
        })
    }

    /// 执行一步合法走法并判定终局
    fn play(&mut self, mv: MoveSpec) -> Result<(), SessionError> {
        let mv = MoveValidator::normalize(&self.position, mv)?;
        let (next, san) = MoveValidator::apply(&self.position, mv)?;

        self.position = next;
        self.history.push(mv);
        self.record.add_move(mv, san);
        self.clock.switch(self.clock_source.now());

        let key = MoveValidator::position_key(&self.position);
        let repetitions = self.position_keys.iter().filter(|k| **k == key).count() + 1;
        self.position_keys.push(key);

        match MoveValidator::verdict(&self.position) {
            Verdict::Checkmate { winner } => {
                self.finish(GameStatus::Checkmate, Some(winner), EndReason::Checkmate)
            }
            Verdict::Stalemate => self.finish(GameStatus::Stalemate, None, EndReason::Stalemate),
            Verdict::Draw(reason) => self.finish(GameStatus::Draw, None, reason),
            Verdict::Ongoing if repetitions >= FIVEFOLD_REPETITION => {
                self.finish(GameStatus::Draw, None, EndReason::FivefoldRepetition)
            }
            Verdict::Ongoing => {}
        }
        Ok(())
    }

    fn finish(&mut self, status: GameStatus, winner: Option<Side>, reason: EndReason) {
        self.status = status;
        self.winner = winner;
        self.reason = Some(reason);
        self.clock.stop(self.clock_source.now());
        self.record.set_result(status, winner);
        tracing::info!(
            session = self.id,
            ?status,
            winner = ?winner,
            %reason,
            moves = self.history.len(),
            "对局结束"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use arena_ai::EngineError;
    use protocol::{ErrorCode, MAX_HINTS};

    use crate::clock::ManualClock;
    use crate::testing::{gateway_with, ScriptedBackend};

    struct Fixture {
        clock: Arc<ManualClock>,
        backend: ScriptedBackend,
        gateway: AnalysisGateway,
    }

    impl Fixture {
        fn new() -> Self {
            let backend = ScriptedBackend::new();
            Self {
                clock: Arc::new(ManualClock::new()),
                gateway: gateway_with(backend.clone()),
                backend,
            }
        }

        fn session(&self, difficulty: u8, minutes: Option<u8>, player_side: Side) -> GameSession {
            let config = SessionConfig {
                difficulty: Difficulty::new(difficulty).unwrap(),
                time_limit: TimeLimit::from_minutes(minutes).unwrap(),
                player_side,
            };
            GameSession::new(1, config, self.clock.clone())
        }
    }

    #[test]
    fn test_new_session() {
        let fx = Fixture::new();
        let snap = fx.session(20, None, Side::White).snapshot();

        assert_eq!(snap.turn, Side::White);
        assert_eq!(snap.half_move_count, 0);
        assert_eq!(snap.status, GameStatus::InProgress);
        assert_eq!(snap.legal_moves.len(), 20);
        assert_eq!(snap.max_hints, MAX_HINTS);
        assert_eq!(snap.white_time_ms, None);
        assert!(!snap.game_over);
    }

    #[tokio::test]
    async fn test_move_gets_engine_reply() {
        let fx = Fixture::new();
        let mut session = fx.session(10, Some(5), Side::White);

        let snap = session.apply_player_move("e2e4", &fx.gateway).await.unwrap();
        assert_eq!(snap.half_move_count, 2);
        assert_eq!(snap.turn, Side::White);
        assert_eq!(snap.moves[0].to_string(), "e2e4");
        assert!(snap.movetext.starts_with("1. e4 "));
        assert_eq!(fx.backend.calls(), 1);

        // 历史可重放出当前局面
        let replayed = MoveValidator::replay(session.history()).unwrap();
        assert_eq!(MoveValidator::fen(&replayed), snap.fen);
    }

    #[tokio::test]
    async fn test_san_input() {
        let fx = Fixture::new();
        let mut session = fx.session(10, None, Side::White);
        let snap = session.apply_player_move("Nf3", &fx.gateway).await.unwrap();
        assert_eq!(snap.moves[0].to_string(), "g1f3");
    }

    #[tokio::test]
    async fn test_illegal_move_leaves_state() {
        let fx = Fixture::new();
        let mut session = fx.session(10, None, Side::White);
        let before = session.snapshot();

        let err = session.apply_player_move("e2e5", &fx.gateway).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::IllegalMove);
        assert_eq!(session.snapshot(), before);
        assert_eq!(fx.backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_clock_expiry() {
        let fx = Fixture::new();
        let mut session = fx.session(10, Some(1), Side::White);

        fx.clock.advance(Duration::from_secs(61));
        let err = session.apply_player_move("e2e4", &fx.gateway).await.unwrap_err();
        assert_eq!(err, SessionError::ClockExpired(Side::White));

        let snap = session.snapshot();
        assert_eq!(snap.status, GameStatus::TimedOut);
        assert_eq!(snap.winner, Some(Side::Black));
        assert_eq!(snap.reason, Some(EndReason::Timeout));
        assert_eq!(snap.white_time_ms, Some(0));
        assert_eq!(snap.half_move_count, 0);
    }

    #[tokio::test]
    async fn test_unlimited_never_expires() {
        let fx = Fixture::new();
        let mut session = fx.session(10, None, Side::White);

        fx.clock.advance(Duration::from_secs(10 * 24 * 3600));
        assert!(session.apply_player_move("e2e4", &fx.gateway).await.is_ok());
    }

    #[tokio::test]
    async fn test_engine_times_out_while_thinking() {
        let fx = Fixture::new();
        fx.backend.think_for(fx.clock.clone(), Duration::from_secs(120));
        let mut session = fx.session(10, Some(1), Side::White);

        let snap = session.apply_player_move("e2e4", &fx.gateway).await.unwrap();
        assert_eq!(snap.status, GameStatus::TimedOut);
        assert_eq!(snap.winner, Some(Side::White));
        assert_eq!(snap.half_move_count, 1);
        assert_eq!(snap.black_time_ms, Some(0));
    }

    #[tokio::test]
    async fn test_engine_failure_keeps_player_move() {
        let fx = Fixture::new();
        let mut session = fx.session(10, None, Side::White);

        fx.backend
            .fail_with(Some(EngineError::Unavailable("crashed".into())));
        let err = session.apply_player_move("e2e4", &fx.gateway).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::EngineUnavailable);
        assert!(err.is_recoverable());

        let snap = session.snapshot();
        assert_eq!(snap.half_move_count, 1);
        assert_eq!(snap.turn, Side::Black);
        assert_eq!(snap.status, GameStatus::InProgress);

        // 玩家不能替引擎走
        let err = session.apply_player_move("e7e5", &fx.gateway).await.unwrap_err();
        assert_eq!(err, SessionError::OutOfTurn(Side::Black));

        fx.backend.fail_with(None);
        let snap = session.request_engine_move(&fx.gateway).await.unwrap();
        assert_eq!(snap.half_move_count, 2);
        assert_eq!(snap.turn, Side::White);
    }

    #[tokio::test]
    async fn test_illegal_engine_reply() {
        let fx = Fixture::new();
        let mut session = fx.session(10, None, Side::White);

        fx.backend.force_move("a7a1");
        let err = session.apply_player_move("e2e4", &fx.gateway).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::EngineProtocolError);
        assert_eq!(session.snapshot().half_move_count, 1);
    }

    #[tokio::test]
    async fn test_player_as_black() {
        let fx = Fixture::new();
        let mut session = fx.session(5, None, Side::Black);

        let err = session.apply_player_move("e7e5", &fx.gateway).await.unwrap_err();
        assert_eq!(err, SessionError::OutOfTurn(Side::White));

        let snap = session.request_engine_move(&fx.gateway).await.unwrap();
        assert_eq!(snap.turn, Side::Black);
        assert_eq!(snap.half_move_count, 1);

        let err = session.request_engine_move(&fx.gateway).await.unwrap_err();
        assert_eq!(err, SessionError::OutOfTurn(Side::Black));

        let pgn = session.export_pgn();
        assert!(pgn.contains("[White \"Engine (level 5)\"]"));
        assert!(pgn.contains("[Black \"Human\"]"));
    }

    #[tokio::test]
    async fn test_hint_budget() {
        let fx = Fixture::new();
        let mut session = fx.session(10, None, Side::White);

        for used in 1..=MAX_HINTS {
            let hint = session.request_hint(&fx.gateway).await.unwrap();
            assert_eq!(hint.hints_used, used);
            assert!(MoveValidator::is_legal(session.position(), hint.mv));
        }
        let err = session.request_hint(&fx.gateway).await.unwrap_err();
        assert_eq!(err, SessionError::HintBudgetExhausted { max: MAX_HINTS });
        assert_eq!(session.snapshot().hints_used, MAX_HINTS);
    }

    #[tokio::test]
    async fn test_failed_hint_is_free() {
        let fx = Fixture::new();
        let mut session = fx.session(10, None, Side::White);

        fx.backend.fail_with(Some(EngineError::Busy { waiting: 4 }));
        let err = session.request_hint(&fx.gateway).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::EngineBusy);
        assert_eq!(session.snapshot().hints_used, 0);
    }

    #[tokio::test]
    async fn test_expired_clock_rejects_hint() {
        let fx = Fixture::new();
        let mut session = fx.session(10, Some(1), Side::White);

        fx.clock.advance(Duration::from_secs(120));
        let err = session.request_hint(&fx.gateway).await.unwrap_err();
        assert_eq!(err, SessionError::ClockExpired(Side::White));
        assert_eq!(fx.backend.calls(), 0);

        let snap = session.snapshot();
        assert_eq!(snap.hints_used, 0);
        assert_eq!(snap.status, GameStatus::TimedOut);
        assert_eq!(snap.winner, Some(Side::Black));
        assert!(snap.legal_moves.is_empty());
    }

    #[tokio::test]
    async fn test_expired_clock_rejects_analysis_and_resign() {
        let fx = Fixture::new();
        let mut session = fx.session(10, Some(1), Side::White);
        fx.clock.advance(Duration::from_secs(61));
        assert_eq!(
            session.request_analysis(3, &fx.gateway).await,
            Err(SessionError::ClockExpired(Side::White))
        );
        assert_eq!(session.resign(), Err(SessionError::GameAlreadyOver));
        assert_eq!(session.snapshot().reason, Some(EndReason::Timeout));

        let mut session = fx.session(10, Some(1), Side::White);
        fx.clock.advance(Duration::from_secs(61));
        assert_eq!(session.resign(), Err(SessionError::ClockExpired(Side::White)));
        assert_eq!(session.status(), GameStatus::TimedOut);
    }

    #[test]
    fn test_poll_clock() {
        let fx = Fixture::new();
        let mut session = fx.session(10, Some(1), Side::White);

        fx.clock.advance(Duration::from_secs(30));
        assert!(!session.poll_clock());
        assert_eq!(session.status(), GameStatus::InProgress);

        fx.clock.advance(Duration::from_secs(31));
        assert!(session.poll_clock());
        let snap = session.snapshot();
        assert_eq!(snap.status, GameStatus::TimedOut);
        assert!(snap.game_over);
        assert_eq!(snap.white_time_ms, Some(0));
        assert!(!session.poll_clock());

        // 不限时永不判负
        let mut session = fx.session(10, None, Side::White);
        fx.clock.advance(Duration::from_secs(86_400));
        assert!(!session.poll_clock());
    }

    #[tokio::test]
    async fn test_engine_clock_expired_before_first_move() {
        let fx = Fixture::new();
        let mut session = fx.session(10, Some(1), Side::Black);

        fx.clock.advance(Duration::from_secs(61));
        let err = session.request_engine_move(&fx.gateway).await.unwrap_err();
        assert_eq!(err, SessionError::ClockExpired(Side::White));
        assert_eq!(fx.backend.calls(), 0);

        let snap = session.snapshot();
        assert_eq!(snap.status, GameStatus::TimedOut);
        assert_eq!(snap.winner, Some(Side::Black));
        assert_eq!(snap.reason, Some(EndReason::Timeout));
        assert_eq!(snap.half_move_count, 0);
    }

    #[tokio::test]
    async fn test_castling_recorded_in_standard_form() {
        let fx = Fixture::new();
        let mut session = fx.session(10, None, Side::White);

        let replies = ["a7a6", "a6a5", "a5a4", "b7b6"];
        for (player, reply) in ["e2e4", "g1f3", "f1c4"].iter().zip(replies) {
            fx.backend.force_move(reply);
            session.apply_player_move(player, &fx.gateway).await.unwrap();
        }
        fx.backend.force_move(replies[3]);
        let snap = session.apply_player_move("e1h1", &fx.gateway).await.unwrap();

        let castle = MoveSpec::parse("e1g1").unwrap();
        assert_eq!(snap.moves[6], castle);
        assert!(!snap.moves.contains(&MoveSpec::parse("e1h1").unwrap()));
        assert!(snap.movetext.contains("4. O-O b6"));
        let replayed = MoveValidator::replay(session.history()).unwrap();
        assert_eq!(MoveValidator::fen(&replayed), snap.fen);
    }

    #[tokio::test]
    async fn test_analysis_lines() {
        let fx = Fixture::new();
        let mut session = fx.session(10, None, Side::White);
        session.apply_player_move("d2d4", &fx.gateway).await.unwrap();

        let analysis = session.request_analysis(5, &fx.gateway).await.unwrap();
        assert!(analysis.lines.len() <= 5);
        assert!(!analysis.lines.is_empty());
        for line in &analysis.lines {
            assert!(MoveValidator::is_legal(session.position(), line.mv));
        }

        // 候选数不会被放大，只会被截断
        let calls = fx.backend.calls();
        let analysis = session.request_analysis(0, &fx.gateway).await.unwrap();
        assert!(analysis.lines.is_empty());
        assert_eq!(analysis.evaluation, None);
        assert_eq!(fx.backend.calls(), calls);
        let analysis = session.request_analysis(99, &fx.gateway).await.unwrap();
        assert_eq!(analysis.lines.len(), MAX_ANALYSIS_LINES);
    }

    #[tokio::test]
    async fn test_checkmate_skips_engine() {
        let fx = Fixture::new();
        let mut session = fx.session(10, None, Side::Black);

        // 引擎执白走出愚人杀的前两步
        fx.backend.force_move("f2f3");
        session.request_engine_move(&fx.gateway).await.unwrap();
        fx.backend.force_move("g2g4");
        session.apply_player_move("e7e5", &fx.gateway).await.unwrap();

        let calls = fx.backend.calls();
        let snap = session.apply_player_move("Qh4", &fx.gateway).await.unwrap();
        assert_eq!(fx.backend.calls(), calls);
        assert_eq!(snap.status, GameStatus::Checkmate);
        assert_eq!(snap.winner, Some(Side::Black));
        assert!(snap.in_check);
        assert!(snap.legal_moves.is_empty());
        assert!(session.export_pgn().ends_with("1. f3 e5 2. g4 Qh4# 0-1\n"));
    }

    #[tokio::test]
    async fn test_terminal_rejects_everything() {
        let fx = Fixture::new();
        let mut session = fx.session(10, Some(3), Side::White);
        let snap = session.resign().unwrap();
        assert_eq!(snap.status, GameStatus::Resigned);
        assert_eq!(snap.winner, Some(Side::Black));
        assert_eq!(snap.reason, Some(EndReason::Resignation));

        // 时钟已冻结
        fx.clock.advance(Duration::from_secs(600));
        let frozen = session.snapshot();
        assert_eq!(frozen.white_time_ms, snap.white_time_ms);

        assert_eq!(
            session.apply_player_move("e2e4", &fx.gateway).await,
            Err(SessionError::GameAlreadyOver)
        );
        assert_eq!(
            session.request_hint(&fx.gateway).await,
            Err(SessionError::GameAlreadyOver)
        );
        assert_eq!(
            session.request_analysis(3, &fx.gateway).await,
            Err(SessionError::GameAlreadyOver)
        );
        assert_eq!(session.resign(), Err(SessionError::GameAlreadyOver));
        assert_eq!(session.snapshot(), frozen);
        assert!(session.export_pgn().contains("[Result \"0-1\"]"));
    }

    #[tokio::test]
    async fn test_fivefold_repetition() {
        let fx = Fixture::new();
        let mut session = fx.session(10, None, Side::White);

        // 双方马来回跳，第 5 次回到初始局面时判和
        let mut snap = session.snapshot();
        for round in 0..4 {
            fx.backend.force_move("g8f6");
            snap = session.apply_player_move("g1f3", &fx.gateway).await.unwrap();
            assert_eq!(snap.status, GameStatus::InProgress, "round {}", round);
            fx.backend.force_move("f6g8");
            snap = session.apply_player_move("f3g1", &fx.gateway).await.unwrap();
        }
        assert_eq!(snap.status, GameStatus::Draw);
        assert_eq!(snap.reason, Some(EndReason::FivefoldRepetition));
        assert_eq!(snap.winner, None);
    }
}
