//! 服务器主逻辑

use std::sync::Arc;

use protocol::{
    ClientMessage, Connection, Difficulty, Listener, ProtocolError, ServerMessage,
    SessionConfig, TimeLimit,
};

use crate::error::SessionError;
use crate::store::SessionStore;

/// 消息处理器
pub struct MessageHandler;

impl MessageHandler {
    /// 处理客户端消息
    pub async fn handle(store: &SessionStore, msg: ClientMessage) -> ServerMessage {
        let result = match msg {
            ClientMessage::CreateSession {
                difficulty,
                time_limit_minutes,
                player_side,
            } => Self::handle_create_session(store, difficulty, time_limit_minutes, player_side)
                .await,
            ClientMessage::GetSnapshot { session_id } => store
                .snapshot(session_id)
                .await
                .map(|snapshot| ServerMessage::Snapshot { snapshot }),
            ClientMessage::CloseSession { session_id } => store
                .remove(session_id)
                .await
                .map(|_| ServerMessage::SessionClosed { session_id }),
            ClientMessage::MakeMove {
                session_id,
                notation,
            } => store
                .apply_move(session_id, &notation)
                .await
                .map(|snapshot| ServerMessage::Snapshot { snapshot }),
            ClientMessage::EngineMove { session_id } => store
                .engine_move(session_id)
                .await
                .map(|snapshot| ServerMessage::Snapshot { snapshot }),
            ClientMessage::Resign { session_id } => store
                .resign(session_id)
                .await
                .map(|snapshot| ServerMessage::Snapshot { snapshot }),
            ClientMessage::RequestHint { session_id } => {
                store.hint(session_id).await.map(|hint| ServerMessage::Hint {
                    mv: hint.mv,
                    hints_used: hint.hints_used,
                    max_hints: hint.max_hints,
                })
            }
            ClientMessage::RequestAnalysis { session_id, lines } => store
                .analysis(session_id, lines)
                .await
                .map(|analysis| ServerMessage::Analysis { analysis }),
            ClientMessage::ExportPgn { session_id } => store
                .export_pgn(session_id)
                .await
                .map(|pgn| ServerMessage::Pgn { pgn }),
            ClientMessage::Ping => Ok(ServerMessage::Pong),
        };

        result.unwrap_or_else(Self::error_message)
    }

    /// 创建对局，参数越界在这里拒绝
    async fn handle_create_session(
        store: &SessionStore,
        difficulty: u8,
        time_limit_minutes: Option<u8>,
        player_side: protocol::Side,
    ) -> Result<ServerMessage, SessionError> {
        let difficulty = Difficulty::new(difficulty)
            .map_err(|e| SessionError::InvalidRequest(e.to_string()))?;
        let time_limit = TimeLimit::from_minutes(time_limit_minutes)
            .map_err(|e| SessionError::InvalidRequest(e.to_string()))?;

        let config = SessionConfig {
            difficulty,
            time_limit,
            player_side,
        };
        let (session_id, snapshot) = store.create(config).await;
        Ok(ServerMessage::SessionCreated {
            session_id,
            snapshot,
        })
    }

    fn error_message(e: SessionError) -> ServerMessage {
        if e.is_recoverable() {
            tracing::warn!(error = %e, "引擎暂不可用");
        } else {
            tracing::debug!(error = %e, "请求被拒绝");
        }
        ServerMessage::Error {
            code: e.code(),
            message: e.to_string(),
        }
    }
}

/// 处理单个连接，直到对端断开
pub async fn handle_connection<C: Connection>(
    mut conn: C,
    store: Arc<SessionStore>,
) -> protocol::Result<()> {
    loop {
        let msg: ClientMessage = match conn.recv().await {
            Ok(msg) => msg,
            Err(ProtocolError::ConnectionClosed) => return Ok(()),
            Err(e) => return Err(e),
        };
        tracing::debug!(?msg, "收到消息");

        let reply = MessageHandler::handle(&store, msg).await;
        conn.send(&reply).await?;
    }
}

/// 接受连接并为每个连接启动一个任务
pub async fn serve<L>(mut listener: L, store: Arc<SessionStore>) -> protocol::Result<()>
where
    L: Listener,
    L::Conn: 'static,
{
    tracing::info!(addr = ?listener.local_addr(), "服务器开始监听");

    loop {
        let conn = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(error = %e, "接受连接失败");
                continue;
            }
        };
        let peer = conn.peer_addr();
        tracing::info!(peer = ?peer, "新连接");

        let store = store.clone();
        tokio::spawn(async move {
            match handle_connection(conn, store).await {
                Ok(()) => tracing::info!(peer = ?peer, "连接断开"),
                Err(e) => tracing::warn!(peer = ?peer, error = %e, "连接异常断开"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::testing::{gateway_with, ScriptedBackend};
    use protocol::{Connector, ErrorCode, GameStatus, Side, TcpConnector, TcpListener};

    fn store() -> SessionStore {
        SessionStore::new(
            gateway_with(ScriptedBackend::new()),
            Arc::new(ManualClock::new()),
        )
    }

    async fn create(store: &SessionStore) -> u64 {
        let reply = MessageHandler::handle(
            store,
            ClientMessage::CreateSession {
                difficulty: 20,
                time_limit_minutes: None,
                player_side: Side::White,
            },
        )
        .await;
        match reply {
            ServerMessage::SessionCreated {
                session_id,
                snapshot,
            } => {
                assert_eq!(snapshot.half_move_count, 0);
                session_id
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    fn error_code(reply: ServerMessage) -> ErrorCode {
        match reply {
            ServerMessage::Error { code, .. } => code,
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_out_of_range() {
        let store = store();

        let reply = MessageHandler::handle(
            &store,
            ClientMessage::CreateSession {
                difficulty: 21,
                time_limit_minutes: None,
                player_side: Side::White,
            },
        )
        .await;
        assert_eq!(error_code(reply), ErrorCode::InvalidRequest);

        let reply = MessageHandler::handle(
            &store,
            ClientMessage::CreateSession {
                difficulty: 10,
                time_limit_minutes: Some(7),
                player_side: Side::White,
            },
        )
        .await;
        assert_eq!(error_code(reply), ErrorCode::InvalidRequest);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_move_and_errors() {
        let store = store();
        let session_id = create(&store).await;

        let reply = MessageHandler::handle(
            &store,
            ClientMessage::MakeMove {
                session_id,
                notation: "e2e4".into(),
            },
        )
        .await;
        match reply {
            ServerMessage::Snapshot { snapshot } => assert_eq!(snapshot.half_move_count, 2),
            other => panic!("unexpected reply: {:?}", other),
        }

        let reply = MessageHandler::handle(
            &store,
            ClientMessage::MakeMove {
                session_id,
                notation: "Ke3".into(),
            },
        )
        .await;
        assert_eq!(error_code(reply), ErrorCode::IllegalMove);

        let reply = MessageHandler::handle(
            &store,
            ClientMessage::GetSnapshot {
                session_id: session_id + 100,
            },
        )
        .await;
        assert_eq!(error_code(reply), ErrorCode::SessionNotFound);
    }

    #[tokio::test]
    async fn test_hint_and_analysis() {
        let store = store();
        let session_id = create(&store).await;

        let reply = MessageHandler::handle(&store, ClientMessage::RequestHint { session_id }).await;
        assert!(matches!(
            reply,
            ServerMessage::Hint {
                hints_used: 1,
                max_hints: 5,
                ..
            }
        ));

        let reply = MessageHandler::handle(
            &store,
            ClientMessage::RequestAnalysis {
                session_id,
                lines: 3,
            },
        )
        .await;
        match reply {
            ServerMessage::Analysis { analysis } => assert_eq!(analysis.lines.len(), 3),
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resign_export_close() {
        let store = store();
        let session_id = create(&store).await;

        let reply = MessageHandler::handle(&store, ClientMessage::Resign { session_id }).await;
        match reply {
            ServerMessage::Snapshot { snapshot } => {
                assert_eq!(snapshot.status, GameStatus::Resigned);
                assert!(snapshot.game_over);
            }
            other => panic!("unexpected reply: {:?}", other),
        }

        let reply = MessageHandler::handle(&store, ClientMessage::RequestHint { session_id }).await;
        assert_eq!(error_code(reply), ErrorCode::GameAlreadyOver);

        let reply = MessageHandler::handle(&store, ClientMessage::ExportPgn { session_id }).await;
        match reply {
            ServerMessage::Pgn { pgn } => assert!(pgn.contains("[Result \"0-1\"]")),
            other => panic!("unexpected reply: {:?}", other),
        }

        let reply =
            MessageHandler::handle(&store, ClientMessage::CloseSession { session_id }).await;
        assert!(matches!(reply, ServerMessage::SessionClosed { .. }));
        let reply =
            MessageHandler::handle(&store, ClientMessage::CloseSession { session_id }).await;
        assert_eq!(error_code(reply), ErrorCode::SessionNotFound);
    }

    #[tokio::test]
    async fn test_serve_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(serve(listener, Arc::new(store())));

        let mut conn = TcpConnector.connect(&addr).await.unwrap();
        conn.send(&ClientMessage::Ping).await.unwrap();
        let reply: ServerMessage = conn.recv().await.unwrap();
        assert!(matches!(reply, ServerMessage::Pong));

        conn.send(&ClientMessage::CreateSession {
            difficulty: 5,
            time_limit_minutes: Some(3),
            player_side: Side::Black,
        })
        .await
        .unwrap();
        let reply: ServerMessage = conn.recv().await.unwrap();
        let session_id = match reply {
            ServerMessage::SessionCreated { session_id, .. } => session_id,
            other => panic!("unexpected reply: {:?}", other),
        };

        conn.send(&ClientMessage::EngineMove { session_id })
            .await
            .unwrap();
        let reply: ServerMessage = conn.recv().await.unwrap();
        match reply {
            ServerMessage::Snapshot { snapshot } => {
                assert_eq!(snapshot.turn, Side::Black);
                assert_eq!(snapshot.half_move_count, 1);
            }
            other => panic!("unexpected reply: {:?}", other),
        }

        server.abort();
    }
}
