//! UCI 引擎进程
//!
//! 通过 stdin/stdout 驱动外部 UCI 引擎（如 Stockfish）。进程在首次使用时启动，
//! 退出或超时后丢弃，下次调用时重新启动。

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use shakmaty::Chess;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;

use protocol::{MoveSpec, MoveValidator, MAX_DIFFICULTY};

use crate::backend::{Candidate, SearchBackend};
use crate::error::EngineError;
use crate::skill::EngineLimits;
use crate::uci::{self, InfoLine, UciResponse};

/// UCI 引擎启动配置
#[derive(Debug, Clone)]
pub struct UciConfig {
    /// 可执行文件路径
    pub path: PathBuf,
    /// 启动参数
    pub args: Vec<String>,
    pub threads: u32,
    pub hash_mb: u32,
    /// 握手超时
    pub handshake_timeout: Duration,
    /// 思考时间之外额外等待的时间，超过即认为进程失去响应
    pub grace: Duration,
}

impl UciConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            args: Vec::new(),
            threads: 1,
            hash_mb: 16,
            handshake_timeout: Duration::from_secs(5),
            grace: Duration::from_secs(2),
        }
    }
}

/// 一次搜索的原始结果
struct SearchOutput {
    best: Option<String>,
    lines: Vec<InfoLine>,
}

/// 运行中的引擎进程
struct UciProcess {
    _child: Child,
    stdin: ChildStdin,
    lines: Lines<BufReader<ChildStdout>>,
    name: String,
    skill_level: Option<u8>,
    multipv: Option<usize>,
}

impl UciProcess {
    /// 启动进程并完成握手
    async fn spawn(config: &UciConfig) -> Result<Self, EngineError> {
        let mut child = Command::new(&config.path)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                EngineError::Unavailable(format!(
                    "failed to spawn {}: {e}",
                    config.path.display()
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::Unavailable("engine stdin not captured".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::Unavailable("engine stdout not captured".into()))?;

        let mut process = Self {
            _child: child,
            stdin,
            lines: BufReader::new(stdout).lines(),
            name: config.path.display().to_string(),
            skill_level: None,
            multipv: None,
        };

        timeout(config.handshake_timeout, process.handshake(config))
            .await
            .map_err(|_| EngineError::Unavailable("engine handshake timed out".into()))??;

        tracing::info!(engine = %process.name, "UCI 引擎已启动");
        Ok(process)
    }

    async fn handshake(&mut self, config: &UciConfig) -> Result<(), EngineError> {
        self.send("uci").await?;
        loop {
            match uci::parse_line(&self.next_line().await?) {
                UciResponse::IdName(name) => self.name = name,
                UciResponse::UciOk => break,
                _ => {}
            }
        }

        self.send(&uci::set_option("Threads", config.threads)).await?;
        self.send(&uci::set_option("Hash", config.hash_mb)).await?;
        self.sync().await
    }

    async fn send(&mut self, command: &str) -> Result<(), EngineError> {
        tracing::debug!(engine = %self.name, "引擎 << {}", command);
        self.stdin.write_all(command.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;
        Ok(())
    }

    async fn next_line(&mut self) -> Result<String, EngineError> {
        match self.lines.next_line().await? {
            Some(line) => Ok(line),
            None => Err(EngineError::Unavailable("engine closed its output".into())),
        }
    }

    /// isready / readyok
    async fn sync(&mut self) -> Result<(), EngineError> {
        self.send("isready").await?;
        while uci::parse_line(&self.next_line().await?) != UciResponse::ReadyOk {}
        Ok(())
    }

    /// 仅在设置变化时下发选项
    async fn configure(&mut self, skill_level: u8, multipv: usize) -> Result<(), EngineError> {
        let mut changed = false;
        if self.skill_level != Some(skill_level) {
            self.send(&uci::set_option("Skill Level", skill_level)).await?;
            self.skill_level = Some(skill_level);
            changed = true;
        }
        if self.multipv != Some(multipv) {
            self.send(&uci::set_option("MultiPV", multipv)).await?;
            self.multipv = Some(multipv);
            changed = true;
        }
        if changed {
            self.sync().await?;
        }
        Ok(())
    }

    async fn search(
        &mut self,
        fen: &str,
        limits: &EngineLimits,
        multipv: usize,
    ) -> Result<SearchOutput, EngineError> {
        self.configure(limits.skill_level.min(MAX_DIFFICULTY), multipv)
            .await?;
        self.send(&uci::position(fen)).await?;
        self.send(&uci::go(limits)).await?;

        // 每个 multipv 序号只保留最新的完整结果
        let mut lines: Vec<InfoLine> = Vec::new();
        loop {
            let line = self.next_line().await?;
            match uci::parse_line(&line) {
                UciResponse::Info(info) if info.is_exact() => {
                    match lines.iter_mut().find(|l| l.multipv == info.multipv) {
                        Some(slot) => *slot = info,
                        None => lines.push(info),
                    }
                }
                UciResponse::BestMove(best) => {
                    tracing::debug!(engine = %self.name, "引擎 >> {}", line);
                    lines.sort_by_key(|l| l.multipv);
                    return Ok(SearchOutput { best, lines });
                }
                _ => {}
            }
        }
    }
}

/// UCI 引擎后端
pub struct UciEngine {
    config: UciConfig,
    process: Option<UciProcess>,
}

impl UciEngine {
    pub fn new(config: UciConfig) -> Self {
        Self {
            config,
            process: None,
        }
    }

    /// 进程是否在运行
    pub fn is_running(&self) -> bool {
        self.process.is_some()
    }

    async fn run(
        &mut self,
        pos: &Chess,
        limits: &EngineLimits,
        multipv: usize,
    ) -> Result<SearchOutput, EngineError> {
        if self.process.is_none() {
            self.process = Some(UciProcess::spawn(&self.config).await?);
        }
        let process = self
            .process
            .as_mut()
            .ok_or_else(|| EngineError::Unavailable("engine process missing".into()))?;

        let fen = MoveValidator::fen(pos);
        let budget = limits.move_time + self.config.grace;
        let result = match timeout(budget, process.search(&fen, limits, multipv)).await {
            Ok(result) => result,
            Err(_) => Err(EngineError::Unavailable(format!(
                "engine did not answer within {} ms",
                budget.as_millis()
            ))),
        };

        if let Err(EngineError::Unavailable(reason)) = &result {
            // 丢弃进程（kill_on_drop），下次调用重新启动
            tracing::warn!(engine = %self.config.path.display(), %reason, "UCI 引擎失去响应");
            self.process = None;
        }
        result
    }
}

fn parse_engine_move(text: &str) -> Result<MoveSpec, EngineError> {
    MoveSpec::parse(text).map_err(|_| EngineError::Protocol(format!("unparsable move '{text}'")))
}

#[async_trait]
impl SearchBackend for UciEngine {
    fn name(&self) -> &str {
        match &self.process {
            Some(process) => &process.name,
            None => "uci",
        }
    }

    async fn best_move(
        &mut self,
        pos: &Chess,
        limits: &EngineLimits,
    ) -> Result<MoveSpec, EngineError> {
        let output = self.run(pos, limits, 1).await?;
        match output.best {
            Some(text) => parse_engine_move(&text),
            None => Err(EngineError::Protocol("engine returned no move".into())),
        }
    }

    async fn top_moves(
        &mut self,
        pos: &Chess,
        count: usize,
        limits: &EngineLimits,
    ) -> Result<Vec<Candidate>, EngineError> {
        let output = self.run(pos, limits, count.max(1)).await?;

        let mut candidates = Vec::with_capacity(output.lines.len());
        for info in output.lines.iter().take(count) {
            let (Some(first), Some(score)) = (info.pv.first(), info.score) else {
                continue;
            };
            candidates.push(Candidate {
                mv: parse_engine_move(first)?,
                score,
            });
        }

        // 没有 info 输出时退回 bestmove
        if candidates.is_empty() {
            if let Some(text) = output.best {
                tracing::warn!("引擎未输出评估，仅返回 bestmove");
                candidates.push(Candidate {
                    mv: parse_engine_move(&text)?,
                    score: protocol::Evaluation::Centipawns(0),
                });
            }
        }
        Ok(candidates)
    }
}
