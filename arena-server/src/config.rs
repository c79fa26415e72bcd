//! 服务端配置
//!
//! 配置文件为 JSON，查找顺序：命令行参数、`ARENA_CONFIG` 环境变量、
//! 系统配置目录下的 `chess-arena/server.json`。缺失的字段取默认值。

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use arena_ai::{BuiltinBackend, EnginePool, SearchBackend, SkillTable, UciConfig, UciEngine};
use protocol::{ANALYSIS_TIME_MS, DEFAULT_LISTEN_ADDR, ENGINE_MOVE_TIME_MS, HINT_TIME_MS};
use serde::{Deserialize, Serialize};

use crate::gateway::ThinkTimes;

/// 引擎类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// 外部 UCI 引擎进程
    Uci,
    /// 内置搜索
    Builtin,
}

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub backend: BackendKind,
    /// UCI 引擎可执行文件
    pub path: Option<PathBuf>,
    pub threads: u32,
    pub hash_mb: u32,
    /// 引擎实例数
    pub pool_size: usize,
    /// 等待队列上限，超过即返回繁忙
    pub max_queue: usize,
    pub move_time_ms: u64,
    pub hint_time_ms: u64,
    pub analysis_time_ms: u64,
    pub handshake_timeout_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::Builtin,
            path: None,
            threads: 1,
            hash_mb: 16,
            pool_size: 2,
            max_queue: 16,
            move_time_ms: ENGINE_MOVE_TIME_MS,
            hint_time_ms: HINT_TIME_MS,
            analysis_time_ms: ANALYSIS_TIME_MS,
            handshake_timeout_ms: 5000,
        }
    }
}

/// 服务端配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub engine: EngineSettings,
    /// 0-20 强度到引擎参数的映射
    pub skills: SkillTable,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            engine: EngineSettings::default(),
            skills: SkillTable::default(),
        }
    }
}

/// 默认配置文件路径
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("chess-arena").join("server.json"))
}

impl ServerConfig {
    /// 按查找顺序加载配置并应用环境变量覆盖
    pub fn load(cli_path: Option<PathBuf>) -> Result<Self> {
        let path = cli_path
            .or_else(|| std::env::var_os("ARENA_CONFIG").map(PathBuf::from))
            .or_else(default_path);

        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                tracing::warn!(path = %path.display(), "配置文件不存在，使用默认配置");
                Self::default()
            }
            None => {
                tracing::warn!("无法确定配置目录，使用默认配置");
                Self::default()
            }
        };

        config.apply_env(
            std::env::var("ARENA_LISTEN").ok(),
            std::env::var_os("ARENA_ENGINE_PATH").map(PathBuf::from),
        );
        Ok(config)
    }

    /// 从 JSON 文件读取
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {:?}", path))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("解析配置文件失败: {:?}", path))?;
        tracing::info!(path = %path.display(), "已加载配置");
        Ok(config)
    }

    /// 环境变量覆盖，指定引擎路径时切换为 UCI 引擎
    pub fn apply_env(&mut self, listen_addr: Option<String>, engine_path: Option<PathBuf>) {
        if let Some(addr) = listen_addr {
            self.listen_addr = addr;
        }
        if let Some(path) = engine_path {
            self.engine.path = Some(path);
            self.engine.backend = BackendKind::Uci;
        }
    }

    pub fn think_times(&self) -> ThinkTimes {
        ThinkTimes {
            engine_move: Duration::from_millis(self.engine.move_time_ms),
            hint: Duration::from_millis(self.engine.hint_time_ms),
            analysis: Duration::from_millis(self.engine.analysis_time_ms),
        }
    }

    /// 实际使用的引擎类型
    pub fn effective_backend(&self) -> BackendKind {
        match (&self.engine.backend, &self.engine.path) {
            (BackendKind::Uci, Some(path)) if !path.as_os_str().is_empty() => BackendKind::Uci,
            (BackendKind::Uci, _) => {
                tracing::warn!("未配置 UCI 引擎路径，改用内置引擎");
                BackendKind::Builtin
            }
            (BackendKind::Builtin, _) => BackendKind::Builtin,
        }
    }

    /// 构建引擎池，UCI 进程在首次使用时才启动
    pub fn build_pool(&self) -> EnginePool {
        let settings = &self.engine;
        let size = settings.pool_size.max(1);
        let backend = self.effective_backend();

        let backends: Vec<Box<dyn SearchBackend>> = (0..size)
            .map(|_| match (backend, &settings.path) {
                (BackendKind::Uci, Some(path)) => {
                    let mut uci = UciConfig::new(path.clone());
                    uci.threads = settings.threads;
                    uci.hash_mb = settings.hash_mb;
                    uci.handshake_timeout = Duration::from_millis(settings.handshake_timeout_ms);
                    Box::new(UciEngine::new(uci)) as Box<dyn SearchBackend>
                }
                _ => Box::new(BuiltinBackend::new()) as Box<dyn SearchBackend>,
            })
            .collect();

        tracing::info!(?backend, size, max_queue = settings.max_queue, "引擎池就绪");
        EnginePool::new(backends, settings.max_queue)
    }
}
