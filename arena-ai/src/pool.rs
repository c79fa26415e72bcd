//! 引擎池
//!
//! 固定数量的后端实例，每个实例同时只处理一个请求。超出实例数的请求进入
//! 先进先出的等待队列，队列满时立即返回 `Busy`。

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Mutex, MutexGuard, Semaphore, SemaphorePermit, TryAcquireError};

use crate::backend::SearchBackend;
use crate::error::EngineError;

/// 引擎池
pub struct EnginePool {
    slots: Vec<Mutex<Box<dyn SearchBackend>>>,
    permits: Semaphore,
    waiting: AtomicUsize,
    max_queue: usize,
}

/// 借出的引擎，释放时归还
pub struct PooledEngine<'a> {
    backend: MutexGuard<'a, Box<dyn SearchBackend>>,
    _permit: SemaphorePermit<'a>,
}

impl Deref for PooledEngine<'_> {
    type Target = dyn SearchBackend;

    fn deref(&self) -> &Self::Target {
        &**self.backend
    }
}

impl DerefMut for PooledEngine<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut **self.backend
    }
}

/// 等待队列占位，离开作用域时释放
struct QueueTicket<'a> {
    waiting: &'a AtomicUsize,
}

impl<'a> QueueTicket<'a> {
    fn take(waiting: &'a AtomicUsize, max_queue: usize) -> Option<Self> {
        waiting
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < max_queue).then_some(n + 1)
            })
            .ok()
            .map(|_| Self { waiting })
    }
}

impl Drop for QueueTicket<'_> {
    fn drop(&mut self) {
        self.waiting.fetch_sub(1, Ordering::AcqRel);
    }
}

impl EnginePool {
    /// 创建引擎池
    pub fn new(backends: Vec<Box<dyn SearchBackend>>, max_queue: usize) -> Self {
        let size = backends.len();
        Self {
            slots: backends.into_iter().map(Mutex::new).collect(),
            permits: Semaphore::new(size),
            waiting: AtomicUsize::new(0),
            max_queue,
        }
    }

    /// 实例数
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// 空闲实例数
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// 排队中的请求数
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::Acquire)
    }

    /// 借出一个引擎实例
    pub async fn acquire(&self) -> Result<PooledEngine<'_>, EngineError> {
        if self.slots.is_empty() {
            return Err(EngineError::Unavailable("no engines configured".into()));
        }

        let permit = match self.permits.try_acquire() {
            Ok(permit) => permit,
            Err(TryAcquireError::Closed) => {
                return Err(EngineError::Unavailable("engine pool closed".into()))
            }
            Err(TryAcquireError::NoPermits) => {
                let _ticket = QueueTicket::take(&self.waiting, self.max_queue).ok_or_else(|| {
                    tracing::warn!(waiting = self.max_queue, "引擎等待队列已满");
                    EngineError::Busy {
                        waiting: self.max_queue,
                    }
                })?;
                self.permits
                    .acquire()
                    .await
                    .map_err(|_| EngineError::Unavailable("engine pool closed".into()))?
            }
        };

        // 持有许可时至少有一个实例空闲
        for slot in &self.slots {
            if let Ok(backend) = slot.try_lock() {
                return Ok(PooledEngine {
                    backend,
                    _permit: permit,
                });
            }
        }
        Err(EngineError::Unavailable("no idle engine".into()))
    }
}
