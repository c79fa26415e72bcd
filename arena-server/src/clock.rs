//! 对局计时
//!
//! 剩余时间不靠定时器递减，而是在查询时根据回合开始时间现算。

use std::time::Instant;

use protocol::{Side, TimeLimit};

/// 时间源
pub trait ClockSource: Send + Sync {
    fn now(&self) -> Instant;
}

/// 系统单调时钟
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}


#[cfg(test)]
pub use manual::ManualClock;

/// 对局计时器
#[derive(Debug, Clone)]
pub struct GameClock {
    /// 白方、黑方剩余时间（毫秒），`None` 表示不限时
    banked_ms: Option<[u64; 2]>,
    /// 当前计时方
    active: Side,
    /// 当前回合开始时间，停止后为 `None`
    turn_start: Option<Instant>,
}

fn index(side: Side) -> usize {
    match side {
        Side::White => 0,
        Side::Black => 1,
    }
}

impl GameClock {
    /// 创建计时器，白方立即开始计时
    pub fn new(limit: TimeLimit, now: Instant) -> Self {
        let banked_ms = limit.allotment().map(|d| {
            let ms = d.as_millis() as u64;
            [ms, ms]
        });
        Self {
            banked_ms,
            active: Side::White,
            turn_start: Some(now),
        }
    }

    /// 是否在计时
    pub fn is_running(&self) -> bool {
        self.turn_start.is_some()
    }

    /// 指定方剩余时间（毫秒），不限时返回 `None`
    pub fn remaining(&self, side: Side, now: Instant) -> Option<u64> {
        let banked = self.banked_ms?[index(side)];
        match self.turn_start {
            Some(start) if side == self.active => {
                let elapsed = now.saturating_duration_since(start).as_millis() as u64;
                Some(banked.saturating_sub(elapsed))
            }
            _ => Some(banked),
        }
    }

    /// 检查是否超时
    pub fn is_expired(&self, side: Side, now: Instant) -> bool {
        self.remaining(side, now) == Some(0)
    }

    /// 走子方完成一步，切换到对方计时
    pub fn switch(&mut self, now: Instant) {
        self.bank(now);
        self.active = self.active.opponent();
        if self.turn_start.is_some() {
            self.turn_start = Some(now);
        }
    }

    /// 停止计时，冻结双方剩余时间
    pub fn stop(&mut self, now: Instant) {
        self.bank(now);
        self.turn_start = None;
    }

    /// 把当前方已用时间记入余额
    fn bank(&mut self, now: Instant) {
        let active = self.active;
        if let Some(remaining) = self.remaining(active, now) {
            if let Some(banked) = self.banked_ms.as_mut() {
                banked[index(active)] = remaining;
            }
        }
    }
}
