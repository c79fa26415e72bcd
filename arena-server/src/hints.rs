//! 提示次数

use protocol::MAX_HINTS;

use crate::error::SessionError;

/// 每局提示额度，只增不减
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HintLedger {
    used: u8,
    max: u8,
}

impl HintLedger {
    pub fn new(max: u8) -> Self {
        Self { used: 0, max }
    }

    pub fn used(&self) -> u8 {
        self.used
    }

    pub fn max(&self) -> u8 {
        self.max
    }

    pub fn can_use(&self) -> bool {
        self.used < self.max
    }

    /// 消耗一次提示，返回已用次数
    pub fn consume(&mut self) -> Result<u8, SessionError> {
        if !self.can_use() {
            return Err(SessionError::HintBudgetExhausted { max: self.max });
        }
        self.used += 1;
        Ok(self.used)
    }
}

impl Default for HintLedger {
    fn default() -> Self {
        Self::new(MAX_HINTS)
    }
}
