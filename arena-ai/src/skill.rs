//! 强度映射
//!
//! 对外统一使用 0-20 的强度刻度，这里把它翻译为具体引擎的搜索限制。

use std::time::Duration;

use protocol::MAX_DIFFICULTY;
use serde::{Deserialize, Serialize};

/// 引擎搜索限制
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineLimits {
    /// UCI `Skill Level`（0-20）
    pub skill_level: u8,
    /// 搜索深度上限，`None` 表示只受时间限制
    pub depth: Option<u8>,
    /// 思考时间
    pub move_time: Duration,
}

impl EngineLimits {
    /// 满强度限制
    pub fn full_strength(move_time: Duration) -> Self {
        Self {
            skill_level: MAX_DIFFICULTY,
            depth: None,
            move_time,
        }
    }
}

/// 单档强度配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillLevel {
    /// 对外强度（从该值起生效）
    pub strength: u8,
    /// 传给引擎的 Skill Level
    pub skill_level: u8,
    /// 深度上限
    #[serde(default)]
    pub depth: Option<u8>,
}

/// 强度映射表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillTable {
    levels: Vec<SkillLevel>,
}

impl SkillTable {
    /// 从配置项创建，按强度排序
    pub fn new(mut levels: Vec<SkillLevel>) -> Self {
        levels.sort_by_key(|l| l.strength);
        Self { levels }
    }

    /// 查询强度对应的搜索限制
    pub fn limits(&self, strength: u8, move_time: Duration) -> EngineLimits {
        let strength = strength.min(MAX_DIFFICULTY);
        let level = self
            .levels
            .iter()
            .filter(|l| l.strength <= strength)
            .max_by_key(|l| l.strength);
        match level {
            Some(level) => EngineLimits {
                skill_level: level.skill_level.min(MAX_DIFFICULTY),
                depth: level.depth,
                move_time,
            },
            // 表为空或缺少低档位时直接透传
            None => EngineLimits {
                skill_level: strength,
                depth: None,
                move_time,
            },
        }
    }

    pub fn levels(&self) -> &[SkillLevel] {
        &self.levels
    }
}

impl Default for SkillTable {
    /// Skill Level 与强度一一对应，最低几档额外限制深度
    fn default() -> Self {
        let levels = (0..=MAX_DIFFICULTY)
            .map(|strength| SkillLevel {
                strength,
                skill_level: strength,
                depth: match strength {
                    0..=4 => Some(strength + 1),
                    5..=9 => Some(strength + 3),
                    _ => None,
                },
            })
            .collect();
        Self { levels }
    }
}
