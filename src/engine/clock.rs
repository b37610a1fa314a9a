// ==========================================
// 工厂管理系统 - 时钟抽象
// ==========================================
// 状态扫描依赖“当前时间”，通过注入时钟实现可测试
// ==========================================

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

/// 当前时间来源
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 共享时钟句柄
pub type SharedClock = Arc<dyn Clock>;

// ==========================================
// SystemClock - 系统墙钟
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// ==========================================
// ManualClock - 手动推进的时钟
// ==========================================
// 测试与演示场景使用，不会自行走时
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// 设置为指定时间
    pub fn set(&self, at: DateTime<Utc>) {
        let mut guard = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *guard = at;
    }

    /// 向前推进
    pub fn advance(&self, by: Duration) {
        let mut guard = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}
