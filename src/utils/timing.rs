// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// 随机等待区间（闭区间）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    min: Duration,
    max: Duration,
}

impl DelayRange {
    /// 创建新的等待区间
    ///
    /// # 返回值
    ///
    /// * `Ok(DelayRange)` - 合法区间
    /// * `Err(String)` - 下限大于上限
    pub fn new(min: Duration, max: Duration) -> Result<Self, String> {
        if min > max {
            return Err(format!(
                "minimum {}ms is greater than maximum {}ms",
                min.as_millis(),
                max.as_millis()
            ));
        }
        Ok(Self { min, max })
    }

    pub fn from_millis(min_ms: u64, max_ms: u64) -> Result<Self, String> {
        Self::new(Duration::from_millis(min_ms), Duration::from_millis(max_ms))
    }

    /// 固定时长区间
    pub fn fixed(duration: Duration) -> Self {
        Self {
            min: duration,
            max: duration,
        }
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn contains(&self, duration: Duration) -> bool {
        duration >= self.min && duration <= self.max
    }
}

/// 等待时长采样器
///
/// 抽象随机数来源，测试中可替换为确定性实现
pub trait DelaySampler: Send + Sync {
    /// 在区间内采样一个时长
    fn sample(&self, range: DelayRange) -> Duration;
}

/// 均匀分布采样器
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformDelay;

impl DelaySampler for UniformDelay {
    fn sample(&self, range: DelayRange) -> Duration {
        let min = range.min().as_millis() as u64;
        let max = range.max().as_millis() as u64;
        if min == max {
            return range.min();
        }
        Duration::from_millis(rand::random_range(min..=max))
    }
}

/// 总是取区间某一端的采样器
#[derive(Debug, Clone, Copy)]
pub enum EdgeDelay {
    /// 取下限
    Min,
    /// 取上限
    Max,
}

impl DelaySampler for EdgeDelay {
    fn sample(&self, range: DelayRange) -> Duration {
        match self {
            EdgeDelay::Min => range.min(),
            EdgeDelay::Max => range.max(),
        }
    }
}

/// 时钟抽象
///
/// 所有定时器（注入前抖动、冷却、抓取超时）都经由此接口，而不是直接调用全局定时器
#[async_trait]
pub trait Clock: Send + Sync {
    /// 挂起指定时长
    async fn sleep(&self, duration: Duration);

    /// 当前时间
    fn now(&self) -> DateTime<Utc>;
}

/// 基于 tokio 定时器的时钟
///
/// 在 `#[tokio::test(start_paused = true)]` 下时间由测试驱动
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
