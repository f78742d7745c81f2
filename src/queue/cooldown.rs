// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::queue::queue_manager::QueueManager;
use crate::utils::timing::{Clock, DelayRange, DelaySampler};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

/// 冷却控制器
///
/// 每个任务结束后（无论成功、失败还是超时）在随机时长内阻止出队
pub struct CooldownController {
    range: DelayRange,
    clock: Arc<dyn Clock>,
    sampler: Arc<dyn DelaySampler>,
}

impl CooldownController {
    pub fn new(range: DelayRange, clock: Arc<dyn Clock>, sampler: Arc<dyn DelaySampler>) -> Self {
        Self {
            range,
            clock,
            sampler,
        }
    }

    /// 开始冷却
    ///
    /// 立即设置队列的冷却标志，并启动单次定时器；到期后调用 `on_elapsed`，
    /// 由调用方清除标志并继续出队。
    ///
    /// # 参数
    ///
    /// * `queue` - 任务队列
    /// * `on_elapsed` - 冷却结束回调
    ///
    /// # 返回值
    ///
    /// 本次冷却时长和定时器句柄
    pub fn start<F>(&self, queue: &mut QueueManager, on_elapsed: F) -> (Duration, JoinHandle<()>)
    where
        F: FnOnce() + Send + 'static,
    {
        queue.begin_cooldown();
        let duration = self.sampler.sample(self.range);
        info!(cooldown_ms = duration.as_millis() as u64, "Cooldown started");

        let clock = self.clock.clone();
        let handle = tokio::spawn(async move {
            clock.sleep(duration).await;
            on_elapsed();
        });

        (duration, handle)
    }
}
