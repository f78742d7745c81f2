// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::badge::Badge;

/// 状态指示器特质
///
/// 对外展示当前运行状态（RUN / ERR / 空）
pub trait StatusIndicator: Send + Sync {
    /// 设置徽标
    fn set(&self, badge: Badge);

    /// 当前徽标
    fn current(&self) -> Badge;
}
