// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::badge::Badge;
use crate::domain::services::status_indicator::StatusIndicator;
use parking_lot::RwLock;
use tracing::info;

/// 内存中的状态徽标
///
/// 通过 `GET /v1/status` 对外展示
#[derive(Debug, Default)]
pub struct BadgeStore {
    badge: RwLock<Badge>,
}

impl BadgeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusIndicator for BadgeStore {
    fn set(&self, badge: Badge) {
        let previous = std::mem::replace(&mut *self.badge.write(), badge);
        if previous != badge {
            info!(badge = badge.text(), "Badge changed");
        }
    }

    fn current(&self) -> Badge {
        *self.badge.read()
    }
}
