// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Serialize;
use std::fmt;

/// 状态徽标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Badge {
    /// 空闲
    #[default]
    Clear,
    /// 正在抓取
    Running,
    /// 上一个任务失败
    Error,
}

impl Badge {
    /// 徽标文本
    pub fn text(&self) -> &'static str {
        match self {
            Badge::Clear => "",
            Badge::Running => "RUN",
            Badge::Error => "ERR",
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.text())
    }
}
