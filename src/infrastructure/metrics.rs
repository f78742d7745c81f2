// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::MetricsSettings;
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 初始化指标系统
///
/// 安装 Prometheus 导出器并注册补全相关指标。禁用或地址非法时只记录日志
pub fn init_metrics(settings: &MetricsSettings) {
    if !settings.enabled {
        info!("Metrics exporter disabled");
        return;
    }

    let addr: SocketAddr = match settings.listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Invalid metrics address {}: {}", settings.listen_addr, e);
            return;
        }
    };

    // Ignore error if address is already in use (for development/testing)
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}. This might happen if the port is already in use.", e);
        return;
    }

    describe_metrics();
    info!("Metrics exporter listening on {}", addr);
}

fn describe_metrics() {
    describe_counter!(
        "enrichment_tasks_completed_total",
        "Total number of enrichment tasks completed"
    );
    describe_counter!(
        "enrichment_tasks_failed_total",
        "Total number of enrichment tasks failed, including dispatch failures and timeouts"
    );
    describe_counter!(
        "enrichment_results_discarded_total",
        "Total number of scrape results dropped because no valid session was present"
    );
    describe_counter!(
        "enrichment_contacts_saved_total",
        "Total number of contacts saved"
    );
    describe_histogram!(
        "enrichment_scrape_duration_seconds",
        "Time from scrape command to reported result in seconds"
    );
}
