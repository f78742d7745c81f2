// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::workers::enrichment_worker::EnrichmentWorker;
use crate::workers::task_listener::TaskListener;
use crate::workers::worker::Worker;
use std::time::Duration;
use tokio::signal;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// 工作管理器
///
/// 启动实时监听器和补全工作器，并在收到关闭信号时停止它们
pub struct WorkerManager {
    worker: Option<EnrichmentWorker>,
    listener: Option<TaskListener>,
    shutdown_tx: broadcast::Sender<()>,
    worker_handle: Option<JoinHandle<()>>,
    listener_handle: Option<JoinHandle<()>>,
}

impl WorkerManager {
    pub fn new(worker: EnrichmentWorker, listener: TaskListener) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            worker: Some(worker),
            listener: Some(listener),
            shutdown_tx,
            worker_handle: None,
            listener_handle: None,
        }
    }

    /// 启动工作进程
    ///
    /// 重复调用不会重复启动
    pub fn start_workers(&mut self) {
        if let Some(worker) = self.worker.take() {
            let shutdown = self.shutdown_tx.subscribe();
            self.worker_handle = Some(tokio::spawn(async move {
                worker.run(shutdown).await;
            }));
        }

        if let Some(listener) = self.listener.take() {
            self.listener_handle = Some(tokio::spawn(async move {
                let name = listener.name().to_string();
                if let Err(e) = listener.run().await {
                    error!("Worker {} exited with error: {}", name, e);
                }
            }));
        }
    }

    /// 等待关闭信号并关闭工作进程
    pub async fn wait_for_shutdown(&mut self) {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(err) => error!("Unable to listen for shutdown signal: {}", err),
        }
        self.shutdown().await;
    }

    /// 关闭所有工作进程
    pub async fn shutdown(&mut self) {
        info!("Shutting down workers...");
        let _ = self.shutdown_tx.send(());

        if let Some(handle) = self.listener_handle.take() {
            handle.abort();
        }
        if let Some(handle) = self.worker_handle.take() {
            if tokio::time::timeout(SHUTDOWN_GRACE, handle).await.is_err() {
                error!("Enrichment worker did not stop within {:?}", SHUTDOWN_GRACE);
            }
        }

        info!("Workers shut down successfully");
    }
}
