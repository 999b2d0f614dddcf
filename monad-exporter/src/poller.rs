//! The poll loop.
//!
//! One tick runs every collector in order, then the loop sleeps for the
//! configured interval. A slow tick pushes the next one back; ticks never
//! overlap. The only thing that stops the loop is the process going away.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::collectors::Collector;
use crate::error::ExporterError;
use crate::metrics::{MetricsRegistry, bind_metrics_listener, serve_metrics};
use crate::rpc::RpcClient;

/// Drives the collectors on a fixed interval.
#[derive(Clone)]
pub struct PollLoop {
    rpc: Arc<RpcClient>,
    metrics: Arc<MetricsRegistry>,
    collectors: Arc<Vec<Box<dyn Collector>>>,
    interval: Duration,
}

impl PollLoop {
    pub fn new(
        rpc: Arc<RpcClient>,
        metrics: Arc<MetricsRegistry>,
        collectors: Vec<Box<dyn Collector>>,
        interval: Duration,
    ) -> Self {
        Self {
            rpc,
            metrics,
            collectors: Arc::new(collectors),
            interval,
        }
    }

    /// Runs every collector once, in order.
    pub async fn tick(&self) {
        let start = Instant::now();
        for collector in self.collectors.iter() {
            let started = Instant::now();
            collector.collect(&self.rpc, &self.metrics.chain).await;
            tracing::debug!(
                collector = collector.name(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "collector finished"
            );
        }
        self.metrics
            .poll
            .collection_time_seconds
            .set(start.elapsed().as_secs_f64());
    }

    /// Runs one tick on its own task so a panic inside it is contained.
    ///
    /// Returns `false` if the tick panicked or was cancelled.
    pub async fn guarded_tick(&self) -> bool {
        let poller = self.clone();
        match tokio::spawn(async move { poller.tick().await }).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "error updating metrics, continuing with next tick");
                false
            }
        }
    }

    /// Starts the metrics exporter on `listen_addr`, then polls forever.
    ///
    /// Only returns if the exporter cannot bind.
    pub async fn run(self, listen_addr: SocketAddr) -> Result<(), ExporterError> {
        let listener = bind_metrics_listener(listen_addr).await?;
        tracing::info!("metrics exporter listening on http://{listen_addr}/metrics");
        tokio::spawn(serve_metrics(listener, self.metrics.clone()));

        loop {
            self.guarded_tick().await;
            tokio::time::sleep(self.interval).await;
        }
    }
}
