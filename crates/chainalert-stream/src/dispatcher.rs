//! `Dispatcher`: registers one filter per pool and fans logs out to handlers.
//!
//! Every delivered log is handled on its own Tokio task in a `JoinSet`, so
//! handlers for different logs may overlap. Handlers share only the
//! read-only `RelayContext`. A panicking handler costs that one alert.

use crate::context::RelayContext;
use crate::handler::LogHandler;
use crate::listener::LogListener;
use chainalert_core::error::StreamError;
use futures::StreamExt;
use std::sync::Arc;
use tokio::task::{JoinError, JoinSet};
use tracing::{error, info, warn};

/// Counters for one dispatcher run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub subscriptions: usize,
    pub logs_received: u64,
    pub alerts_delivered: u64,
    pub delivery_failures: u64,
    pub handler_failures: u64,
    pub stream_errors: u64,
}

pub struct Dispatcher {
    ctx: Arc<RelayContext>,
    listener: Arc<dyn LogListener>,
    handler: LogHandler,
}

impl Dispatcher {
    pub fn new(ctx: Arc<RelayContext>, listener: Arc<dyn LogListener>) -> Self {
        let handler = LogHandler::new(Arc::clone(&ctx));
        Self {
            ctx,
            listener,
            handler,
        }
    }

    /// Subscribe and process logs until the transport's stream ends.
    ///
    /// An empty registry subscribes to nothing and returns immediately.
    /// The only error is a failure to open the subscription; once running,
    /// transport errors are logged and counted.
    pub async fn run(self) -> Result<DispatchStats, StreamError> {
        let mut stats = DispatchStats::default();

        if self.ctx.pools.is_empty() {
            warn!("no pools configured, nothing is watched");
            return Ok(stats);
        }

        let filters = self.ctx.filters();
        stats.subscriptions = filters.len();
        for pool in self.ctx.pools.iter() {
            info!(pool = %pool.name, address = %pool.address, "watching pool");
        }

        let mut stream = self.listener.subscribe(filters).await?;
        let mut tasks: JoinSet<bool> = JoinSet::new();

        while let Some(item) = stream.next().await {
            match item {
                Ok(sub) => {
                    let Some(pool) = self.ctx.pools.get(sub.filter).cloned() else {
                        warn!(filter = sub.filter, "log routed to unknown filter");
                        continue;
                    };
                    stats.logs_received += 1;
                    let handler = self.handler.clone();
                    tasks.spawn(async move { handler.handle(&sub.log, &pool).await.delivered });
                }
                Err(e) => {
                    stats.stream_errors += 1;
                    warn!(error = %e, "log stream error");
                }
            }

            while let Some(done) = tasks.try_join_next() {
                record(&mut stats, done);
            }
        }

        info!(in_flight = tasks.len(), "log stream ended");
        while let Some(done) = tasks.join_next().await {
            record(&mut stats, done);
        }

        info!(
            logs = stats.logs_received,
            delivered = stats.alerts_delivered,
            failed = stats.delivery_failures + stats.handler_failures,
            "dispatcher stopped"
        );
        Ok(stats)
    }
}

fn record(stats: &mut DispatchStats, done: Result<bool, JoinError>) {
    match done {
        Ok(true) => stats.alerts_delivered += 1,
        Ok(false) => stats.delivery_failures += 1,
        Err(e) => {
            stats.handler_failures += 1;
            error!(error = %e, "log handler task failed");
        }
    }
}
