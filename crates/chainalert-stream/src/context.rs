//! Startup-resolved, read-only state shared by the dispatcher and handlers.

use chainalert_core::{
    alert::ExplorerLinks,
    event::LogFilter,
    pool::PoolRegistry,
    sink::AlertSink,
};
use chainalert_evm::EventDescriptor;
use std::sync::Arc;

/// Everything a handler needs, built once and shared behind an `Arc`.
pub struct RelayContext {
    pub pools: PoolRegistry,
    /// `None` disables decoding; every log gets the generic alert.
    pub descriptor: Option<EventDescriptor>,
    pub explorer: ExplorerLinks,
    pub sink: Arc<dyn AlertSink>,
}

impl RelayContext {
    pub fn new(
        pools: PoolRegistry,
        descriptor: Option<EventDescriptor>,
        explorer: ExplorerLinks,
        sink: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            pools,
            descriptor,
            explorer,
            sink,
        }
    }

    /// One filter per pool, in registry order.
    pub fn filters(&self) -> Vec<LogFilter> {
        let topic0 = self.descriptor.as_ref().map(|d| d.topic_id().to_string());
        self.pools
            .iter()
            .map(|pool| LogFilter {
                address: pool.address.clone(),
                topic0: topic0.clone(),
            })
            .collect()
    }
}
