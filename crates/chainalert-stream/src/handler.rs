//! `LogHandler`: turns one raw log into one alert.
//!
//! Decode-or-fallback policy:
//! 1. with a descriptor, decode the log and look up the deposit amount;
//!    success renders the detailed message
//! 2. no descriptor, a decode failure, or no usable amount renders the
//!    generic message
//! 3. the message goes to the sink once; a failed send is logged and dropped

use crate::context::RelayContext;
use chainalert_core::{
    alert::{self, AlertKind},
    event::RawLog,
    pool::PoolConfig,
};
use chainalert_evm::{deposit_amount, format_units};
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of handling one log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandledLog {
    pub kind: AlertKind,
    pub message: String,
    pub delivered: bool,
}

/// Stateless per-log handler. Cheap to clone.
#[derive(Clone)]
pub struct LogHandler {
    ctx: Arc<RelayContext>,
}

impl LogHandler {
    pub fn new(ctx: Arc<RelayContext>) -> Self {
        Self { ctx }
    }

    /// Render the alert for a log without sending it.
    pub fn render(&self, log: &RawLog, pool: &PoolConfig) -> (AlertKind, String) {
        let tx_url = self.ctx.explorer.tx_url(&log.transaction_hash);

        if let Some(descriptor) = &self.ctx.descriptor {
            match descriptor.decode(log) {
                Ok(decoded) => match deposit_amount(&decoded) {
                    Some(raw) => {
                        let amount = format_units(raw, pool.decimals);
                        let symbol = alert::classify_symbol(&pool.name);
                        let message = alert::deposit_message(
                            &amount,
                            symbol,
                            &pool.name,
                            &tx_url,
                            &log.transaction_hash,
                        );
                        return (AlertKind::Deposit, message);
                    }
                    None => warn!(
                        pool = %pool.name,
                        tx = %log.transaction_hash,
                        "decoded log has no numeric deposit amount, sending generic alert"
                    ),
                },
                Err(e) => warn!(
                    pool = %pool.name,
                    tx = %log.transaction_hash,
                    error = %e,
                    "failed to decode log, sending generic alert"
                ),
            }
        }

        let message = alert::generic_message(&pool.name, &tx_url, &log.transaction_hash);
        (AlertKind::Generic, message)
    }

    /// Render and send. Delivery failures are logged, never returned.
    pub async fn handle(&self, log: &RawLog, pool: &PoolConfig) -> HandledLog {
        let (kind, message) = self.render(log, pool);

        let delivered = match self.ctx.sink.send(&message).await {
            Ok(()) => {
                debug!(pool = %pool.name, tx = %log.transaction_hash, sink = self.ctx.sink.name(), "alert sent");
                true
            }
            Err(e) => {
                warn!(
                    pool = %pool.name,
                    tx = %log.transaction_hash,
                    sink = self.ctx.sink.name(),
                    error = %e,
                    "alert delivery failed, dropping message"
                );
                false
            }
        };

        HandledLog {
            kind,
            message,
            delivered,
        }
    }
}
