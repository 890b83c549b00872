//! Shared ownership of one transport by the clients built on it.
//!
//! Builders and callers may hold the transport too, but only attached clients and
//! running sends keep it alive. The transport is released the moment both counts
//! reach zero: by the last [`detach`](TransportHandle::detach) when nothing is in
//! flight, otherwise by the last [`InFlight`] guard to drop.

use super::Transport;
use crate::error::Result;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Usage {
    clients: usize,
    in_flight: usize,
}

impl Usage {
    fn is_idle(&self) -> bool {
        self.clients == 0 && self.in_flight == 0
    }
}

pub(crate) struct TransportHandle {
    transport: Arc<dyn Transport>,
    usage: Mutex<Usage>,
}

impl TransportHandle {
    pub(crate) fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            usage: Mutex::new(Usage::default()),
        }
    }

    pub(crate) fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Register one more client. The returned flag is that client's attachment.
    pub(crate) fn attach(&self) -> AtomicBool {
        self.usage.lock().clients += 1;
        AtomicBool::new(true)
    }

    /// Detach the client owning `attached`. Idempotent per client.
    ///
    /// Releases the transport and returns its error when this was the last client
    /// and no send is running.
    pub(crate) fn detach(&self, attached: &AtomicBool) -> Result<bool> {
        let idle = {
            let mut usage = self.usage.lock();
            if !attached.swap(false, Ordering::SeqCst) {
                return Ok(false);
            }
            usage.clients -= 1;
            usage.is_idle()
        };

        if idle {
            self.transport.dispose()?;
        }
        Ok(idle)
    }

    /// Start a send for the client owning `attached`; `None` once it is detached.
    pub(crate) fn begin(self: &Arc<Self>, attached: &AtomicBool) -> Option<InFlight> {
        let mut usage = self.usage.lock();
        if !attached.load(Ordering::SeqCst) {
            return None;
        }
        usage.in_flight += 1;
        Some(InFlight {
            handle: Arc::clone(self),
        })
    }

    pub(crate) fn clients(&self) -> usize {
        self.usage.lock().clients
    }

    #[cfg(test)]
    pub(crate) fn in_flight(&self) -> usize {
        self.usage.lock().in_flight
    }
}

/// Marks one running send. The last guard dropped after every client detached
/// releases the transport.
pub(crate) struct InFlight {
    handle: Arc<TransportHandle>,
}

impl InFlight {
    pub(crate) fn transport(&self) -> &dyn Transport {
        self.handle.transport.as_ref()
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let idle = {
            let mut usage = self.handle.usage.lock();
            usage.in_flight -= 1;
            usage.is_idle()
        };

        if idle {
            tracing::debug!("last in-flight request finished, releasing transport");
            if let Err(err) = self.handle.transport.dispose() {
                tracing::warn!(error = %err, "transport release failed after last in-flight request");
            }
        }
    }
}
