//! Correlation of request packets with their replies
//!
//! Registration and subscription are fire-and-forget, so nothing in the
//! session populates this table today. Request types that expect a reply
//! follow the same three steps:
//!
//! 1. [`PendingRequests::insert`] under the packet's pid, before sending
//! 2. [`PendingRequests::complete`] when a record with that pid arrives
//! 3. [`PendingRequests::wait`] gives up after a timeout and removes the entry

use crate::{CoreError, Result};
use registry_api::Record;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Awaiting callers keyed by correlation id
#[derive(Default)]
pub struct PendingRequests {
    waiters: Mutex<HashMap<String, oneshot::Sender<Record>>>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    fn waiters(&self) -> MutexGuard<'_, HashMap<String, oneshot::Sender<Record>>> {
        self.waiters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a waiter for `pid`. Must happen before the request is sent.
    pub fn insert(&self, pid: &str) -> Result<oneshot::Receiver<Record>> {
        let mut waiters = self.waiters();
        if waiters.contains_key(pid) {
            return Err(CoreError::DuplicateRequest(pid.to_string()));
        }

        let (tx, rx) = oneshot::channel();
        waiters.insert(pid.to_string(), tx);
        debug!(pid = %pid, pending = waiters.len(), "Registered pending request");
        Ok(rx)
    }

    /// Hand a record to the waiter matching its pid.
    ///
    /// Returns the record back when no waiter claims it, so the caller can
    /// keep dispatching it by type.
    pub fn complete(&self, record: Record) -> Option<Record> {
        let waiter = match record.pid.as_deref() {
            Some(pid) => self.waiters().remove(pid),
            None => None,
        };

        match waiter {
            Some(tx) => {
                debug!(pid = ?record.pid, kind = %record.kind, "Delivered reply to pending request");
                // The caller may have timed out between lookup and send
                let _ = tx.send(record);
                None
            }
            None => Some(record),
        }
    }

    /// Forget a waiter without completing it
    pub fn cancel(&self, pid: &str) -> bool {
        self.waiters().remove(pid).is_some()
    }

    /// Wait for the reply to `pid`, removing the entry if none arrives in time
    pub async fn wait(
        &self,
        pid: &str,
        rx: oneshot::Receiver<Record>,
        timeout: Duration,
    ) -> Result<Record> {
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(record)) => Ok(record),
            Ok(Err(_)) => Err(CoreError::RequestDropped(pid.to_string())),
            Err(_) => {
                self.cancel(pid);
                warn!(pid = %pid, ?timeout, "Pending request timed out");
                Err(CoreError::Timeout {
                    pid: pid.to_string(),
                    timeout,
                })
            }
        }
    }

    pub fn len(&self) -> usize {
        self.waiters().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
