//! Request coordination in front of a [`ConversionRuntime`].
//!
//! The runtime is started lazily on the first conversion and requests are
//! serialized behind a single lock. Every request takes a ticket from a
//! generation counter; a reply whose ticket is no longer the latest is
//! reported as [`BridgeReply::Superseded`] so callers can drop it.

use crate::error::{BridgeError, BridgeResult};
use crate::runtime::ConversionRuntime;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

pub const READY_MESSAGE: &str = "Ready!";

#[derive(Debug, Clone, PartialEq)]
pub enum BridgeReply {
    /// JSON Schema produced by the runtime
    Document(Value),
    /// A newer request (or a cancel) arrived while this one was pending
    Superseded,
}

pub struct Bridge<R> {
    runtime: R,
    ready: Mutex<bool>,
    generation: AtomicU64,
    progress: watch::Sender<String>,
}

impl<R: ConversionRuntime> Bridge<R> {
    pub fn new(runtime: R) -> Self {
        let (progress, _) = watch::channel(String::from("Not started"));
        Self {
            runtime,
            ready: Mutex::new(false),
            generation: AtomicU64::new(0),
            progress,
        }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Progress messages published while the runtime starts
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.progress.subscribe()
    }

    pub async fn is_ready(&self) -> bool {
        *self.ready.lock().await
    }

    /// Marks every pending request as superseded
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Start the runtime ahead of the first conversion
    pub async fn warm_up(&self) -> BridgeResult<()> {
        let mut ready = self.ready.lock().await;
        self.ensure_started(&mut ready).await
    }

    pub async fn code_to_document(&self, code: &str) -> BridgeResult<BridgeReply> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut ready = self.ready.lock().await;

        if self.is_stale(ticket) {
            debug!(ticket, "request superseded before start");
            return Ok(BridgeReply::Superseded);
        }

        self.ensure_started(&mut ready).await?;

        let output = match self.runtime.convert(code).await {
            Ok(output) => output,
            Err(e) => {
                warn!(error = %e, "conversion failed, runtime will restart on next request");
                *ready = false;
                return Err(e);
            }
        };

        if self.is_stale(ticket) {
            debug!(ticket, "discarding superseded reply");
            return Ok(BridgeReply::Superseded);
        }

        let value: Value = serde_json::from_str(output.trim())?;
        if !value.is_object() {
            return Err(BridgeError::Conversion("runtime did not return a JSON object".to_string()));
        }
        Ok(BridgeReply::Document(value))
    }

    async fn ensure_started(&self, ready: &mut bool) -> BridgeResult<()> {
        if *ready {
            return Ok(());
        }
        self.runtime.start(&self.progress).await?;
        *ready = true;
        self.progress.send_replace(READY_MESSAGE.to_string());
        info!("conversion runtime ready");
        Ok(())
    }

    fn is_stale(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != ticket
    }
}
