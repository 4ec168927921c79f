//! # Toast channel — single-slot transient notifications
//!
//! At most one toast exists at a time. Showing a new one replaces the
//! current toast and cancels its pending auto-dismiss timer before the
//! replacement is installed; there is no queue. The auto-dismiss delay
//! depends on the kind unless an explicit duration is given.
//!
//! The timer is a spawned, abortable tokio task guarded by a sequence
//! counter, so a stale timer that races past its abort can never clear a
//! newer toast. Requires a running tokio runtime; every call site in this
//! crate is an async operation.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Severity of a toast, which also picks its auto-dismiss delay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Info,
    Warning,
    Error,
}

impl ToastKind {
    /// Kind-dependent default auto-dismiss delay.
    pub fn default_duration(self) -> Duration {
        match self {
            ToastKind::Success => Duration::from_millis(1500),
            ToastKind::Info => Duration::from_millis(1200),
            ToastKind::Warning => Duration::from_millis(2500),
            ToastKind::Error => Duration::from_millis(3000),
        }
    }
}

/// The currently held notification.
#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub visible: bool,
    pub message: String,
    pub kind: ToastKind,
}

impl Default for Toast {
    fn default() -> Self {
        Self {
            visible: false,
            message: String::new(),
            kind: ToastKind::Success,
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    toast: Toast,
    timer: Option<JoinHandle<()>>,
    seq: u64,
}

/// Handle to the single toast slot. Cheap to clone.
#[derive(Clone, Debug, Default)]
pub struct Toasts {
    slot: Arc<Mutex<Slot>>,
}

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current toast.
    pub fn current(&self) -> Toast {
        self.slot.lock().unwrap().toast.clone()
    }

    /// Replace the current toast and schedule its expiry. An explicit
    /// `duration` overrides the kind default.
    pub fn show(&self, message: impl Into<String>, kind: ToastKind, duration: Option<Duration>) {
        let mut slot = self.slot.lock().unwrap();
        // The pending expiry is always canceled before being replaced.
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
        slot.seq += 1;
        slot.toast = Toast {
            visible: true,
            message: message.into(),
            kind,
        };

        let seq = slot.seq;
        let delay = duration.unwrap_or_else(|| kind.default_duration());
        let shared = Arc::clone(&self.slot);
        slot.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut slot = shared.lock().unwrap();
            // A newer toast owns the slot now; leave it alone.
            if slot.seq == seq {
                slot.toast.visible = false;
                slot.timer = None;
            }
        }));
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(message, ToastKind::Success, None);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.show(message, ToastKind::Info, None);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.show(message, ToastKind::Warning, None);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(message, ToastKind::Error, None);
    }

    /// Cancel any pending timer and hide the toast immediately.
    pub fn dismiss(&self) {
        let mut slot = self.slot.lock().unwrap();
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
        slot.seq += 1;
        slot.toast.visible = false;
    }
}
