//! Process-wide interrupt flag.
//!
//! The Ctrl-C handler only raises a flag. The orchestrator checks it around
//! every tool invocation and stops before starting another one.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    /// A flag wired to SIGINT. If the handler cannot be installed the flag
    /// still works, it just never trips on its own.
    pub fn install() -> Self {
        let cancel = Self::new();
        let flag = cancel.clone();
        if let Err(e) = ctrlc::set_handler(move || flag.cancel()) {
            log::warn!("could not install interrupt handler: {e}");
        }
        cancel
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
