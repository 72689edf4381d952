use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

#[derive(Default)]
struct InterruptState {
    flag: AtomicBool,
    notify: Notify,
}

/// Shared flag that is raised when the user presses CTRL-C.
///
/// Commands check it between steps and stop early, printing whatever they
/// have gathered so far.
#[derive(Clone, Default)]
pub struct Interrupt(Arc<InterruptState>);

impl Interrupt {
    /// Creates the flag and spawns a task that raises it on CTRL-C.
    /// Has to be called from within a tokio runtime.
    pub fn install() -> Self {
        let interrupt = Self::default();
        let flag = interrupt.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    log::debug!("Received CTRL-C");
                    flag.trigger();
                }
                Err(error) => log::warn!("Cannot listen for CTRL-C: {error}"),
            }
        });
        interrupt
    }

    pub fn trigger(&self) {
        self.0.flag.store(true, Ordering::SeqCst);
        self.0.notify.notify_waiters();
    }

    pub fn is_set(&self) -> bool {
        self.0.flag.load(Ordering::SeqCst)
    }

    /// Resolves once the flag is raised.
    pub async fn wait(&self) {
        loop {
            let notified = self.0.notify.notified();
            if self.is_set() {
                return;
            }
            notified.await;
        }
    }

    /// Runs `future` to completion unless interrupted first, in which case
    /// `None` is returned.
    pub async fn guard<F: Future>(&self, future: F) -> Option<F::Output> {
        if self.is_set() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.wait() => None,
            output = future => Some(output),
        }
    }
}
