//! One-shot render-complete handshake between a page and the crawler

use std::future;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// The "render complete" hook exposed on a page's global context
///
/// Engines install this on the window before scripts run and call
/// [`RenderSignal::fire`] when the application invokes it. Only the first
/// call has an effect.
#[derive(Debug, Clone)]
pub struct RenderSignal {
    tx: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

/// The crawler's side of the handshake
#[derive(Debug)]
pub struct RenderWaiter {
    rx: Option<oneshot::Receiver<()>>,
    fired: bool,
}

impl RenderSignal {
    /// Creates a connected signal/waiter pair
    pub fn new() -> (RenderSignal, RenderWaiter) {
        let (tx, rx) = oneshot::channel();
        let signal = RenderSignal {
            tx: Arc::new(Mutex::new(Some(tx))),
        };
        let waiter = RenderWaiter {
            rx: Some(rx),
            fired: false,
        };
        (signal, waiter)
    }

    /// Signals that the page has finished rendering
    pub fn fire(&self) {
        let sender = match self.tx.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(sender) = sender {
            // The waiter may already be gone if the render was abandoned
            let _ = sender.send(());
        }
    }
}

impl RenderWaiter {
    /// Resolves once the signal has fired
    ///
    /// Never resolves if the signal is dropped without firing; callers race
    /// this against the engine's load-complete event. Cancel safe.
    pub async fn wait(&mut self) {
        if self.fired {
            return;
        }

        match self.rx.as_mut() {
            Some(rx) => match rx.await {
                Ok(()) => {
                    self.fired = true;
                    self.rx = None;
                }
                Err(_) => {
                    self.rx = None;
                    future::pending::<()>().await;
                }
            },
            None => future::pending::<()>().await,
        }
    }

    /// Returns true if the signal has fired, without waiting
    pub fn has_fired(&mut self) -> bool {
        if !self.fired {
            if let Some(rx) = self.rx.as_mut() {
                if rx.try_recv().is_ok() {
                    self.fired = true;
                    self.rx = None;
                }
            }
        }
        self.fired
    }
}
