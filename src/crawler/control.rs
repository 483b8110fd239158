//! Pause, resume and stop requests for a running crawl
//!
//! The coordinator checks the control state between sub-batches only, so an
//! in-flight sub-batch always completes and is merged before a pause or stop
//! takes effect.

use std::io::BufRead;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Running,
    Paused,
    Stopping,
}

/// Sending half of the control channel
#[derive(Debug)]
pub struct CrawlControl {
    tx: watch::Sender<ControlState>,
}

impl CrawlControl {
    pub fn new() -> (Self, watch::Receiver<ControlState>) {
        let (tx, rx) = watch::channel(ControlState::Running);
        (Self { tx }, rx)
    }

    /// First interrupt pauses, an interrupt while paused stops
    pub fn interrupt(&self) -> ControlState {
        self.tx.send_if_modified(|state| {
            *state = match *state {
                ControlState::Running => ControlState::Paused,
                ControlState::Paused | ControlState::Stopping => ControlState::Stopping,
            };
            true
        });
        *self.tx.borrow()
    }

    /// Returns `true` if the crawl was paused and is now running again
    pub fn resume(&self) -> bool {
        self.tx.send_if_modified(|state| {
            if *state == ControlState::Paused {
                *state = ControlState::Running;
                true
            } else {
                false
            }
        })
    }

    pub fn stop(&self) {
        self.tx.send_replace(ControlState::Stopping);
    }

    pub fn state(&self) -> ControlState {
        *self.tx.borrow()
    }
}

/// Blocks while paused; returns `false` when the crawl should stop
///
/// A dropped sender while paused counts as a stop, since nothing can resume.
pub async fn proceed(rx: &mut watch::Receiver<ControlState>) -> bool {
    loop {
        let state = *rx.borrow_and_update();
        match state {
            ControlState::Running => return true,
            ControlState::Stopping => return false,
            ControlState::Paused => {
                if rx.changed().await.is_err() {
                    return false;
                }
            }
        }
    }
}

/// Wires Ctrl+C and ENTER on stdin to `control`
///
/// Stdin is read on a detached thread: a blocking read cannot be cancelled and
/// must not hold up runtime shutdown.
pub fn listen_for_signals(control: Arc<CrawlControl>) {
    let signals = Arc::clone(&control);
    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Failed to listen for Ctrl+C: {}", e);
                return;
            }

            match signals.interrupt() {
                ControlState::Paused => tracing::info!(
                    "Paused after the current sub-batch. Press ENTER to resume, Ctrl+C again to stop"
                ),
                ControlState::Stopping => {
                    tracing::info!("Stopping after the current sub-batch");
                    return;
                }
                ControlState::Running => {}
            }
        }
    });

    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if line.is_err() {
                break;
            }
            if control.resume() {
                tracing::info!("Resuming crawl");
            }
        }
    });
}
