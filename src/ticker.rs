use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::NaiveDateTime;

/// one sample of the local wall clock
pub type ClockTime = NaiveDateTime;

/// how often the clock is sampled
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// periodic time source
///
/// samples `chrono::Local` on its own thread and hands each sample to the
/// registered callback, strictly in order, one at a time. dropping the
/// ticker (or calling [`stop`](Self::stop)) halts production within one
/// period; no sample is delivered after that.
pub struct Ticker {
    shutdown: Sender<()>,
    thread: Option<JoinHandle<()>>,
}

impl Ticker {
    /// start sampling. the first sample is delivered right away so a shell
    /// has something to render before the first period elapses.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut(ClockTime) + Send + 'static,
    {
        let (shutdown, shutdown_rx) = mpsc::channel();
        let thread = thread::spawn(move || loop {
            on_tick(chrono::Local::now().naive_local());
            // the wait doubles as the shutdown check
            match shutdown_rx.recv_timeout(period) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });
        Self {
            shutdown,
            thread: Some(thread),
        }
    }

    /// stop producing samples. idempotent; blocks until the sampling thread
    /// has exited, so no callback runs after this returns.
    pub fn stop(&mut self) {
        let _ = self.shutdown.send(());
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
