//! alert tone synthesis and playback
//!
//! the driver never fails its caller: if no output device can be opened it
//! records a degraded status and every audio operation becomes a no-op, so
//! alarms still fire visually.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rodio::source::SineWave;
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};

use crate::config::ToneConfig;

/// how often a pulse is retriggered while the alarm sounds, leaving
/// ~200 ms of silence between pulses
pub const REPEAT_PERIOD: Duration = Duration::from_millis(1200);
/// length of one pulse
const PULSE_LENGTH: Duration = Duration::from_secs(1);
/// short ramp so the pulse doesn't start with an audible click
const PULSE_FADE_IN: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioStatus {
    Ok,
    /// audio is unavailable; the reason is meant for the user, shells
    /// should display it next to the (silent) alarm notification
    Degraded(String),
}

/// the live output stream and its handle. exactly one is alive at a time;
/// it is dropped and reopened on every stop so the next alert always gets
/// a fresh output to connect to.
struct AudioSession {
    // keeps the device open, sound stops if this is dropped
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl AudioSession {
    fn open() -> Result<Self, rodio::StreamError> {
        let (stream, handle) = OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            handle,
        })
    }
}

/// the in-flight tone repetition, owned by its own thread
struct PulseLoop {
    stop: Sender<()>,
    thread: JoinHandle<()>,
}

pub struct AlertDriver {
    tone: ToneConfig,
    session: Option<AudioSession>,
    degraded: Option<String>,
    pulse: Option<PulseLoop>,
}

impl AlertDriver {
    /// acquire the audio output. unavailability is absorbed into the
    /// degraded status instead of being returned as an error.
    #[must_use]
    pub fn initialize(tone: ToneConfig) -> Self {
        let mut driver = Self {
            tone,
            session: None,
            degraded: None,
            pulse: None,
        };
        driver.acquire_session();
        driver
    }

    /// driver that behaves as if no output device could be opened
    #[cfg(test)]
    pub(crate) fn without_device(reason: &str) -> Self {
        Self {
            tone: ToneConfig::default(),
            session: None,
            degraded: Some(reason.to_string()),
            pulse: None,
        }
    }

    fn acquire_session(&mut self) {
        match AudioSession::open() {
            Ok(session) => {
                self.session = Some(session);
                self.degraded = None;
            }
            Err(e) => {
                let reason =
                    format!("no audio output device available ({e}), alarms will be visual only");
                log::warn!("{reason}");
                self.session = None;
                self.degraded = Some(reason);
            }
        }
    }

    #[must_use]
    pub fn status(&self) -> AudioStatus {
        self.degraded
            .clone()
            .map_or(AudioStatus::Ok, AudioStatus::Degraded)
    }

    /// begin the repeating tone: a sine pulse, faded in over 10 ms, one
    /// second long, retriggered every [`REPEAT_PERIOD`] until
    /// [`stop_alert`](Self::stop_alert). no-op while degraded or already
    /// sounding.
    pub fn start_alert(&mut self) {
        if self.pulse.is_some() {
            return;
        }
        let Some(session) = &self.session else {
            return;
        };
        let sink = match Sink::try_new(&session.handle) {
            Ok(sink) => sink,
            Err(e) => {
                let reason =
                    format!("couldn't connect to the audio output ({e}), alarms will be visual only");
                log::warn!("{reason}");
                self.session = None;
                self.degraded = Some(reason);
                return;
            }
        };
        sink.set_volume(self.tone.gain());
        let frequency = self.tone.frequency;

        let (stop_tx, stop_rx) = mpsc::channel();
        let thread = thread::spawn(move || loop {
            sink.append(
                SineWave::new(frequency)
                    .take_duration(PULSE_LENGTH)
                    .fade_in(PULSE_FADE_IN),
            );
            // the wait doubles as the pulse spacing, so a stop request is
            // observed within one repeat period
            match stop_rx.recv_timeout(REPEAT_PERIOD) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    sink.stop();
                    break;
                }
            }
        });
        self.pulse = Some(PulseLoop {
            stop: stop_tx,
            thread,
        });
    }

    /// halt the tone (cutting a pulse short if needed), then drop the
    /// audio session and open a fresh one so the driver is ready for the
    /// next alert. idempotent, safe to call while idle or degraded.
    pub fn stop_alert(&mut self) {
        if let Some(pulse) = self.pulse.take() {
            let _ = pulse.stop.send(());
            let _ = pulse.thread.join();
        }
        if self.session.take().is_some() {
            self.acquire_session();
        }
    }
}

impl Drop for AlertDriver {
    fn drop(&mut self) {
        if let Some(pulse) = self.pulse.take() {
            let _ = pulse.stop.send(());
            let _ = pulse.thread.join();
        }
    }
}
