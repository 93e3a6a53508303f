//! facade tying the time source, state machine, and audio driver together.
//! this is the whole surface a presentation shell needs: queries for
//! rendering, commands for user intents, and a channel of state changes.

use std::sync::mpsc::{self, Receiver, Sender};

use crate::alarm::{Alarm, AlarmError, AlertState};
use crate::audio::{AlertDriver, AudioStatus};
use crate::communication::StateChange;
use crate::ticker::ClockTime;

/// read-only view of the alarm for rendering. the target is a copy, the
/// engine keeps exclusive ownership of the live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmSnapshot {
    pub state: AlertState,
    pub target: Option<ClockTime>,
}

/// drive this from a single thread: feed it time source samples via
/// [`handle_tick`](Self::handle_tick) and user intents via the `request_*`
/// methods. transitions are synchronous, nothing blocks.
pub struct ClockEngine {
    alarm: Alarm,
    audio: AlertDriver,
    subscribers: Vec<Sender<StateChange>>,
}

impl ClockEngine {
    #[must_use]
    pub fn new(audio: AlertDriver) -> Self {
        Self {
            alarm: Alarm::new(),
            audio,
            subscribers: Vec::new(),
        }
    }

    /// register for a notification on every alert state change
    pub fn subscribe(&mut self) -> Receiver<StateChange> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn notify(&mut self, change: StateChange) {
        // forget subscribers whose receiving end is gone
        self.subscribers.retain(|tx| tx.send(change).is_ok());
    }

    #[must_use]
    pub fn current_state(&self) -> AlarmSnapshot {
        AlarmSnapshot {
            state: self.alarm.state(),
            target: self.alarm.target(),
        }
    }

    /// surfaced so shells can display a warning banner while degraded
    #[must_use]
    pub fn audio_status(&self) -> AudioStatus {
        self.audio.status()
    }

    /// set the alarm for `hour:minute`, today or tomorrow (whichever is
    /// still ahead). returns the resolved target.
    ///
    /// # Errors
    /// rejected while an alarm is sounding or when the time is out of
    /// range; the previous state is left untouched.
    pub fn request_arm(&mut self, hour: u32, minute: u32) -> Result<ClockTime, AlarmError> {
        self.arm_at(hour, minute, chrono::Local::now().naive_local())
    }

    // split from request_arm so tests can pin the clock
    pub(crate) fn arm_at(
        &mut self,
        hour: u32,
        minute: u32,
        now: ClockTime,
    ) -> Result<ClockTime, AlarmError> {
        let target = self.alarm.arm(hour, minute, now)?;
        log::info!("alarm armed for {target}");
        self.notify(StateChange::Armed(target));
        Ok(target)
    }

    /// drop an armed alarm. inert unless armed.
    pub fn request_cancel(&mut self) {
        if self.alarm.cancel() {
            log::info!("alarm cancelled");
            self.notify(StateChange::Cancelled);
        }
    }

    /// silence a sounding alarm. the audio driver is always told to stop,
    /// so a redundant request still leaves it torn down and ready.
    pub fn request_stop(&mut self) {
        self.audio.stop_alert();
        if self.alarm.stop() {
            log::info!("alarm stopped");
            self.notify(StateChange::Stopped);
        }
    }

    /// feed one time source sample through the state machine; starts the
    /// audio alert on the tick that fires
    pub fn handle_tick(&mut self, now: ClockTime) {
        if self.alarm.on_tick(now) {
            log::info!("alarm fired at {now}");
            self.audio.start_alert();
            self.notify(StateChange::Firing(now));
        }
    }
}
