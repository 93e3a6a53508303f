use chrono::{NaiveDateTime, Timelike};
use thiserror::Error;

use crate::ticker::ClockTime;

/// where the alarm is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertState {
    /// no target set
    #[default]
    Idle,
    /// target set, waiting for a matching tick
    Armed,
    /// target matched, the alert is active until stopped
    Firing,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlarmError {
    #[error("{hour:02}:{minute:02} is not a valid alarm time")]
    InvalidTime { hour: u32, minute: u32 },
    #[error("an alarm is already sounding, stop it before setting a new one")]
    AlarmSounding,
}

/// one-shot alarm state machine
///
/// holds the armed target (if any) and decides, tick by tick, whether to
/// fire. every operation takes `now` explicitly so the caller owns the
/// clock; the engine passes time source samples, tests pass fixed times.
#[derive(Debug, Default)]
pub struct Alarm {
    state: AlertState,
    target: Option<NaiveDateTime>,
}

impl Alarm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> AlertState {
        self.state
    }

    /// the resolved target, set while armed or firing
    #[must_use]
    pub const fn target(&self) -> Option<NaiveDateTime> {
        self.target
    }

    /// set the alarm for today at `hour:minute`, or tomorrow if that time
    /// has already passed. replaces the target when already armed.
    ///
    /// # Errors
    /// rejected while an alarm is sounding, or if `hour`/`minute` are out
    /// of range.
    pub fn arm(
        &mut self,
        hour: u32,
        minute: u32,
        now: ClockTime,
    ) -> Result<NaiveDateTime, AlarmError> {
        if self.state == AlertState::Firing {
            return Err(AlarmError::AlarmSounding);
        }
        let target = now
            .date()
            .and_hms_opt(hour, minute, 0)
            .ok_or(AlarmError::InvalidTime { hour, minute })?;
        // a time at or before now means tomorrow
        let target = if target > now {
            target
        } else {
            target + chrono::Duration::days(1)
        };
        self.target = Some(target);
        self.state = AlertState::Armed;
        Ok(target)
    }

    /// drop the armed target without firing. inert unless armed.
    pub fn cancel(&mut self) -> bool {
        if self.state != AlertState::Armed {
            return false;
        }
        self.state = AlertState::Idle;
        self.target = None;
        true
    }

    /// observe one time source sample. returns `true` on the single tick
    /// that fires the alarm; inert while idle or already firing, so the
    /// same minute can't fire twice.
    pub fn on_tick(&mut self, now: ClockTime) -> bool {
        if self.state != AlertState::Armed {
            return false;
        }
        let Some(target) = self.target else {
            return false;
        };
        // minute granularity on purpose, the target carries no seconds.
        // the date is ignored too: if every tick of the target minute was
        // slept through, the alarm fires at the next hh:mm occurrence
        // instead of staying armed with a stale target
        if now.hour() == target.hour() && now.minute() == target.minute() {
            self.state = AlertState::Firing;
            true
        } else {
            false
        }
    }

    /// silence a sounding alarm and clear its target. inert unless firing.
    pub fn stop(&mut self) -> bool {
        if self.state != AlertState::Firing {
            return false;
        }
        self.state = AlertState::Idle;
        self.target = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn clock(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap()
    }

    #[test]
    fn arm_future_time_resolves_to_today() {
        let mut alarm = Alarm::new();
        let target = alarm.arm(15, 0, clock(14, 0, 0)).unwrap();
        assert_eq!(target, clock(15, 0, 0));
        assert_eq!(alarm.state(), AlertState::Armed);
    }

    #[test]
    fn arm_past_time_resolves_to_tomorrow() {
        let mut alarm = Alarm::new();
        let target = alarm.arm(9, 30, clock(14, 0, 0)).unwrap();
        assert_eq!(
            target,
            NaiveDate::from_ymd_opt(2024, 5, 18)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap()
        );
    }

    #[test]
    fn arm_exactly_now_resolves_to_tomorrow() {
        // "not strictly after now" counts as already passed
        let mut alarm = Alarm::new();
        let target = alarm.arm(14, 0, clock(14, 0, 0)).unwrap();
        assert_eq!(target.date(), NaiveDate::from_ymd_opt(2024, 5, 18).unwrap());
    }

    #[test]
    fn fires_on_matching_minute_any_second() {
        let mut alarm = Alarm::new();
        alarm.arm(15, 0, clock(14, 0, 0)).unwrap();
        assert!(!alarm.on_tick(clock(14, 59, 59)));
        assert!(alarm.on_tick(clock(15, 0, 37)));
        assert_eq!(alarm.state(), AlertState::Firing);
    }

    #[test]
    fn every_valid_time_fires_within_one_tick() {
        for hour in 0..24 {
            for minute in (0..60).step_by(7) {
                let mut alarm = Alarm::new();
                let target = alarm.arm(hour, minute, clock(0, 0, 0)).unwrap();
                let tick = target + chrono::Duration::seconds(30);
                assert!(alarm.on_tick(tick), "no fire at {hour:02}:{minute:02}");
            }
        }
    }

    #[test]
    fn missed_target_minute_fires_at_the_next_occurrence() {
        // host suspend can swallow every tick of the target minute; the
        // next tick landing on the same hh:mm must still fire
        let mut alarm = Alarm::new();
        let target = alarm.arm(9, 30, clock(14, 0, 0)).unwrap();
        let late_tick = target + chrono::Duration::days(1);
        assert!(alarm.on_tick(late_tick));
        assert_eq!(alarm.state(), AlertState::Firing);
    }

    #[test]
    fn does_not_fire_twice_in_the_matched_minute() {
        let mut alarm = Alarm::new();
        alarm.arm(15, 0, clock(14, 0, 0)).unwrap();
        assert!(alarm.on_tick(clock(15, 0, 1)));
        assert!(!alarm.on_tick(clock(15, 0, 2)));
        assert_eq!(alarm.state(), AlertState::Firing);
    }

    #[test]
    fn cancelled_alarm_no_longer_fires() {
        let mut alarm = Alarm::new();
        alarm.arm(15, 0, clock(14, 0, 0)).unwrap();
        assert!(alarm.cancel());
        assert_eq!(alarm.state(), AlertState::Idle);
        assert_eq!(alarm.target(), None);
        assert!(!alarm.on_tick(clock(15, 0, 0)));
    }

    #[test]
    fn cancel_is_inert_while_idle_or_firing() {
        let mut alarm = Alarm::new();
        assert!(!alarm.cancel());
        alarm.arm(15, 0, clock(14, 0, 0)).unwrap();
        alarm.on_tick(clock(15, 0, 0));
        assert!(!alarm.cancel());
        assert_eq!(alarm.state(), AlertState::Firing);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut alarm = Alarm::new();
        alarm.arm(15, 0, clock(14, 0, 0)).unwrap();
        alarm.on_tick(clock(15, 0, 0));
        assert!(alarm.stop());
        assert_eq!(alarm.state(), AlertState::Idle);
        assert!(!alarm.stop());
        assert_eq!(alarm.state(), AlertState::Idle);
    }

    #[test]
    fn arm_while_firing_is_rejected() {
        let mut alarm = Alarm::new();
        alarm.arm(15, 0, clock(14, 0, 0)).unwrap();
        alarm.on_tick(clock(15, 0, 0));
        assert_eq!(
            alarm.arm(16, 0, clock(15, 0, 5)),
            Err(AlarmError::AlarmSounding)
        );
        // the sounding alarm is untouched
        assert_eq!(alarm.state(), AlertState::Firing);
        assert_eq!(alarm.target(), Some(clock(15, 0, 0)));
    }

    #[test]
    fn rearming_replaces_the_target() {
        let mut alarm = Alarm::new();
        alarm.arm(15, 0, clock(14, 0, 0)).unwrap();
        alarm.arm(16, 30, clock(14, 0, 1)).unwrap();
        assert_eq!(alarm.target(), Some(clock(16, 30, 0)));
        assert!(!alarm.on_tick(clock(15, 0, 0)));
        assert!(alarm.on_tick(clock(16, 30, 0)));
    }

    #[test]
    fn out_of_range_time_is_rejected() {
        let mut alarm = Alarm::new();
        assert_eq!(
            alarm.arm(24, 0, clock(14, 0, 0)),
            Err(AlarmError::InvalidTime {
                hour: 24,
                minute: 0
            })
        );
        assert_eq!(
            alarm.arm(7, 60, clock(14, 0, 0)),
            Err(AlarmError::InvalidTime {
                hour: 7,
                minute: 60
            })
        );
        assert_eq!(alarm.state(), AlertState::Idle);
    }

    #[test]
    fn stop_leaves_the_alarm_ready_to_rearm() {
        let mut alarm = Alarm::new();
        alarm.arm(15, 0, clock(14, 0, 0)).unwrap();
        alarm.on_tick(clock(15, 0, 0));
        alarm.stop();
        assert_eq!(alarm.target(), None);
        alarm.arm(15, 5, clock(15, 0, 30)).unwrap();
        assert!(alarm.on_tick(clock(15, 5, 0)));
    }
}
