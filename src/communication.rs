use crate::alarm::AlertState;
use crate::ticker::ClockTime;

/// emitted by the engine on every alert state change, so a shell knows
/// when to show or hide its alarm dialog and notification banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    /// an alarm was set (or replaced) for the given target
    Armed(ClockTime),
    /// the armed alarm was dropped before it fired
    Cancelled,
    /// a tick matched the target at the given time, the alert is active
    Firing(ClockTime),
    /// the sounding alarm was silenced
    Stopped,
}

impl StateChange {
    /// the state the engine is in after this change
    #[must_use]
    pub const fn state(&self) -> AlertState {
        match self {
            Self::Armed(_) => AlertState::Armed,
            Self::Firing(_) => AlertState::Firing,
            Self::Cancelled | Self::Stopped => AlertState::Idle,
        }
    }
}
