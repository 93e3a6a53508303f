#![warn(clippy::pedantic, clippy::nursery, clippy::cargo)]
#![deny(clippy::use_self, rust_2018_idioms)]
#![allow(clippy::multiple_crate_versions, clippy::module_name_repetitions)]

//! desk clock core: alarm scheduling and alert delivery.
//!
//! the engine samples the wall clock once a second, fires a one-shot alarm
//! when a tick matches the armed target, and drives a repeating audio tone
//! that degrades to visual-only when no output device is available.
//! rendering is left to whatever shell sits on top of [`ClockEngine`]
//! (`main.rs` ships a minimal terminal one).

pub mod alarm;
pub mod audio;
pub mod communication;
pub mod config;
pub mod engine;
pub mod ticker;

pub use alarm::{Alarm, AlarmError, AlertState};
pub use audio::{AlertDriver, AudioStatus};
pub use communication::StateChange;
pub use config::{Config, ToneConfig};
pub use engine::{AlarmSnapshot, ClockEngine};
pub use ticker::{ClockTime, Ticker, TICK_PERIOD};
