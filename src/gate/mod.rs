//! Windowed admission control.

mod admission;
mod counter;
mod window;

pub use admission::{AdmissionGate, GateStats};
pub use window::{TimeUnit, TimeWindow};
