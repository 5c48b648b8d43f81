//! Voice capture: recorder process control and level metering.

pub mod capture;
pub mod meter;
