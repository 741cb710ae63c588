//! Scheduler layer for the device
//!
//! Ticks the poll controller periodically and whenever a configuration
//! change asks for an immediate refresh.

pub mod poller;

pub use poller::StatusPoller;
