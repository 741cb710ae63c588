//! Core domain types
//!
//! Shared between the transport client (which builds requests from the
//! configuration) and the device (which owns configuration and status).

pub mod config;
pub mod status;
