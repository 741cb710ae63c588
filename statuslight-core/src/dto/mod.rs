//! Data Transfer Objects
//!
//! Lightweight representations of what the device front end receives from
//! browsers, before validation into domain types.

pub mod config;
