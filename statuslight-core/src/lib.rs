//! Status Light Core
//!
//! Core types for the status light device.
//!
//! This crate contains:
//! - Domain types: job status and poll configuration
//! - Parser: extracts the build result from a job server response
//! - DTOs: request parameters accepted by the device front end

pub mod domain;
pub mod dto;
pub mod parser;

pub use domain::config::{ConfigError, PollConfig};
pub use domain::status::JobStatus;
pub use parser::parse_status;
