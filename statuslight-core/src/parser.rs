//! Build result parser
//!
//! Extracts the `"result"` field from a job server response without a full
//! JSON parser. The job server is asked for `?tree=result`, so the document
//! is tiny and fixed in shape; locating the first `"result":"` marker and
//! reading up to the next quote is enough.
//!
//! The parser runs on unauthenticated network input. It never panics, never
//! allocates more than the candidate status text, and reports every failure
//! as [`JobStatus::Unknown`].

use thiserror::Error;
use tracing::debug;

use crate::domain::status::JobStatus;

/// Literal sequence that introduces the build result
///
/// No whitespace is tolerated between the key, the colon and the opening
/// quote: `"result": "SUCCESS"` does not match.
pub const STATUS_MARKER: &[u8] = br#""result":""#;

/// Reasons a response could not be classified
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("status marker not found")]
    MarkerNotFound,

    #[error("status value is not terminated")]
    UnterminatedValue,

    #[error("unrecognized status text '{0}'")]
    UnrecognizedStatusText(String),
}

/// Classify a response body
///
/// Total function: any body that does not carry one of the known results
/// yields [`JobStatus::Unknown`].
///
/// # Example
/// ```
/// use statuslight_core::{JobStatus, parse_status};
///
/// assert_eq!(parse_status(br#"{"result":"SUCCESS"}"#), JobStatus::Success);
/// assert_eq!(parse_status(br#"{"building":true}"#), JobStatus::Unknown);
/// ```
pub fn parse_status(body: &[u8]) -> JobStatus {
    match extract_status(body) {
        Ok(status) => status,
        Err(e) => {
            debug!("Classified response as unknown: {}", e);
            JobStatus::Unknown
        }
    }
}

/// Classify a response body, keeping the reason for failures
pub fn extract_status(body: &[u8]) -> Result<JobStatus, ParseError> {
    let start = find(body, STATUS_MARKER).ok_or(ParseError::MarkerNotFound)? + STATUS_MARKER.len();
    let rest = &body[start..];

    let len = rest
        .iter()
        .position(|&b| b == b'"')
        .ok_or(ParseError::UnterminatedValue)?;
    let candidate = &rest[..len];

    std::str::from_utf8(candidate)
        .ok()
        .and_then(JobStatus::from_token)
        .ok_or_else(|| {
            ParseError::UnrecognizedStatusText(String::from_utf8_lossy(candidate).into_owned())
        })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
