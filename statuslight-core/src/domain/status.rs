//! Job status domain type

use serde::{Deserialize, Serialize};

/// Text shown for a job whose result could not be determined
pub const UNKNOWN_TEXT: &str = "UNKNOWN";

/// Build result of the watched job, as last classified by the parser
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Unknown,
    Success,
    Unstable,
    Failed,
}

impl JobStatus {
    /// All statuses the job server can report, paired with their wire token
    const KNOWN: [(&'static str, JobStatus); 3] = [
        ("SUCCESS", JobStatus::Success),
        ("UNSTABLE", JobStatus::Unstable),
        ("FAILURE", JobStatus::Failed),
    ];

    /// Maps a result token from the job server to a status
    ///
    /// Matching is exact and case-sensitive. Returns `None` for anything
    /// that is not one of the three known tokens.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::KNOWN
            .iter()
            .find(|(known, _)| *known == token)
            .map(|(_, status)| *status)
    }

    /// Display text for this status
    ///
    /// This is the literal token received from the job server for known
    /// statuses and [`UNKNOWN_TEXT`] otherwise.
    pub fn as_text(&self) -> &'static str {
        match self {
            JobStatus::Unknown => UNKNOWN_TEXT,
            JobStatus::Success => "SUCCESS",
            JobStatus::Unstable => "UNSTABLE",
            JobStatus::Failed => "FAILURE",
        }
    }

    /// CSS colour used when rendering the status
    pub fn color(&self) -> &'static str {
        match self {
            JobStatus::Unknown => "black",
            JobStatus::Success => "green",
            JobStatus::Unstable => "orange",
            JobStatus::Failed => "red",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_text())
    }
}
