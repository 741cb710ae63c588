//! Configuration DTOs
//!
//! Query parameters submitted by the configuration form.

use serde::{Deserialize, Serialize};

use crate::domain::config::{self, PollConfig};

/// Parameters accepted by the configuration page
///
/// Every field is optional: parameters that are absent keep their current
/// value. Field names match the form inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigureParams {
    pub host: Option<String>,
    pub jobname: Option<String>,
    pub updateinterval: Option<String>,
}

impl ConfigureParams {
    /// True when the request carried no configuration at all
    pub fn is_empty(&self) -> bool {
        self.host.is_none() && self.jobname.is_none() && self.updateinterval.is_none()
    }

    /// Merge these parameters over the current configuration
    ///
    /// # Returns
    /// `Ok(None)` when there is nothing to change, `Ok(Some(config))` with
    /// the complete validated replacement otherwise
    ///
    /// # Errors
    /// Returns the first validation failure; the current configuration is
    /// never partially modified.
    pub fn apply(&self, current: &PollConfig) -> config::Result<Option<PollConfig>> {
        if self.is_empty() {
            return Ok(None);
        }

        let host = self.host.as_deref().unwrap_or(current.host());
        let job_name = self.jobname.as_deref().unwrap_or(current.job_name());
        let interval_secs = match self.updateinterval.as_deref() {
            Some(raw) => config::parse_interval(raw)?,
            None => current.interval_secs(),
        };

        PollConfig::new(host, job_name, interval_secs).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::ConfigError;

    fn current() -> PollConfig {
        PollConfig::new("h1", "j1", 30).unwrap()
    }

    #[test]
    fn test_empty_params_change_nothing() {
        let params = ConfigureParams::default();
        assert!(params.is_empty());
        assert_eq!(params.apply(&current()), Ok(None));
    }

    #[test]
    fn test_full_replacement() {
        let params = ConfigureParams {
            host: Some("h2".to_string()),
            jobname: Some("j2".to_string()),
            updateinterval: Some("60".to_string()),
        };
        assert_eq!(
            params.apply(&current()),
            Ok(Some(PollConfig::new("h2", "j2", 60).unwrap()))
        );
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let params = ConfigureParams {
            jobname: Some("j2".to_string()),
            ..Default::default()
        };
        assert_eq!(
            params.apply(&current()),
            Ok(Some(PollConfig::new("h1", "j2", 30).unwrap()))
        );
    }

    #[test]
    fn test_invalid_interval_rejected() {
        let params = ConfigureParams {
            host: Some("h2".to_string()),
            updateinterval: Some("soon".to_string()),
            ..Default::default()
        };
        assert_eq!(
            params.apply(&current()),
            Err(ConfigError::InvalidInterval("soon".to_string()))
        );
    }

    #[test]
    fn test_invalid_host_rejected() {
        let params = ConfigureParams {
            host: Some("<script>".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            params.apply(&current()),
            Err(ConfigError::InvalidHost(_))
        ));
    }
}
