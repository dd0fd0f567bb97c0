use crate::core::{OrmError, Result};

/// Mapping-layer configuration
///
/// Holds the settings that are not part of any single entity declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Log every executed statement at info level instead of debug
    pub log_statements: bool,

    /// Timestamp bookkeeping for schemas that do not choose explicitly
    pub default_timestamps: bool,

    /// Reject names that are not plain identifiers instead of quoting them
    pub strict_identifiers: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_statements: false,
            default_timestamps: true,
            strict_identifiers: true,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_statements(mut self, enabled: bool) -> Self {
        self.log_statements = enabled;
        self
    }

    pub fn default_timestamps(mut self, enabled: bool) -> Self {
        self.default_timestamps = enabled;
        self
    }

    pub fn strict_identifiers(mut self, enabled: bool) -> Self {
        self.strict_identifiers = enabled;
        self
    }

    /// Parse from a connection-style string
    ///
    /// Format: "activerow://host/database?timestamps=false&log=true&strict=true"
    ///
    /// Host and database are accepted for symmetry with driver URLs and ignored;
    /// the connector owns the connection itself.
    pub fn from_url(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("activerow://")
            .ok_or_else(|| OrmError::Config("URL must start with 'activerow://'".to_string()))?;

        let mut config = Self::default();
        let Some((_, query)) = rest.split_once('?') else {
            return Ok(config);
        };

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| OrmError::Config(format!("Missing value for '{}'", pair)))?;
            let flag = parse_flag(key, value)?;
            match key {
                "timestamps" => config.default_timestamps = flag,
                "log" => config.log_statements = flag,
                "strict" => config.strict_identifiers = flag,
                other => return Err(OrmError::Config(format!("Unknown option '{}'", other))),
            }
        }

        Ok(config)
    }

    /// Convert to connection-style string
    pub fn to_url(&self) -> String {
        format!(
            "activerow://localhost/default?timestamps={}&log={}&strict={}",
            self.default_timestamps, self.log_statements, self.strict_identifiers
        )
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(OrmError::Config(format!(
            "Option '{}' expects a boolean, got '{}'",
            key, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert!(config.default_timestamps);
        assert!(!config.log_statements);
        assert!(config.strict_identifiers);
    }

    #[test]
    fn test_from_url() {
        let config = Config::from_url("activerow://db.local/app?timestamps=off&log=1").unwrap();
        assert!(!config.default_timestamps);
        assert!(config.log_statements);

        let round = Config::from_url(&config.to_url()).unwrap();
        assert_eq!(round, config);
    }

    #[test]
    fn test_from_url_rejects_garbage() {
        assert!(Config::from_url("mysql://x/y").is_err());
        assert!(Config::from_url("activerow://x/y?timestamps=maybe").is_err());
        assert!(Config::from_url("activerow://x/y?pool=4").is_err());
    }
}
