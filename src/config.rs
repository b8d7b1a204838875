use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "ClinicHistory";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Roster pagination: default and hard cap on `per_page`.
/// The cap also bounds the size of every batched `IN (...)` clause.
pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

/// Encounter defaults applied when the source row leaves them empty.
pub const DEFAULT_DURATION_MINUTES: u32 = 30;
pub const DEFAULT_APPOINTMENT_STATUS: &str = "scheduled";
pub const DEFAULT_CONSULTATION_STATUS: &str = "completed";
pub const DEFAULT_PRESCRIPTION_STATUS: &str = "active";

/// Display name used when the doctor directory has no entry (or is down).
pub const UNKNOWN_DOCTOR_NAME: &str = "Médico não identificado";

const DB_ENV: &str = "CLINIC_HISTORY_DB";
const ADDR_ENV: &str = "CLINIC_HISTORY_ADDR";
const DEFAULT_ADDR: &str = "127.0.0.1:8088";

/// Default `EnvFilter` directive when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "clinic_history_lib=info,clinic_history=info,tower_http=warn"
}

/// Get the application data directory
/// ~/ClinicHistory/ on all platforms. Falls back to the working
/// directory when no home directory can be determined.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default database file location.
pub fn default_database_path() -> PathBuf {
    app_data_dir().join("clinic.db")
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid bind address in {var}: {value}")]
    InvalidAddress { var: &'static str, value: String },
}

/// Runtime settings for the HTTP service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub database_path: PathBuf,
    pub bind_addr: SocketAddr,
}

impl ServiceConfig {
    /// Read settings from the environment, applying defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_path = lookup(DB_ENV)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let raw_addr = lookup(ADDR_ENV).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let bind_addr = raw_addr
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidAddress {
                var: ADDR_ENV,
                value: raw_addr.clone(),
            })?;

        Ok(Self {
            database_path,
            bind_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn app_data_dir_ends_with_app_name() {
        assert!(app_data_dir().ends_with(APP_NAME));
    }

    #[test]
    fn database_path_under_app_data() {
        let path = default_database_path();
        assert!(path.starts_with(app_data_dir()));
        assert!(path.ends_with("clinic.db"));
    }

    #[test]
    fn defaults_apply_when_env_empty() {
        let cfg = ServiceConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), DEFAULT_ADDR);
        assert_eq!(cfg.database_path, default_database_path());
    }

    #[test]
    fn env_overrides_are_used() {
        let cfg = ServiceConfig::from_lookup(lookup_from(&[
            (DB_ENV, "/tmp/test.db"),
            (ADDR_ENV, "0.0.0.0:9000"),
        ]))
        .unwrap();
        assert_eq!(cfg.database_path, PathBuf::from("/tmp/test.db"));
        assert_eq!(cfg.bind_addr.port(), 9000);
    }

    #[test]
    fn invalid_address_is_rejected() {
        let err = ServiceConfig::from_lookup(lookup_from(&[(ADDR_ENV, "not-an-addr")]))
            .unwrap_err();
        assert!(err.to_string().contains("not-an-addr"));
    }

    #[test]
    fn per_page_cap_is_above_default() {
        assert!(MAX_PER_PAGE >= DEFAULT_PER_PAGE);
    }
}
