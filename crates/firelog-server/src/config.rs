use anyhow::{Context, Result};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CLEANUP_SECS: u64 = 60;

pub struct Config {
    pub port: u16,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub supabase_service_role_key: Option<String>,
    pub database_url: Option<String>,
    /// Honour `X-Forwarded-For` when resolving the client IP. Only safe
    /// behind a reverse proxy that overwrites the header.
    pub trust_proxy: bool,
    /// Interval of the background rate-limiter sweep.
    pub rate_limit_cleanup_secs: u64,
}

/// Settings needed to talk to the hosted auth service and database.
pub struct BackendConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,
    pub database_url: String,
}

// Custom Debug masks secrets so the struct is safe to log.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("supabase_url", &self.supabase_url)
            .field(
                "supabase_anon_key",
                &self.supabase_anon_key.as_deref().map(|_| "<redacted>"),
            )
            .field(
                "supabase_service_role_key",
                &self
                    .supabase_service_role_key
                    .as_deref()
                    .map(|_| "<redacted>"),
            )
            .field(
                "database_url",
                &self.database_url.as_deref().map(|_| "<redacted>"),
            )
            .field("trust_proxy", &self.trust_proxy)
            .field("rate_limit_cleanup_secs", &self.rate_limit_cleanup_secs)
            .finish()
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("supabase_url", &self.supabase_url)
            .field("supabase_anon_key", &"<redacted>")
            .field("supabase_service_role_key", &"<redacted>")
            .field("database_url", &"<redacted>")
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Self {
        // Warn when PORT is set but invalid so misconfiguration is visible.
        let port = std::env::var("PORT")
            .ok()
            .map_or(DEFAULT_PORT, |s| match s.parse::<u16>() {
                Ok(port) if port != 0 => port,
                _ => {
                    tracing::warn!(
                        "PORT env var {s:?} is not a valid port number (1-65535), defaulting to {DEFAULT_PORT}"
                    );
                    DEFAULT_PORT
                }
            });
        let trust_proxy = std::env::var("TRUST_PROXY")
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);
        let rate_limit_cleanup_secs = std::env::var("RATE_LIMIT_CLEANUP_SECS")
            .ok()
            .map_or(DEFAULT_CLEANUP_SECS, |s| match s.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    tracing::warn!(
                        "RATE_LIMIT_CLEANUP_SECS {s:?} is not a positive integer, defaulting to {DEFAULT_CLEANUP_SECS}"
                    );
                    DEFAULT_CLEANUP_SECS
                }
            });
        Self {
            port,
            supabase_url: non_empty_var("SUPABASE_URL"),
            supabase_anon_key: non_empty_var("SUPABASE_ANON_KEY"),
            supabase_service_role_key: non_empty_var("SUPABASE_SERVICE_ROLE_KEY"),
            database_url: non_empty_var("DATABASE_URL"),
            trust_proxy,
            rate_limit_cleanup_secs,
        }
    }

    /// The settings required for a production backend.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first missing variable.
    pub fn backend(&self) -> Result<BackendConfig> {
        Ok(BackendConfig {
            supabase_url: required(self.supabase_url.as_ref(), "SUPABASE_URL")?,
            supabase_anon_key: required(self.supabase_anon_key.as_ref(), "SUPABASE_ANON_KEY")?,
            supabase_service_role_key: required(
                self.supabase_service_role_key.as_ref(),
                "SUPABASE_SERVICE_ROLE_KEY",
            )?,
            database_url: required(self.database_url.as_ref(), "DATABASE_URL")?,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn required(value: Option<&String>, name: &str) -> Result<String> {
    value
        .cloned()
        .with_context(|| format!("missing required environment variable {name}"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use std::sync::Mutex;

    // Serialize env-mutating tests to avoid races between parallel test threads.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const BACKEND_VARS: [&str; 4] = [
        "SUPABASE_URL",
        "SUPABASE_ANON_KEY",
        "SUPABASE_SERVICE_ROLE_KEY",
        "DATABASE_URL",
    ];

    fn clear_backend_vars() {
        for var in BACKEND_VARS {
            // SAFETY: callers hold ENV_LOCK
            unsafe { std::env::remove_var(var) };
        }
    }

    fn set_backend_vars() {
        // SAFETY: callers hold ENV_LOCK
        unsafe {
            std::env::set_var("SUPABASE_URL", "https://abc.supabase.co");
            std::env::set_var("SUPABASE_ANON_KEY", "anon-key");
            std::env::set_var("SUPABASE_SERVICE_ROLE_KEY", "service-key");
            std::env::set_var("DATABASE_URL", "postgres://localhost/firelog");
        }
    }

    #[test]
    fn defaults_to_port_8080() {
        let _g = ENV_LOCK
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // SAFETY: protected by ENV_LOCK; no concurrent env mutations
        unsafe { std::env::remove_var("PORT") };
        let cfg = Config::from_env();
        assert_eq!(cfg.port, 8080);
    }

    #[test]
    fn reads_port_from_env() {
        let _g = ENV_LOCK
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // SAFETY: protected by ENV_LOCK; no concurrent env mutations
        unsafe { std::env::set_var("PORT", "9090") };
        let cfg = Config::from_env();
        unsafe { std::env::remove_var("PORT") };
        assert_eq!(cfg.port, 9090);
    }

    #[test]
    fn invalid_port_falls_back_to_default() {
        let _g = ENV_LOCK
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // SAFETY: protected by ENV_LOCK; no concurrent env mutations
        unsafe { std::env::set_var("PORT", "0") };
        let cfg = Config::from_env();
        unsafe { std::env::remove_var("PORT") };
        assert_eq!(cfg.port, 8080);
    }

    #[test]
    fn trust_proxy_and_cleanup_interval() {
        let _g = ENV_LOCK
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // SAFETY: protected by ENV_LOCK; no concurrent env mutations
        unsafe {
            std::env::set_var("TRUST_PROXY", "TRUE");
            std::env::set_var("RATE_LIMIT_CLEANUP_SECS", "15");
        }
        let cfg = Config::from_env();
        unsafe {
            std::env::remove_var("TRUST_PROXY");
            std::env::set_var("RATE_LIMIT_CLEANUP_SECS", "nope");
        }
        let fallback = Config::from_env();
        unsafe { std::env::remove_var("RATE_LIMIT_CLEANUP_SECS") };

        assert!(cfg.trust_proxy);
        assert_eq!(cfg.rate_limit_cleanup_secs, 15);
        assert!(!fallback.trust_proxy);
        assert_eq!(fallback.rate_limit_cleanup_secs, 60);
    }

    #[test]
    fn backend_reports_first_missing_variable() {
        let _g = ENV_LOCK
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        clear_backend_vars();
        // SAFETY: protected by ENV_LOCK; no concurrent env mutations
        unsafe { std::env::set_var("SUPABASE_URL", "https://abc.supabase.co") };
        let cfg = Config::from_env();
        clear_backend_vars();

        let err = cfg.backend().unwrap_err().to_string();
        assert!(err.contains("SUPABASE_ANON_KEY"), "got: {err}");
    }

    #[test]
    fn empty_values_count_as_missing() {
        let _g = ENV_LOCK
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        set_backend_vars();
        // SAFETY: protected by ENV_LOCK; no concurrent env mutations
        unsafe { std::env::set_var("DATABASE_URL", "  ") };
        let cfg = Config::from_env();
        clear_backend_vars();

        let err = cfg.backend().unwrap_err().to_string();
        assert!(err.contains("DATABASE_URL"), "got: {err}");
    }

    #[test]
    fn backend_succeeds_when_all_present() {
        let _g = ENV_LOCK
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        set_backend_vars();
        let cfg = Config::from_env();
        clear_backend_vars();

        let backend = cfg.backend().unwrap();
        assert_eq!(backend.supabase_url, "https://abc.supabase.co");
        assert_eq!(backend.database_url, "postgres://localhost/firelog");
    }

    #[test]
    fn debug_redacts_secrets() {
        let _g = ENV_LOCK
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        set_backend_vars();
        let cfg = Config::from_env();
        clear_backend_vars();

        let debug = format!("{cfg:?}");
        assert!(!debug.contains("anon-key"));
        assert!(!debug.contains("service-key"));
        assert!(!debug.contains("postgres://"));
        assert!(debug.contains("<redacted>"));

        let backend = format!("{:?}", cfg.backend().unwrap());
        assert!(!backend.contains("service-key"));
    }
}
