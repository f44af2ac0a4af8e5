//! Application settings loaded via OrthoConfig.
//!
//! Values come from command-line flags, `CAMPUS_*` environment variables and
//! configuration files, in that order of precedence.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use ortho_config::OrthoConfig;
use serde::Deserialize;

/// Server, persistence and admin provisioning settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CAMPUS")]
pub struct AppSettings {
    /// Address to bind; defaults to all interfaces.
    pub host: Option<IpAddr>,
    /// Port to bind.
    #[ortho_config(default = 8080)]
    pub port: u16,
    /// PostgreSQL URL. Without one the service runs on the in-memory store.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    #[ortho_config(default = 10)]
    pub db_pool_size: u32,
    /// Administrator account ensured at startup.
    pub admin_username: Option<String>,
    /// Password for [`AppSettings::admin_username`].
    pub admin_password: Option<String>,
}

impl AppSettings {
    /// Socket address the HTTP server binds to.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(
            self.host.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            self.port,
        )
    }

    /// Admin username and password when both are configured.
    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        match (&self.admin_username, &self.admin_password) {
            (Some(username), Some(password)) => Some((username.as_str(), password.as_str())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings loading.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "CAMPUS_HOST",
        "CAMPUS_PORT",
        "CAMPUS_DATABASE_URL",
        "CAMPUS_DB_POOL_SIZE",
        "CAMPUS_ADMIN_USERNAME",
        "CAMPUS_ADMIN_PASSWORD",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("campus")])
            .unwrap_or_else(|err| panic!("config should load: {err}"))
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "0.0.0.0:8080".parse().expect("addr"));
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.db_pool_size, 10);
        assert!(settings.database_url.is_none());
        assert!(settings.admin_credentials().is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("CAMPUS_HOST", Some("127.0.0.1".to_owned())),
            ("CAMPUS_PORT", Some("9090".to_owned())),
            (
                "CAMPUS_DATABASE_URL",
                Some("postgres://localhost/campus".to_owned()),
            ),
            ("CAMPUS_DB_POOL_SIZE", Some("4".to_owned())),
            ("CAMPUS_ADMIN_USERNAME", Some("registrar".to_owned())),
            ("CAMPUS_ADMIN_PASSWORD", Some("correct-horse".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "127.0.0.1:9090".parse().expect("addr"));
        assert_eq!(settings.db_pool_size, 4);
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://localhost/campus")
        );
        assert_eq!(
            settings.admin_credentials(),
            Some(("registrar", "correct-horse"))
        );
    }

    #[rstest]
    fn admin_credentials_need_both_halves() {
        let _guard = lock_env([
            ("CAMPUS_ADMIN_USERNAME", Some("registrar".to_owned())),
            ("CAMPUS_ADMIN_PASSWORD", None::<String>),
        ]);

        assert!(load_from_empty_args().admin_credentials().is_none());
    }
}
