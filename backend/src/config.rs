//! Server configuration, read once from the environment at startup.
//!
//! | variable                 | default             |
//! |--------------------------|---------------------|
//! | `WELCOMETO_HOST`         | `127.0.0.1`         |
//! | `WELCOMETO_PORT`         | `8080`              |
//! | `WELCOMETO_DB`           | `welcometo.sqlite`  |
//! | `WELCOMETO_UPLOAD_DIR`   | `uploads`           |
//! | `WELCOMETO_HOSTS`        | none                |
//! | `WELCOMETO_OPEN_BROWSER` | `true`              |
//!
//! `WELCOMETO_HOSTS` is a comma separated list of `email:password` pairs.
//! Without it the server still starts, but nobody can sign in.

use std::path::PathBuf;

use log::warn;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DB: &str = "welcometo.sqlite";
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// A host allowed to sign in and edit guides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostAccount {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub upload_dir: PathBuf,
    pub hosts: Vec<HostAccount>,
    pub open_browser: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match value("WELCOMETO_PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("WELCOMETO_PORT `{}` is not a port number, using {}", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let open_browser = value("WELCOMETO_OPEN_BROWSER")
            .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
            .unwrap_or(true);

        Config {
            host: value("WELCOMETO_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            db_path: PathBuf::from(value("WELCOMETO_DB").unwrap_or_else(|| DEFAULT_DB.to_string())),
            upload_dir: PathBuf::from(
                value("WELCOMETO_UPLOAD_DIR").unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string()),
            ),
            hosts: value("WELCOMETO_HOSTS").map(|raw| parse_hosts(&raw)).unwrap_or_default(),
            open_browser,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Parses `a@x.com:secret,b@y.com:other`. Malformed entries are skipped.
pub fn parse_hosts(raw: &str) -> Vec<HostAccount> {
    raw.split(',')
        .filter_map(|entry| {
            let entry = entry.trim();
            if entry.is_empty() {
                return None;
            }
            match entry.split_once(':') {
                Some((email, password)) if !email.trim().is_empty() && !password.is_empty() => {
                    Some(HostAccount {
                        email: email.trim().to_lowercase(),
                        password: password.to_string(),
                    })
                }
                _ => {
                    warn!("ignoring malformed WELCOMETO_HOSTS entry");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB));
        assert_eq!(config.upload_dir, PathBuf::from(DEFAULT_UPLOAD_DIR));
        assert!(config.hosts.is_empty());
        assert!(config.open_browser);
        assert_eq!(config.url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("WELCOMETO_PORT", "9000"),
            ("WELCOMETO_OPEN_BROWSER", "false"),
            ("WELCOMETO_HOSTS", "Host@Example.com:pw, other@example.com:a:b"),
        ]);
        assert_eq!(config.port, 9000);
        assert!(!config.open_browser);
        assert_eq!(
            config.hosts,
            vec![
                HostAccount {
                    email: "host@example.com".into(),
                    password: "pw".into()
                },
                HostAccount {
                    email: "other@example.com".into(),
                    password: "a:b".into()
                },
            ]
        );
    }

    #[test]
    fn bad_port_falls_back() {
        assert_eq!(config_from(&[("WELCOMETO_PORT", "eighty")]).port, DEFAULT_PORT);
    }

    #[test]
    fn malformed_hosts_are_skipped() {
        assert_eq!(parse_hosts("nocolon, :pw, a@b.c:, ok@b.c:x").len(), 1);
    }
}
