//! # Settings
//!
//! User-adjustable values for `passenger-conf`, read from an optional YAML
//! file and overridden by command-line flags. Every field has a default, so
//! an empty file (or no file at all) is valid:
//!
//! ```yaml
//! domain: .dev
//! hosts_file: /etc/hosts
//! ip: 127.0.0.1
//! listen: "*:80"
//! rails_env: development
//! httpd_command: httpd
//! permission_command: [sudo, -u, "{user}", ls, "{dir}"]
//! version_command: [passenger-config, --version]
//! reload_command: [apachectl, graceful]
//! ```
//!
//! `conf` and `server_root` may also be set; when both are known the web
//! server binary is never queried.
//!
//! The settings file is looked up in this order: the `--settings` flag (or
//! `PASSENGER_CONF_SETTINGS`), then `settings.yaml` in the platform config
//! directory (`~/.config/passenger-conf` on Linux).

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Settings for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Domain suffix for application host names, always with one leading dot.
    pub domain: String,
    /// The host-alias file.
    pub hosts_file: PathBuf,
    /// Address written into new host-alias entries.
    pub ip: String,
    /// Address for `NameVirtualHost` and `<VirtualHost>` when none is configured.
    pub listen: String,
    /// Value for a synthesized `RailsEnv` line.
    pub rails_env: String,
    /// Web server binary queried with `-V` for its compiled-in defaults.
    pub httpd_command: String,
    /// Command that succeeds when `{user}` can read `{dir}`.
    pub permission_command: Vec<String>,
    /// Command printing the installed Passenger version. Empty to skip.
    pub version_command: Vec<String>,
    /// Command run after a successful change. Empty to skip.
    pub reload_command: Vec<String>,
    /// Root Apache config file.
    pub conf: Option<PathBuf>,
    /// Base for relative paths in the Apache config.
    pub server_root: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            domain: ".dev".to_string(),
            hosts_file: PathBuf::from("/etc/hosts"),
            ip: "127.0.0.1".to_string(),
            listen: "*:80".to_string(),
            rails_env: env::var("RAILS_ENV")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "development".to_string()),
            httpd_command: "httpd".to_string(),
            permission_command: to_strings(&["sudo", "-u", "{user}", "ls", "{dir}"]),
            version_command: to_strings(&["passenger-config", "--version"]),
            reload_command: to_strings(&["apachectl", "graceful"]),
            conf: None,
            server_root: None,
        }
    }
}

impl Settings {
    /// Parse settings from YAML text. The domain is normalized.
    pub fn parse(yaml: &str) -> Result<Self> {
        let mut settings: Settings = if yaml.trim().is_empty() {
            Settings::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        settings.domain = normalize_domain(&settings.domain)?;
        Ok(settings)
    }

    /// Read settings from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml = fs::read_to_string(path).map_err(|e| Error::ConfigParse {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;
        Self::parse(&yaml)
    }

    /// Load from `explicit` if given, else from the default location if a
    /// file exists there, else the built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match default_settings_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// The host name for an application.
    pub fn host_for(&self, app: &str) -> String {
        format!("{}{}", app, self.domain)
    }
}

/// Returns the default settings file location, if the platform has a config
/// directory.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("passenger-conf").join("settings.yaml"))
}

/// Reduce any number of leading dots to exactly one: `dev`, `.dev` and
/// `..dev` all become `.dev`.
pub fn normalize_domain(domain: &str) -> Result<String> {
    let bare = domain.trim().trim_start_matches('.');
    if bare.is_empty() || bare.chars().any(char::is_whitespace) {
        return Err(Error::ConfigParse {
            message: format!("Invalid domain suffix: {:?}", domain),
        });
    }
    Ok(format!(".{}", bare.to_lowercase()))
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.domain, ".dev");
        assert_eq!(settings.hosts_file, PathBuf::from("/etc/hosts"));
        assert_eq!(settings.ip, "127.0.0.1");
        assert_eq!(settings.listen, "*:80");
        assert_eq!(settings.reload_command, vec!["apachectl", "graceful"]);
        assert!(settings.conf.is_none());
    }

    #[test]
    fn test_parse_partial_file_keeps_defaults() {
        let settings = Settings::parse("domain: local\nip: 10.0.0.2\n").unwrap();
        assert_eq!(settings.domain, ".local");
        assert_eq!(settings.ip, "10.0.0.2");
        assert_eq!(settings.hosts_file, PathBuf::from("/etc/hosts"));
    }

    #[test]
    fn test_parse_empty_is_default() {
        let settings = Settings::parse("").unwrap();
        assert_eq!(settings.domain, ".dev");
    }

    #[test]
    fn test_parse_rejects_unknown_fields() {
        let result = Settings::parse("domian: .dev\n");
        assert!(matches!(result, Err(Error::Yaml(_))));
    }

    #[test]
    fn test_parse_command_lists() {
        let settings = Settings::parse(
            "reload_command: []\nversion_command: [echo, \"2.2.0\"]\nconf: /etc/httpd/httpd.conf\n",
        )
        .unwrap();
        assert!(settings.reload_command.is_empty());
        assert_eq!(settings.version_command, vec!["echo", "2.2.0"]);
        assert_eq!(settings.conf, Some(PathBuf::from("/etc/httpd/httpd.conf")));
    }

    #[test]
    fn test_from_file_missing() {
        let err = Settings::from_file(Path::new("/nonexistent/settings.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn test_load_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.yaml");
        fs::write(&path, "hosts_file: /tmp/hosts\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.hosts_file, PathBuf::from("/tmp/hosts"));
    }

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain("dev").unwrap(), ".dev");
        assert_eq!(normalize_domain(".dev").unwrap(), ".dev");
        assert_eq!(normalize_domain("...Test").unwrap(), ".test");
        assert!(normalize_domain("..").is_err());
        assert!(normalize_domain("my domain").is_err());
    }

    #[test]
    fn test_host_for() {
        let settings = Settings::default();
        assert_eq!(settings.host_for("blog"), "blog.dev");
    }

    #[test]
    fn test_default_settings_path_name() {
        if let Some(path) = default_settings_path() {
            assert!(path.ends_with("passenger-conf/settings.yaml"));
        }
    }
}
