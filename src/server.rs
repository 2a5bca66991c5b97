//! # Web Server Collaborator
//!
//! Everything that needs a process outside this tool lives here, behind the
//! `ServerControl` trait so the rest of the crate can be exercised without a
//! real Apache or Passenger install:
//!
//! - **`ServerInfo`**: The compiled-in `HTTPD_ROOT` and `SERVER_CONFIG_FILE`
//!   reported by `httpd -V`, queried once and kept.
//! - **`ServerControl`**: Permission check, installed Passenger version, and
//!   reload after a change.
//! - **`HttpdServer`**: The implementation that runs the commands configured
//!   in `Settings`.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use log::{debug, info};
use regex::Regex;
use semver::Version;

use crate::error::{Error, Result};
use crate::settings::Settings;
use crate::validate::lenient_version;

/// Compiled-in defaults of the web server binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub httpd_root: PathBuf,
    /// Root config file, already resolved against `httpd_root`.
    pub config_file: PathBuf,
}

impl ServerInfo {
    /// Run `<httpd_command> -V` and parse its output.
    pub fn query(httpd_command: &str) -> Result<Self> {
        let output = run(&[httpd_command.to_string(), "-V".to_string()])?;
        if !output.status.success() {
            return Err(command_failed(&[httpd_command, "-V"], &output));
        }
        Self::parse(&String::from_utf8_lossy(&output.stdout))
    }

    /// Parse `-D KEY="value"` lines from `httpd -V` output.
    pub fn parse(output: &str) -> Result<Self> {
        let httpd_root = PathBuf::from(define(output, "HTTPD_ROOT")?);
        let config_file = httpd_root.join(define(output, "SERVER_CONFIG_FILE")?);
        Ok(Self {
            httpd_root,
            config_file,
        })
    }
}

fn define(output: &str, key: &str) -> Result<String> {
    let regex = Regex::new(&format!(r#"(?i){}="([^"]+)""#, regex::escape(key)))?;
    regex
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| Error::ServerQuery {
            key: key.to_string(),
        })
}

/// Operations on the running web server and its environment.
pub trait ServerControl {
    /// Whether `user` can read `dir`.
    fn can_read(&self, user: &str, dir: &Path) -> Result<bool>;

    /// The installed Passenger version, if it can be determined.
    fn reference_version(&self) -> Result<Option<Version>>;

    /// Make the web server pick up configuration changes.
    fn reload(&self) -> Result<()>;
}

/// Fail with `PermissionCheckFailed` unless `user` can read `dir`.
pub fn check_permissions(server: &dyn ServerControl, user: &str, dir: &Path) -> Result<()> {
    if server.can_read(user, dir)? {
        Ok(())
    } else {
        Err(Error::PermissionCheckFailed {
            user: user.to_string(),
            dir: dir.to_path_buf(),
        })
    }
}

/// `ServerControl` backed by the commands configured in `Settings`.
#[derive(Debug, Clone)]
pub struct HttpdServer {
    permission_command: Vec<String>,
    version_command: Vec<String>,
    reload_command: Vec<String>,
}

impl HttpdServer {
    pub fn new(settings: &Settings) -> Self {
        Self {
            permission_command: settings.permission_command.clone(),
            version_command: settings.version_command.clone(),
            reload_command: settings.reload_command.clone(),
        }
    }
}

impl ServerControl for HttpdServer {
    fn can_read(&self, user: &str, dir: &Path) -> Result<bool> {
        if self.permission_command.is_empty() {
            return Ok(true);
        }
        let dir = dir.display().to_string();
        let command: Vec<String> = self
            .permission_command
            .iter()
            .map(|arg| arg.replace("{user}", user).replace("{dir}", &dir))
            .collect();
        Ok(run(&command)?.status.success())
    }

    fn reference_version(&self) -> Result<Option<Version>> {
        if self.version_command.is_empty() {
            return Ok(None);
        }
        let output = match run(&self.version_command) {
            Ok(output) => output,
            Err(Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{} not installed", self.version_command[0]);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        if !output.status.success() {
            return Ok(None);
        }
        Ok(String::from_utf8_lossy(&output.stdout)
            .split_whitespace()
            .find_map(lenient_version))
    }

    fn reload(&self) -> Result<()> {
        if self.reload_command.is_empty() {
            info!("Reload skipped: no reload command configured");
            return Ok(());
        }
        let output = run(&self.reload_command)?;
        if !output.status.success() {
            return Err(command_failed(&self.reload_command[..], &output));
        }
        info!("Reloaded with: {}", self.reload_command.join(" "));
        Ok(())
    }
}

fn run(command: &[String]) -> Result<Output> {
    let (program, args) = command.split_first().ok_or_else(|| Error::Command {
        command: String::new(),
        message: "empty command".to_string(),
    })?;
    debug!("Running: {}", command.join(" "));
    Ok(Command::new(program).args(args).output()?)
}

fn command_failed<S: AsRef<str>>(command: &[S], output: &Output) -> Error {
    Error::Command {
        command: command
            .iter()
            .map(|s| s.as_ref())
            .collect::<Vec<_>>()
            .join(" "),
        message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}
