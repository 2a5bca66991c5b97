//! Shared test utilities for E2E tests.
//!
//! A `TestFixture` is a throwaway Apache server root: a root config under
//! `conf/`, a settings file pointing the binary at it, a private hosts file,
//! and an application directory. External commands are replaced by `true`
//! and `echo` so nothing outside the fixture is touched.
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let fixture = TestFixture::new().with_conf(configs::LOAD_ONLY);
//! fixture.command().arg("setup").assert().success();
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    pub use super::TestFixture;
}

/// Apache config snippets.
#[allow(dead_code)]
pub mod configs {
    pub const LOAD: &str = "LoadModule passenger_module /opt/local/lib/ruby/gems/1.8/gems/passenger-2.0.6/ext/apache2/mod_passenger.so";

    /// Only the module line; everything else must be synthesized.
    pub const LOAD_ONLY: &str = "Listen 80
User www
Group staff
LoadModule passenger_module /opt/local/lib/ruby/gems/1.8/gems/passenger-2.0.6/ext/apache2/mod_passenger.so
";

    /// All five directives, in order.
    pub const COMPLETE: &str = "Listen 80
User www
LoadModule passenger_module /opt/local/lib/ruby/gems/1.8/gems/passenger-2.0.6/ext/apache2/mod_passenger.so
PassengerRoot /opt/local/lib/ruby/gems/1.8/gems/passenger-2.0.6
PassengerRuby /opt/local/bin/ruby
RailsEnv development
NameVirtualHost *:80
";

    /// `PassengerRoot` before the module line.
    pub const OUT_OF_ORDER: &str = "PassengerRoot /opt/local/lib/ruby/gems/1.8/gems/passenger-2.0.6
LoadModule passenger_module /opt/local/lib/ruby/gems/1.8/gems/passenger-2.0.6/ext/apache2/mod_passenger.so
";

    /// No Passenger module at all.
    pub const NO_MODULE: &str = "Listen 80\nUser www\n";
}

/// A temporary server root with a settings file pointing at it.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
    settings: Vec<String>,
}

impl TestFixture {
    /// A fixture with an empty root config and an empty hosts file.
    pub fn new() -> Self {
        let fixture = Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
            settings: Vec::new(),
        };
        fixture
            .temp_dir
            .child("conf/httpd.conf")
            .write_str("")
            .expect("Failed to write config file");
        fixture
            .temp_dir
            .child("hosts")
            .write_str("127.0.0.1 localhost\n")
            .expect("Failed to write hosts file");
        fixture
            .temp_dir
            .child("apps/blog/public/index.html")
            .write_str("hello")
            .expect("Failed to write app file");
        fixture
    }

    /// Replace the root config.
    pub fn with_conf(self, content: &str) -> Self {
        self.with_file("conf/httpd.conf", content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add a raw line to the generated settings file.
    #[allow(dead_code)]
    pub fn with_setting(mut self, line: &str) -> Self {
        self.settings.push(line.to_string());
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn conf_path(&self) -> PathBuf {
        self.path().join("conf/httpd.conf")
    }

    #[allow(dead_code)]
    pub fn hosts_path(&self) -> PathBuf {
        self.path().join("hosts")
    }

    #[allow(dead_code)]
    pub fn app_root(&self) -> PathBuf {
        self.path().join("apps/blog")
    }

    /// Read a file under the fixture.
    #[allow(dead_code)]
    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.path().join(path)).expect("Failed to read file")
    }

    fn write_settings(&self) -> PathBuf {
        let mut yaml = format!(
            "conf: {}\nserver_root: {}\nhosts_file: {}\n",
            self.conf_path().display(),
            self.path().display(),
            self.path().join("hosts").display()
        );
        let defaults = [
            ("permission_command", "permission_command: [\"true\"]"),
            ("version_command", "version_command: [echo, \"2.0.6\"]"),
            ("reload_command", "reload_command: [\"true\"]"),
            ("httpd_command", "httpd_command: /nonexistent/httpd"),
        ];
        for (key, line) in defaults {
            if !self.settings.iter().any(|s| s.starts_with(key)) {
                yaml.push_str(line);
                yaml.push('\n');
            }
        }
        for line in &self.settings {
            yaml.push_str(line);
            yaml.push('\n');
        }

        let path = self.path().join("settings.yaml");
        std::fs::write(&path, yaml).expect("Failed to write settings");
        path
    }

    /// A command running in the fixture directory with its settings file.
    pub fn command(&self) -> assert_cmd::Command {
        let settings = self.write_settings();
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("passenger-conf");
        cmd.current_dir(self.path())
            .env_remove("RUST_LOG")
            .env_remove("RAILS_ENV")
            .arg("--color")
            .arg("never")
            .arg("--settings")
            .arg(settings);
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
