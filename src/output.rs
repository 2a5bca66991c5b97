//! # Output Configuration
//!
//! Controls how `passenger-conf` decorates what it prints: status markers
//! (emoji on a capable terminal, bracketed tags otherwise) and highlighted
//! `file:line` locations.
//!
//! The following are respected:
//! - `--color=never|always|auto`
//! - `NO_COLOR` disables colors when set (any value)
//! - `CLICOLOR=0` disables colors
//! - `CLICOLOR_FORCE=1` forces colors even when stdout is not a TTY
//! - `TERM=dumb` disables colors
//!
//! ```rust,ignore
//! use passenger_conf::output::{OutputConfig, Status};
//!
//! let out = OutputConfig::from_env_and_flag("auto");
//! println!("{} Walking /etc/httpd/conf/httpd.conf", out.status(Status::Scan));
//! ```

use std::env;

use console::style;

use crate::error::Location;

/// Output configuration for one run.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emoji should be used.
    pub use_color: bool,
}

/// The kind of line being printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Scan,
    Ok,
    Added,
    Warn,
    Info,
}

impl OutputConfig {
    /// Build from the `--color` flag value: `always`, `never` or `auto`.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // https://no-color.org/: presence alone disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }

    /// The leading marker for a line of the given kind.
    pub fn status(&self, status: Status) -> &'static str {
        let (emoji_str, plain) = match status {
            Status::Scan => ("🔍", "[SCAN]"),
            Status::Ok => ("✅", "[OK]"),
            Status::Added => ("➕", "[ADD]"),
            Status::Warn => ("⚠️ ", "[WARN]"),
            Status::Info => ("📄", "[INFO]"),
        };
        emoji(self, emoji_str, plain)
    }

    /// A `file:line` location, bold when colors are on.
    pub fn location(&self, location: &Location) -> String {
        if self.use_color {
            style(location).bold().to_string()
        } else {
            location.to_string()
        }
    }

    /// A value the user may want to copy, cyan when colors are on.
    pub fn value(&self, text: &str) -> String {
        if self.use_color {
            style(text).cyan().to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// `emoji_str` when colors are on, `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}
