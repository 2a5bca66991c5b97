//! Setup shared by every subcommand: settings, command-line overrides, the
//! root Apache config and the server collaborator.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use log::debug;

use passenger_conf::apache::ApacheConf;
use passenger_conf::directive::Grammar;
use passenger_conf::output::OutputConfig;
use passenger_conf::server::{HttpdServer, ServerInfo};
use passenger_conf::settings::{normalize_domain, Settings};
use passenger_conf::synthesize::SynthesisDefaults;

use crate::cli::GlobalArgs;

/// Overrides for values otherwise taken from settings or `httpd -V`.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfArgs {
    /// Root Apache config file
    #[arg(long, value_name = "FILE")]
    pub conf: Option<PathBuf>,

    /// Server root used when the config has no ServerRoot directive.
    ///
    /// With --conf as well, the web server binary is not queried.
    #[arg(long, value_name = "DIR")]
    pub server_root: Option<PathBuf>,

    /// Domain suffix for application host names
    #[arg(long, value_name = "SUFFIX")]
    pub domain: Option<String>,

    /// Address for new host-alias entries
    #[arg(long, value_name = "IP")]
    pub ip: Option<String>,

    /// Host-alias file
    #[arg(long, value_name = "FILE")]
    pub hosts: Option<PathBuf>,
}

impl ConfArgs {
    /// Apply the overrides that were given on top of `settings`.
    pub fn apply_to(&self, settings: &mut Settings) -> Result<()> {
        if let Some(conf) = &self.conf {
            settings.conf = Some(conf.clone());
        }
        if let Some(server_root) = &self.server_root {
            settings.server_root = Some(server_root.clone());
        }
        if let Some(domain) = &self.domain {
            settings.domain = normalize_domain(domain)?;
        }
        if let Some(ip) = &self.ip {
            settings.ip = ip.clone();
        }
        if let Some(hosts) = &self.hosts {
            settings.hosts_file = hosts.clone();
        }
        Ok(())
    }
}

/// Everything a subcommand needs to run.
pub struct Context {
    pub settings: Settings,
    pub grammar: Grammar,
    pub apache: ApacheConf,
    pub server: HttpdServer,
    pub out: OutputConfig,
}

impl Context {
    pub fn load(global: &GlobalArgs, conf_args: &ConfArgs) -> Result<Self> {
        let mut settings = Settings::load(global.settings.as_deref())
            .context("Failed to load settings")?;
        conf_args.apply_to(&mut settings)?;

        let (conf, server_root) = match (&settings.conf, &settings.server_root) {
            (Some(conf), Some(server_root)) => (conf.clone(), server_root.clone()),
            (conf, server_root) => {
                let info = ServerInfo::query(&settings.httpd_command).with_context(|| {
                    format!(
                        "Failed to query {} for its defaults (set --conf and --server-root to skip)",
                        settings.httpd_command
                    )
                })?;
                debug!("Web server defaults: {:?}", info);
                (
                    conf.clone().unwrap_or(info.config_file),
                    server_root.clone().unwrap_or(info.httpd_root),
                )
            }
        };

        let grammar = Grammar::new()?;
        let apache = ApacheConf::read(&grammar, &conf, &server_root)
            .with_context(|| format!("Failed to read {}", conf.display()))?;
        let server = HttpdServer::new(&settings);
        let out = OutputConfig::from_env_and_flag(&global.color);

        Ok(Self {
            settings,
            grammar,
            apache,
            server,
            out,
        })
    }

    pub fn synthesis_defaults(&self) -> SynthesisDefaults {
        SynthesisDefaults {
            rails_env: self.settings.rails_env.clone(),
            listen: self.settings.listen.clone(),
        }
    }
}
