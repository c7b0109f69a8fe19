//! Init system backends.
//!
//! Every backend shares one lifecycle; they differ in where the descriptor
//! lives, which native commands they issue, and how status output is read.

pub mod launchd;
pub mod rcd;
pub mod systemd;
pub mod sysv;
pub mod upstart;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::service::runner::{CommandRunner, NativeCommand, run_checked};
use crate::service::status::StatusParser;
use crate::service::template;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Systemd,
    Upstart,
    #[serde(rename = "sysv")]
    SysV,
    Launchd,
    #[serde(rename = "rcd")]
    BsdRcd,
}

impl Backend {
    pub const ALL: [Backend; 5] = [
        Backend::Systemd,
        Backend::Upstart,
        Backend::SysV,
        Backend::Launchd,
        Backend::BsdRcd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Systemd => "systemd",
            Backend::Upstart => "upstart",
            Backend::SysV => "sysv",
            Backend::Launchd => "launchd",
            Backend::BsdRcd => "rcd",
        }
    }

    /// Where the descriptor for `name` is written, below `root`.
    pub fn descriptor_path(&self, root: &Path, name: &str) -> PathBuf {
        match self {
            Backend::Systemd => systemd::descriptor_path(root, name),
            Backend::Upstart => upstart::descriptor_path(root, name),
            Backend::SysV => sysv::descriptor_path(root, name),
            Backend::Launchd => launchd::descriptor_path(root, name),
            Backend::BsdRcd => rcd::descriptor_path(root, name),
        }
    }

    pub fn default_template(&self) -> &'static str {
        match self {
            Backend::Systemd => template::SYSTEMD_TEMPLATE,
            Backend::Upstart => template::UPSTART_TEMPLATE,
            Backend::SysV => template::SYSV_TEMPLATE,
            Backend::Launchd => template::LAUNCHD_TEMPLATE,
            Backend::BsdRcd => template::RCD_TEMPLATE,
        }
    }

    /// File mode of the written descriptor. Shell scripts are executable.
    pub fn descriptor_mode(&self) -> u32 {
        match self {
            Backend::Systemd | Backend::Launchd => 0o644,
            Backend::Upstart | Backend::SysV | Backend::BsdRcd => 0o755,
        }
    }

    pub fn status_parser(&self, name: &str) -> Result<StatusParser> {
        match self {
            Backend::Systemd => systemd::status_parser(),
            Backend::Upstart => upstart::status_parser(name),
            Backend::SysV => sysv::status_parser(name),
            Backend::Launchd => launchd::status_parser(name),
            Backend::BsdRcd => rcd::status_parser(name),
        }
    }

    pub fn status_command(&self, root: &Path, name: &str) -> NativeCommand {
        match self {
            Backend::Systemd => systemd::status_command(name),
            Backend::Upstart => upstart::status_command(name),
            Backend::SysV => sysv::status_command(name),
            Backend::Launchd => launchd::status_command(name),
            Backend::BsdRcd => rcd::status_command(root, name),
        }
    }

    pub fn start_command(&self, root: &Path, name: &str) -> NativeCommand {
        match self {
            Backend::Systemd => systemd::start_command(name),
            Backend::Upstart => upstart::start_command(name),
            Backend::SysV => sysv::start_command(name),
            Backend::Launchd => launchd::start_command(&self.descriptor_path(root, name)),
            Backend::BsdRcd => rcd::start_command(root, name),
        }
    }

    pub fn stop_command(&self, root: &Path, name: &str) -> NativeCommand {
        match self {
            Backend::Systemd => systemd::stop_command(name),
            Backend::Upstart => upstart::stop_command(name),
            Backend::SysV => sysv::stop_command(name),
            Backend::Launchd => launchd::stop_command(&self.descriptor_path(root, name)),
            Backend::BsdRcd => rcd::stop_command(root, name),
        }
    }

    /// Best-effort registration steps after the descriptor has been written.
    ///
    /// Systemd reloads its unit database and enables the unit. SysV gets
    /// runlevel links. Each failed step comes back as a warning.
    pub async fn register(&self, runner: &dyn CommandRunner, root: &Path, name: &str) -> Vec<String> {
        let mut warnings = Vec::new();
        match self {
            Backend::Systemd => {
                best_effort(runner, systemd::reload_command(), &mut warnings).await;
                best_effort(runner, systemd::enable_command(name), &mut warnings).await;
            }
            Backend::SysV => warnings.extend(sysv::link(root, name, &self.descriptor_path(root, name))),
            Backend::Upstart | Backend::Launchd | Backend::BsdRcd => {}
        }
        warnings
    }

    /// Best-effort steps before the descriptor is deleted.
    pub async fn before_remove(&self, runner: &dyn CommandRunner, name: &str) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Backend::Systemd = self {
            best_effort(runner, systemd::disable_command(name), &mut warnings).await;
        }
        warnings
    }

    /// Best-effort steps after the descriptor is deleted.
    pub async fn after_remove(&self, runner: &dyn CommandRunner, root: &Path, name: &str) -> Vec<String> {
        let mut warnings = Vec::new();
        match self {
            Backend::Systemd => best_effort(runner, systemd::reload_command(), &mut warnings).await,
            Backend::SysV => warnings.extend(sysv::unlink(root, name)),
            Backend::Upstart | Backend::Launchd | Backend::BsdRcd => {}
        }
        warnings
    }
}

async fn best_effort(runner: &dyn CommandRunner, command: NativeCommand, warnings: &mut Vec<String>) {
    if let Err(e) = run_checked(runner, command).await {
        warn!(error = %e, "Ignoring failed native command");
        warnings.push(e.to_string());
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Backend::ALL
            .into_iter()
            .find(|backend| backend.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "unknown backend '{}' (expected one of: systemd, upstart, sysv, launchd, rcd)",
                    s
                )
            })
    }
}
