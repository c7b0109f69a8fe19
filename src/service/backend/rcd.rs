//! FreeBSD rc.d scripts.
//!
//! A service that is not enabled in `/etc/rc.conf` refuses the plain
//! `start`/`stop`/`status` verbs, so the `one` prefixed forms are used
//! instead.

use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::service::runner::NativeCommand;
use crate::service::status::StatusParser;

pub fn descriptor_path(root: &Path, name: &str) -> PathBuf {
    root.join("usr/local/etc/rc.d").join(name)
}

fn rc_conf(root: &Path) -> PathBuf {
    root.join("etc/rc.conf")
}

/// Whether `rc.conf` carries an uncommented `<name>_enable="YES"`.
pub fn is_enabled(root: &Path, name: &str) -> bool {
    let path = rc_conf(root);
    match std::fs::read_to_string(&path) {
        Ok(contents) => enabled_in(&contents, name),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "rc.conf not readable");
            false
        }
    }
}

fn enabled_in(contents: &str, name: &str) -> bool {
    let pattern = format!(r#"(?m)^[ \t]*{}_enable="YES""#, regex::escape(name));
    Regex::new(&pattern)
        .map(|re| re.is_match(contents))
        .unwrap_or(false)
}

fn verb(root: &Path, name: &str, verb: &str) -> String {
    if is_enabled(root, name) {
        verb.to_string()
    } else {
        debug!(service = name, "Service not enabled in rc.conf, using one{}", verb);
        format!("one{}", verb)
    }
}

pub fn status_parser(name: &str) -> Result<StatusParser> {
    StatusParser::new(&regex::escape(name), r"pid\s+([0-9]+)")
}

pub fn status_command(root: &Path, name: &str) -> NativeCommand {
    NativeCommand::new("service", [name.to_string(), verb(root, name, "status")])
}

pub fn start_command(root: &Path, name: &str) -> NativeCommand {
    NativeCommand::new("service", [name.to_string(), verb(root, name, "start")])
}

pub fn stop_command(root: &Path, name: &str) -> NativeCommand {
    NativeCommand::new("service", [name.to_string(), verb(root, name, "stop")])
}
