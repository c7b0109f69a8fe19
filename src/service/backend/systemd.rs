use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::service::runner::NativeCommand;
use crate::service::status::StatusParser;

const UNIT_DIR: &str = "etc/systemd/system";

fn unit(name: &str) -> String {
    format!("{}.service", name)
}

pub fn descriptor_path(root: &Path, name: &str) -> PathBuf {
    root.join(UNIT_DIR).join(unit(name))
}

pub fn status_parser() -> Result<StatusParser> {
    StatusParser::new("Active: active", r"Main PID: ([0-9]+)")
}

pub fn status_command(name: &str) -> NativeCommand {
    NativeCommand::new("systemctl", ["status".to_string(), unit(name)])
}

pub fn start_command(name: &str) -> NativeCommand {
    NativeCommand::new("systemctl", ["start".to_string(), unit(name)])
}

pub fn stop_command(name: &str) -> NativeCommand {
    NativeCommand::new("systemctl", ["stop".to_string(), unit(name)])
}

pub fn enable_command(name: &str) -> NativeCommand {
    NativeCommand::new("systemctl", ["enable".to_string(), unit(name)])
}

pub fn disable_command(name: &str) -> NativeCommand {
    NativeCommand::new("systemctl", ["disable".to_string(), unit(name)])
}

pub fn reload_command() -> NativeCommand {
    NativeCommand::new("systemctl", ["daemon-reload"])
}
