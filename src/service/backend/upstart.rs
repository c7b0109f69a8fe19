use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::service::runner::NativeCommand;
use crate::service::status::StatusParser;

pub fn descriptor_path(root: &Path, name: &str) -> PathBuf {
    root.join("etc/init").join(format!("{}.conf", name))
}

pub fn status_parser(name: &str) -> Result<StatusParser> {
    StatusParser::new(
        &format!("{} start/running", regex::escape(name)),
        r"process ([0-9]+)",
    )
}

pub fn status_command(name: &str) -> NativeCommand {
    NativeCommand::new("status", [name])
}

pub fn start_command(name: &str) -> NativeCommand {
    NativeCommand::new("start", [name])
}

pub fn stop_command(name: &str) -> NativeCommand {
    NativeCommand::new("stop", [name])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::status::RuntimeStatus;

    #[test]
    fn test_descriptor_path() {
        assert_eq!(
            descriptor_path(Path::new("/"), "sampled"),
            PathBuf::from("/etc/init/sampled.conf")
        );
    }

    #[test]
    fn test_parse_running() {
        let status = status_parser("sampled")
            .unwrap()
            .parse("sampled start/running, process 1234\n");
        assert_eq!(status, RuntimeStatus::Running { pid: Some(1234) });
    }

    #[test]
    fn test_parse_stopped() {
        let status = status_parser("sampled").unwrap().parse("sampled stop/waiting\n");
        assert_eq!(status, RuntimeStatus::Stopped);
    }

    #[test]
    fn test_name_is_matched_literally() {
        let parser = status_parser("a.b").unwrap();
        assert_eq!(parser.parse("axb start/running, process 7"), RuntimeStatus::Stopped);
        assert!(parser.parse("a.b start/running, process 7").is_running());
    }
}
