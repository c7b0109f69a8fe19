use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::service::runner::NativeCommand;
use crate::service::status::StatusParser;

pub fn descriptor_path(root: &Path, name: &str) -> PathBuf {
    root.join("Library/LaunchDaemons").join(format!("{}.plist", name))
}

pub fn status_parser(name: &str) -> Result<StatusParser> {
    StatusParser::new(&regex::escape(name), r#""PID" = ([0-9]+);"#)
}

pub fn status_command(name: &str) -> NativeCommand {
    NativeCommand::new("launchctl", ["list", name])
}

pub fn start_command(plist: &Path) -> NativeCommand {
    NativeCommand::new("launchctl", ["load".to_string(), plist.to_string_lossy().to_string()])
}

pub fn stop_command(plist: &Path) -> NativeCommand {
    NativeCommand::new("launchctl", ["unload".to_string(), plist.to_string_lossy().to_string()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::status::RuntimeStatus;

    const LOADED: &str = r#"{
	"LimitLoadToSessionType" = "System";
	"Label" = "sampled";
	"OnDemand" = false;
	"LastExitStatus" = 0;
	"PID" = 1234;
	"Program" = "/usr/local/bin/sampled";
};
"#;

    const LOADED_NOT_RUNNING: &str = r#"{
	"LimitLoadToSessionType" = "System";
	"Label" = "sampled";
	"LastExitStatus" = 256;
};
"#;

    #[test]
    fn test_descriptor_path() {
        assert_eq!(
            descriptor_path(Path::new("/"), "sampled"),
            PathBuf::from("/Library/LaunchDaemons/sampled.plist")
        );
    }

    #[test]
    fn test_load_uses_plist_path() {
        let plist = descriptor_path(Path::new("/"), "sampled");
        assert_eq!(
            start_command(&plist).to_string(),
            "launchctl load /Library/LaunchDaemons/sampled.plist"
        );
        assert_eq!(
            stop_command(&plist).to_string(),
            "launchctl unload /Library/LaunchDaemons/sampled.plist"
        );
    }

    #[test]
    fn test_parse_with_pid() {
        let status = status_parser("sampled").unwrap().parse(LOADED);
        assert_eq!(status, RuntimeStatus::Running { pid: Some(1234) });
    }

    #[test]
    fn test_parse_loaded_without_pid() {
        let status = status_parser("sampled").unwrap().parse(LOADED_NOT_RUNNING);
        assert_eq!(status, RuntimeStatus::Running { pid: None });
    }

    #[test]
    fn test_parse_unknown_label() {
        let status = status_parser("sampled")
            .unwrap()
            .parse("Could not find service \"other\" in domain for port");
        assert_eq!(status, RuntimeStatus::Stopped);
    }
}
