//! SysV init scripts and their runlevel links.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;
use crate::service::runner::NativeCommand;
use crate::service::status::StatusParser;

/// Runlevels that start the service, linked as `S87<name>`.
const START_LEVELS: [&str; 4] = ["2", "3", "4", "5"];
/// Runlevels that stop the service, linked as `K17<name>`.
const KILL_LEVELS: [&str; 3] = ["0", "1", "6"];

pub fn descriptor_path(root: &Path, name: &str) -> PathBuf {
    root.join("etc/init.d").join(name)
}

pub fn status_parser(name: &str) -> Result<StatusParser> {
    StatusParser::new(&regex::escape(name), r"pid\s+([0-9]+)")
}

pub fn status_command(name: &str) -> NativeCommand {
    NativeCommand::new("service", [name, "status"])
}

pub fn start_command(name: &str) -> NativeCommand {
    NativeCommand::new("service", [name, "start"])
}

pub fn stop_command(name: &str) -> NativeCommand {
    NativeCommand::new("service", [name, "stop"])
}

/// Every runlevel link for `name`, start links first.
pub fn runlevel_links(root: &Path, name: &str) -> Vec<PathBuf> {
    let start = START_LEVELS
        .iter()
        .map(|level| root.join(format!("etc/rc{}.d", level)).join(format!("S87{}", name)));
    let kill = KILL_LEVELS
        .iter()
        .map(|level| root.join(format!("etc/rc{}.d", level)).join(format!("K17{}", name)));
    start.chain(kill).collect()
}

/// Link the init script into every runlevel directory.
///
/// Each link is attempted independently; failures come back as warnings.
pub fn link(root: &Path, name: &str, script: &Path) -> Vec<String> {
    let mut warnings = Vec::new();
    for link in runlevel_links(root, name) {
        match symlink(script, &link) {
            Ok(()) => debug!(link = %link.display(), "Created runlevel link"),
            Err(e) => {
                warn!(link = %link.display(), error = %e, "Failed to create runlevel link");
                warnings.push(format!("could not create {}: {}", link.display(), e));
            }
        }
    }
    warnings
}

/// Remove every runlevel link. Links that are already gone are not reported.
pub fn unlink(root: &Path, name: &str) -> Vec<String> {
    let mut warnings = Vec::new();
    for link in runlevel_links(root, name) {
        match std::fs::remove_file(&link) {
            Ok(()) => debug!(link = %link.display(), "Removed runlevel link"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(link = %link.display(), error = %e, "Failed to remove runlevel link");
                warnings.push(format!("could not remove {}: {}", link.display(), e));
            }
        }
    }
    warnings
}

#[cfg(unix)]
fn symlink(original: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(original, link)
}

#[cfg(not(unix))]
fn symlink(_original: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symlinks are not supported on this platform",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::status::RuntimeStatus;
    use tempfile::TempDir;

    #[test]
    fn test_runlevel_links() {
        let links = runlevel_links(Path::new("/"), "sampled");
        let expected: Vec<PathBuf> = [
            "/etc/rc2.d/S87sampled",
            "/etc/rc3.d/S87sampled",
            "/etc/rc4.d/S87sampled",
            "/etc/rc5.d/S87sampled",
            "/etc/rc0.d/K17sampled",
            "/etc/rc1.d/K17sampled",
            "/etc/rc6.d/K17sampled",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();
        assert_eq!(links, expected);
    }

    #[test]
    fn test_parse_running() {
        let status = status_parser("myservice")
            .unwrap()
            .parse("myservice (pid  1234) is running...\n");
        assert_eq!(status, RuntimeStatus::Running { pid: Some(1234) });
    }

    #[test]
    fn test_parse_stopped() {
        let status = status_parser("myservice").unwrap().parse("stopped\n");
        assert_eq!(status, RuntimeStatus::Stopped);
    }

    #[cfg(unix)]
    #[test]
    fn test_link_is_best_effort() {
        let root = TempDir::new().unwrap();
        // Only two of the seven runlevel directories exist.
        std::fs::create_dir_all(root.path().join("etc/rc2.d")).unwrap();
        std::fs::create_dir_all(root.path().join("etc/rc0.d")).unwrap();
        let script = root.path().join("etc/init.d/sampled");

        let warnings = link(root.path(), "sampled", &script);

        assert_eq!(warnings.len(), 5);
        assert!(root.path().join("etc/rc2.d/S87sampled").symlink_metadata().is_ok());
        assert!(root.path().join("etc/rc0.d/K17sampled").symlink_metadata().is_ok());

        let warnings = unlink(root.path(), "sampled");
        assert!(warnings.is_empty());
        assert!(root.path().join("etc/rc2.d/S87sampled").symlink_metadata().is_err());
    }
}
