use tracing::debug;

use crate::error::{Result, ServiceError};
use crate::service::runner::{CommandRunner, NativeCommand};

/// Check that the caller runs with the root group id.
///
/// Any failure to run or parse `id -g` means there is no usable privilege
/// check on this host.
pub async fn check_privileges(runner: &dyn CommandRunner) -> Result<()> {
    let output = runner
        .output(&NativeCommand::new("id", ["-g"]))
        .await
        .map_err(|_| ServiceError::UnsupportedSystem)?;

    if !output.success {
        return Err(ServiceError::UnsupportedSystem);
    }

    let gid = parse_gid(&output.stdout)?;
    debug!(gid, "Effective group id");

    if gid == 0 {
        Ok(())
    } else {
        Err(ServiceError::InsufficientPrivileges)
    }
}

fn parse_gid(stdout: &str) -> Result<u32> {
    stdout
        .trim()
        .parse::<u32>()
        .map_err(|_| ServiceError::UnsupportedSystem)
}
