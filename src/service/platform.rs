use std::path::Path;

use tracing::debug;

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "freebsd")))]
use crate::error::ServiceError;
use crate::error::Result;
use crate::service::backend::Backend;

/// Present when systemd is the running init system.
pub const SYSTEMD_MARKER: &str = "run/systemd/system";
/// Upstart's control binary.
pub const UPSTART_MARKER: &str = "sbin/initctl";

/// Pick the Linux backend from marker paths below `root`.
///
/// Newer init systems are checked first since compatibility shims can leave
/// older markers in place. SysV is the fallback.
pub fn probe_linux(root: &Path) -> Backend {
    let backend = if root.join(SYSTEMD_MARKER).exists() {
        Backend::Systemd
    } else if root.join(UPSTART_MARKER).exists() {
        Backend::Upstart
    } else {
        Backend::SysV
    };
    debug!(root = %root.display(), %backend, "Probed init system");
    backend
}

/// The backend for the host this binary was built for.
pub fn detect(root: &Path) -> Result<Backend> {
    #[cfg(target_os = "linux")]
    {
        Ok(probe_linux(root))
    }

    #[cfg(target_os = "macos")]
    {
        let _ = root;
        Ok(Backend::Launchd)
    }

    #[cfg(target_os = "freebsd")]
    {
        let _ = root;
        Ok(Backend::BsdRcd)
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "freebsd")))]
    {
        let _ = root;
        Err(ServiceError::UnsupportedSystem)
    }
}
