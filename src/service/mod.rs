pub mod backend;
pub mod descriptor;
pub mod executable;
pub mod platform;
pub mod privilege;
pub mod runner;
pub mod status;
pub mod template;

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{Result, ServiceError};

pub use backend::Backend;
pub use descriptor::ServiceDescriptor;
pub use executable::Executable;
pub use runner::{CommandOutput, CommandRunner, NativeCommand, SystemRunner};
pub use status::RuntimeStatus;

/// Construction parameters for a [`Service`].
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Prefix for every probed and written path. `/` on a real host.
    pub root: PathBuf,
    /// Skip platform detection and use this backend.
    pub backend: Option<Backend>,
    /// Replace the backend's default descriptor template.
    pub template: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/"),
            backend: None,
            template: None,
        }
    }
}

/// A lifecycle verb, used to label human-readable result lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Install,
    Remove,
    Start,
    Stop,
    Restart,
    Run,
}

impl Action {
    fn verb(&self) -> &'static str {
        match self {
            Action::Install => "Install",
            Action::Remove => "Removing",
            Action::Start => "Starting",
            Action::Stop => "Stopping",
            Action::Restart => "Restarting",
            Action::Run => "Running",
        }
    }

    pub fn ok_line(&self, description: &str) -> String {
        match self {
            Action::Run => format!("{} {}: completed.", self.verb(), description),
            _ => format!("{} {}: OK", self.verb(), description),
        }
    }

    pub fn failed_line(&self, description: &str, error: &ServiceError) -> String {
        format!("{} {}: FAILED ({})", self.verb(), description, error)
    }
}

/// Outcome of a successful lifecycle operation.
///
/// `message` is for display only. `warnings` lists best-effort steps that
/// failed without failing the operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub action: Action,
    pub message: String,
    pub warnings: Vec<String>,
}

/// A service bound to one init system backend.
pub struct Service {
    descriptor: ServiceDescriptor,
    backend: Backend,
    root: PathBuf,
    template: Option<String>,
    runner: Arc<dyn CommandRunner>,
}

impl Service {
    /// Bind `descriptor` to the host's init system.
    pub fn new(descriptor: ServiceDescriptor, config: ServiceConfig) -> Result<Self> {
        Self::with_runner(descriptor, config, Arc::new(SystemRunner))
    }

    /// Like [`Service::new`], issuing native commands through `runner`.
    pub fn with_runner(
        descriptor: ServiceDescriptor,
        config: ServiceConfig,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self> {
        let backend = match config.backend {
            Some(backend) => backend,
            None => platform::detect(&config.root)?,
        };
        debug!(service = descriptor.name(), %backend, "Selected backend");

        Ok(Self {
            descriptor,
            backend,
            root: config.root,
            template: config.template,
            runner,
        })
    }

    pub fn descriptor(&self) -> &ServiceDescriptor {
        &self.descriptor
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The template the next install renders.
    pub fn template(&self) -> &str {
        self.template
            .as_deref()
            .unwrap_or_else(|| self.backend.default_template())
    }

    /// Override the template for subsequent installs of this service.
    /// Descriptors already on disk are untouched.
    pub fn set_template(&mut self, template: impl Into<String>) {
        self.template = Some(template.into());
    }

    pub fn descriptor_path(&self) -> PathBuf {
        self.backend.descriptor_path(&self.root, self.descriptor.name())
    }

    /// Installed means the descriptor file exists.
    pub fn is_installed(&self) -> bool {
        self.descriptor_path().exists()
    }

    fn report(&self, action: Action, warnings: Vec<String>) -> Report {
        Report {
            action,
            message: action.ok_line(self.descriptor.description()),
            warnings,
        }
    }

    async fn require_installed(&self) -> Result<()> {
        privilege::check_privileges(self.runner.as_ref()).await?;
        if !self.is_installed() {
            return Err(ServiceError::NotInstalled);
        }
        Ok(())
    }

    /// Ask the native manager for the current state.
    ///
    /// A native command that cannot run or exits unsuccessfully means stopped.
    async fn runtime_status(&self) -> Result<RuntimeStatus> {
        let name = self.descriptor.name();
        let parser = self.backend.status_parser(name)?;
        let command = self.backend.status_command(&self.root, name);

        let status = match self.runner.output(&command).await {
            Ok(output) if output.success => parser.parse(&output.stdout),
            Ok(output) => {
                debug!(command = %command, code = ?output.code, "Status command unsuccessful");
                RuntimeStatus::Stopped
            }
            Err(e) => {
                debug!(command = %command, error = %e, "Status command failed to run");
                RuntimeStatus::Stopped
            }
        };
        Ok(status)
    }

    /// Render the descriptor, write it and register it with the native manager.
    ///
    /// `args` are appended after the descriptor's own arguments.
    pub async fn install(&self, args: &[String]) -> Result<Report> {
        privilege::check_privileges(self.runner.as_ref()).await?;

        let path = self.descriptor_path();
        if self.is_installed() {
            return Err(ServiceError::AlreadyInstalled);
        }

        let executable = executable::resolve(&self.descriptor)?;
        let context = template::TemplateContext::new(&self.descriptor, &executable, args);
        let contents = template::render(self.backend, self.template(), &context)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        create_descriptor(&path, self.backend.descriptor_mode(), |file| {
            file.write_all(contents.as_bytes())
        })?;
        info!(path = %path.display(), "Wrote service descriptor");

        let warnings = self
            .backend
            .register(self.runner.as_ref(), &self.root, self.descriptor.name())
            .await;

        info!(service = self.descriptor.name(), backend = %self.backend, "Service installed");
        Ok(self.report(Action::Install, warnings))
    }

    /// Unregister and delete the descriptor. The service may still be running.
    pub async fn remove(&self) -> Result<Report> {
        self.require_installed().await?;

        let name = self.descriptor.name();
        let mut warnings = self.backend.before_remove(self.runner.as_ref(), name).await;

        let path = self.descriptor_path();
        std::fs::remove_file(&path)?;
        info!(path = %path.display(), "Removed service descriptor");

        warnings.extend(
            self.backend
                .after_remove(self.runner.as_ref(), &self.root, name)
                .await,
        );

        Ok(self.report(Action::Remove, warnings))
    }

    pub async fn start(&self) -> Result<Report> {
        self.require_installed().await?;

        if self.runtime_status().await?.is_running() {
            return Err(ServiceError::AlreadyRunning);
        }

        let command = self.backend.start_command(&self.root, self.descriptor.name());
        runner::run_checked(self.runner.as_ref(), command).await?;

        info!(service = self.descriptor.name(), "Service started");
        Ok(self.report(Action::Start, Vec::new()))
    }

    pub async fn stop(&self) -> Result<Report> {
        self.require_installed().await?;

        if !self.runtime_status().await?.is_running() {
            return Err(ServiceError::AlreadyStopped);
        }

        let command = self.backend.stop_command(&self.root, self.descriptor.name());
        runner::run_checked(self.runner.as_ref(), command).await?;

        info!(service = self.descriptor.name(), "Service stopped");
        Ok(self.report(Action::Stop, Vec::new()))
    }

    /// Stop if running, then start.
    pub async fn restart(&self) -> Result<Report> {
        match self.stop().await {
            Ok(_) | Err(ServiceError::AlreadyStopped) => {}
            Err(e) => return Err(e),
        }
        self.start().await?;
        Ok(self.report(Action::Restart, Vec::new()))
    }

    pub async fn status(&self) -> Result<RuntimeStatus> {
        self.require_installed().await?;
        self.runtime_status().await
    }

    /// Run the payload in the foreground. Installed and running state are not
    /// consulted.
    pub fn run<E: Executable>(&self, mut payload: E) -> Result<Report> {
        info!(service = self.descriptor.name(), "Running service payload");
        payload.run()?;
        Ok(self.report(Action::Run, Vec::new()))
    }
}

/// Create `path`, which must not exist yet, and fill it.
///
/// If filling or setting the mode fails, the new file is removed so the
/// service does not look installed.
fn create_descriptor<F>(path: &Path, mode: u32, fill: F) -> Result<()>
where
    F: FnOnce(&mut File) -> std::io::Result<()>,
{
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    let written = fill(&mut file).map_err(ServiceError::from);
    drop(file);

    if let Err(e) = written.and_then(|()| set_mode(path, mode)) {
        if let Err(cleanup) = std::fs::remove_file(path) {
            warn!(path = %path.display(), error = %cleanup, "Failed to remove partial descriptor");
        }
        return Err(e);
    }
    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
