use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by the service lifecycle operations.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// No privilege-check mechanism is available on this host.
    #[error("unsupported system")]
    UnsupportedSystem,

    #[error("you must have root user privileges. Possibly using 'sudo' command should help")]
    InsufficientPrivileges,

    #[error("service has already been installed")]
    AlreadyInstalled,

    #[error("service is not installed")]
    NotInstalled,

    #[error("service is already running")]
    AlreadyRunning,

    #[error("service has already been stopped")]
    AlreadyStopped,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A native manager command ran but exited unsuccessfully.
    #[error("`{command}` failed (exit code {code:?}): {stderr}")]
    Command {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// A native manager command could not be executed at all.
    #[error("failed to execute `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("template error: {0}")]
    Template(#[from] handlebars::RenderError),

    #[error("invalid status pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("could not resolve executable path for {name}: {source}")]
    ExecutablePath {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read template override {path}: {source}")]
    TemplateOverride {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Payload(#[from] anyhow::Error),
}

impl ServiceError {
    /// Whether this error is a failed lifecycle precondition rather than an
    /// I/O or native command failure.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ServiceError::UnsupportedSystem
                | ServiceError::InsufficientPrivileges
                | ServiceError::AlreadyInstalled
                | ServiceError::NotInstalled
                | ServiceError::AlreadyRunning
                | ServiceError::AlreadyStopped
        )
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
